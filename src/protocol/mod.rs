pub mod buffer;
pub mod row_description;
pub mod types;

mod fold;


pub use buffer::WireReader;
pub use row_description::{Fields, FieldDescription, Format, RelationColumn, RowDescription};
pub use types::{TypeHandler, TypeRegistry, ValueKind};
