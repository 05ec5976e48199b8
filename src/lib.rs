//! Decoder for the PostgreSQL RowDescription wire message.
//!
//! A RowDescription announces the shape of an upcoming result set: how many
//! columns there are and, for each, its name, originating table, declared
//! type, and whether values will arrive in text or binary format. This
//! crate decodes that message into a reusable [`RowDescription`] catalog,
//! resolving each column's type OID to a decoding strategy as it goes.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pg_rowdesc::{RowDescription, TypeRegistry, WireReader};
//!
//! # fn body() -> Vec<u8> {
//! #     let mut buf = vec![0u8, 1];
//! #     buf.extend_from_slice(b"id\0");
//! #     buf.extend_from_slice(&0u32.to_be_bytes());
//! #     buf.extend_from_slice(&0i16.to_be_bytes());
//! #     buf.extend_from_slice(&23u32.to_be_bytes());
//! #     buf.extend_from_slice(&4i16.to_be_bytes());
//! #     buf.extend_from_slice(&(-1i32).to_be_bytes());
//! #     buf.extend_from_slice(&1i16.to_be_bytes());
//! #     buf
//! # }
//! # fn main() -> pg_rowdesc::Result<()> {
//! let registry = Arc::new(TypeRegistry::new());
//! let mut row = RowDescription::new(registry);
//!
//! let body = body(); // message bytes, already framed by the transport
//! row.load(&mut WireReader::new(&body))?;
//!
//! assert_eq!(row.len(), 1);
//! assert_eq!(row.field_index("id"), 0);
//! assert_eq!(row[0].type_oid(), 23);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod protocol;

pub use error::{Error, Result};
pub use protocol::{
    FieldDescription, Fields, Format, RelationColumn, RowDescription, TypeHandler, TypeRegistry,
    ValueKind, WireReader,
};
