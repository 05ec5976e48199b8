//! RowDescription message decoding.
//!
//! A [`RowDescription`] is loaded once per executed statement, potentially
//! thousands of times per second on a busy connection, so the catalog is
//! built to be reused: backing storage grows to the largest message seen
//! and descriptor objects are overwritten in place rather than reallocated.

use std::cell::OnceCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

use tracing::trace;

use crate::{Error, Result};

use super::buffer::WireReader;
use super::fold::fold_identifier;
use super::types::{TypeHandler, TypeRegistry};

/// Per-column wire format announced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Binary,
}

impl Format {
    /// Decode a wire format code. Anything other than 0 or 1 is a protocol
    /// violation.
    pub fn from_wire(code: i16) -> Result<Self> {
        match code {
            0 => Ok(Format::Text),
            1 => Ok(Format::Binary),
            other => Err(Error::Protocol(format!(
                "unknown field format code: {}",
                other
            ))),
        }
    }

    pub fn code(self) -> i16 {
        match self {
            Format::Text => 0,
            Format::Binary => 1,
        }
    }
}

/// One column of a replication RELATION message: the subset of metadata the
/// logical-replication stream carries for a column.
#[derive(Debug, Clone)]
pub struct RelationColumn {
    pub name: String,
    pub type_oid: u32,
    pub type_modifier: i32,
}

/// Metadata for a single result column, plus its resolved decoding strategy.
#[derive(Debug)]
pub struct FieldDescription {
    name: String,
    table_oid: u32,
    attr_number: i16,
    type_oid: u32,
    type_size: i16,
    type_modifier: i32,
    format: Format,
    handler: Arc<TypeHandler>,
}

impl FieldDescription {
    #[allow(clippy::too_many_arguments)]
    fn new(
        registry: &TypeRegistry,
        name: String,
        table_oid: u32,
        attr_number: i16,
        type_oid: u32,
        type_size: i16,
        type_modifier: i32,
        format: Format,
    ) -> Self {
        Self {
            name,
            table_oid,
            attr_number,
            type_oid,
            type_size,
            type_modifier,
            format,
            handler: resolve_handler(registry, type_oid, format),
        }
    }

    /// Overwrite every field and re-resolve the decoding strategy.
    ///
    /// Run whenever the type OID or format changes; the cached handler is
    /// only valid for the (type OID, format) pair it was resolved from.
    #[allow(clippy::too_many_arguments)]
    fn populate(
        &mut self,
        registry: &TypeRegistry,
        name: String,
        table_oid: u32,
        attr_number: i16,
        type_oid: u32,
        type_size: i16,
        type_modifier: i32,
        format: Format,
    ) {
        self.name = name;
        self.table_oid = table_oid;
        self.attr_number = attr_number;
        self.type_oid = type_oid;
        self.type_size = type_size;
        self.type_modifier = type_modifier;
        self.format = format;
        self.handler = resolve_handler(registry, type_oid, format);
    }

    /// Deep copy that resolves its handler afresh instead of sharing the
    /// cached reference.
    fn reresolved(&self, registry: &TypeRegistry) -> Self {
        Self {
            name: self.name.clone(),
            table_oid: self.table_oid,
            attr_number: self.attr_number,
            type_oid: self.type_oid,
            type_size: self.type_size,
            type_modifier: self.type_modifier,
            format: self.format,
            handler: resolve_handler(registry, self.type_oid, self.format),
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OID of the table the column comes from, zero if not attributable.
    pub fn table_oid(&self) -> u32 {
        self.table_oid
    }

    /// Attribute number of the column within its table (1-based), zero if
    /// not attributable.
    pub fn attr_number(&self) -> i16 {
        self.attr_number
    }

    /// OID of the column's declared type.
    pub fn type_oid(&self) -> u32 {
        self.type_oid
    }

    /// Declared byte size of the type; negative means variable-width.
    pub fn type_size(&self) -> i16 {
        self.type_size
    }

    /// Type-specific modifier, e.g. varchar length.
    pub fn type_modifier(&self) -> i32 {
        self.type_modifier
    }

    /// Wire format values of this column will use.
    pub fn format(&self) -> Format {
        self.format
    }

    /// The decoding strategy resolved for this column.
    pub fn handler(&self) -> &Arc<TypeHandler> {
        &self.handler
    }
}

/// Binary columns resolve through the registry; text columns always get the
/// shared text fallback, the OID notwithstanding.
fn resolve_handler(registry: &TypeRegistry, type_oid: u32, format: Format) -> Arc<TypeHandler> {
    match format {
        Format::Binary => registry.resolve(type_oid),
        Format::Text => registry.text_handler(),
    }
}

/// The decoded shape of an upcoming result set.
///
/// One catalog belongs to one connection and is reloaded in place for every
/// RowDescription message read on it. Use [`Clone`] when the metadata must
/// outlive the next message, e.g. for a cached prepared-statement shape.
pub struct RowDescription {
    registry: Arc<TypeRegistry>,
    // Slots past `count` are stale descriptors kept only so their
    // allocations can be reused by a later, wider message.
    slots: Vec<Option<FieldDescription>>,
    count: usize,
    name_index: HashMap<String, usize>,
    folded_index: OnceCell<HashMap<String, usize>>,
}

impl RowDescription {
    /// An empty catalog bound to a shared type registry.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            slots: Vec::new(),
            count: 0,
            name_index: HashMap::new(),
            folded_index: OnceCell::new(),
        }
    }

    /// Load a RowDescription message body into this catalog, replacing its
    /// previous contents.
    ///
    /// Returns `&mut self` so a load can be chained into a lookup. On error
    /// the catalog is partially populated and must not be used until a
    /// subsequent load succeeds.
    pub fn load(&mut self, reader: &mut WireReader<'_>) -> Result<&mut Self> {
        self.name_index.clear();
        self.folded_index.take();

        let count = reader.read_u16()? as usize;
        if count > self.slots.len() {
            // Existing descriptors stay at their positions so their
            // allocations survive the grow.
            self.slots.resize_with(count, || None);
        }
        self.count = count;

        for pos in 0..count {
            let name = reader.read_cstr()?;
            let table_oid = reader.read_u32()?;
            let attr_number = reader.read_i16()?;
            let type_oid = reader.read_u32()?;
            let type_size = reader.read_i16()?;
            let type_modifier = reader.read_i32()?;
            let format = Format::from_wire(reader.read_i16()?)?;

            match &mut self.slots[pos] {
                Some(field) => field.populate(
                    &self.registry,
                    name,
                    table_oid,
                    attr_number,
                    type_oid,
                    type_size,
                    type_modifier,
                    format,
                ),
                slot @ None => {
                    *slot = Some(FieldDescription::new(
                        &self.registry,
                        name,
                        table_oid,
                        attr_number,
                        type_oid,
                        type_size,
                        type_modifier,
                        format,
                    ))
                }
            }
        }

        for pos in 0..count {
            if let Some(field) = &self.slots[pos] {
                // First occurrence wins on duplicate names; shadowed
                // duplicates stay reachable by position only.
                if !self.name_index.contains_key(field.name()) {
                    self.name_index.insert(field.name().to_owned(), pos);
                }
            }
        }

        trace!("RowDescription: {} fields", count);
        Ok(self)
    }

    /// Synthesize a catalog from replication RELATION metadata instead of a
    /// wire message.
    ///
    /// Every column gets the supplied `table_oid` and `format`, an attribute
    /// number equal to its 1-based position (the convention the wire path
    /// delivers), and a type size of zero since the replication stream does
    /// not carry one. Always allocates fresh storage.
    pub fn from_relation_columns(
        registry: Arc<TypeRegistry>,
        table_oid: u32,
        format: Format,
        columns: &[RelationColumn],
    ) -> Self {
        let mut slots = Vec::with_capacity(columns.len());
        let mut name_index = HashMap::with_capacity(columns.len());

        for (pos, column) in columns.iter().enumerate() {
            slots.push(Some(FieldDescription::new(
                &registry,
                column.name.clone(),
                table_oid,
                (pos + 1) as i16,
                column.type_oid,
                0,
                column.type_modifier,
                format,
            )));
            if !name_index.contains_key(&column.name) {
                name_index.insert(column.name.clone(), pos);
            }
        }

        Self {
            registry,
            count: columns.len(),
            slots,
            name_index,
            folded_index: OnceCell::new(),
        }
    }

    /// Number of fields in the current message.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The field at `pos`, if `pos` is within the current message.
    pub fn get(&self, pos: usize) -> Option<&FieldDescription> {
        if pos < self.count {
            self.slots[pos].as_ref()
        } else {
            None
        }
    }

    /// Ordered iteration over the fields of the current message.
    pub fn iter(&self) -> Fields<'_> {
        Fields {
            slots: self.slots[..self.count].iter(),
        }
    }

    /// Position of the field with exactly this name.
    ///
    /// Byte-for-byte equality only; absence is a normal outcome.
    pub fn try_field_index(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// Position of the field with exactly this name.
    ///
    /// # Panics
    ///
    /// Panics if no field has this name. A caller asking by name asserts
    /// the field exists in this row shape; use
    /// [`try_field_index`](Self::try_field_index) to probe.
    pub fn field_index(&self, name: &str) -> usize {
        match self.try_field_index(name) {
            Some(pos) => pos,
            None => panic!("no field named {:?} in row description", name),
        }
    }

    /// Position of the field matching this name under width- and
    /// case-insensitive folding.
    ///
    /// The fold index is built on the first insensitive lookup after a load
    /// and torn down by the next load; callers that only ever match exactly
    /// never pay for it.
    pub fn try_field_index_insensitive(&self, name: &str) -> Option<usize> {
        let folded = self.folded_index.get_or_init(|| {
            let mut index = HashMap::with_capacity(self.name_index.len());
            for (field_name, &pos) in &self.name_index {
                match index.entry(fold_identifier(field_name)) {
                    Entry::Vacant(entry) => {
                        entry.insert(pos);
                    }
                    Entry::Occupied(mut entry) => {
                        // Lowest position is canonical when two names fold
                        // to the same key.
                        if pos < *entry.get() {
                            entry.insert(pos);
                        }
                    }
                }
            }
            index
        });
        folded.get(&fold_identifier(name)).copied()
    }

    /// Whether the fold-insensitive index has been materialized since the
    /// last load.
    pub fn fold_index_built(&self) -> bool {
        self.folded_index.get().is_some()
    }

    /// The registry this catalog resolves strategies against.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }
}

impl Clone for RowDescription {
    /// Deep copy with no shared mutable state.
    ///
    /// Descriptors re-resolve their strategies against the shared registry,
    /// and the fold index starts out unbuilt. The clone may be read while
    /// the original keeps loading further messages.
    fn clone(&self) -> Self {
        let slots = self
            .slots
            .iter()
            .map(|slot| slot.as_ref().map(|field| field.reresolved(&self.registry)))
            .collect();
        Self {
            registry: Arc::clone(&self.registry),
            slots,
            count: self.count,
            name_index: self.name_index.clone(),
            folded_index: OnceCell::new(),
        }
    }
}

impl Index<usize> for RowDescription {
    type Output = FieldDescription;

    fn index(&self, pos: usize) -> &Self::Output {
        match self.get(pos) {
            Some(field) => field,
            None => panic!(
                "field position {} out of range for row description of {} fields",
                pos, self.count
            ),
        }
    }
}

impl<'a> IntoIterator for &'a RowDescription {
    type Item = &'a FieldDescription;
    type IntoIter = Fields<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ordered iterator over the populated fields of a [`RowDescription`].
///
/// Always starts at position zero; each call to
/// [`RowDescription::iter`] begins a fresh session.
pub struct Fields<'a> {
    slots: std::slice::Iter<'a, Option<FieldDescription>>,
}

impl<'a> Iterator for Fields<'a> {
    type Item = &'a FieldDescription;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.next()?.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}
