//! Type OID resolution.
//!
//! Maps a PostgreSQL type OID and a wire format to the strategy used to
//! decode that column's values. Resolution never fails: a server may well
//! support types this crate has no native knowledge of, and those degrade
//! to opaque handling instead of erroring.

use std::collections::HashMap;
use std::sync::Arc;

/// How a column's raw bytes are interpreted once values start arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    /// Server-side text representation, decoded as UTF-8.
    Text,
    /// Raw bytes passed through untouched.
    Opaque,
}

/// A resolved decoding strategy for one type OID.
///
/// Handlers are shared via [`Arc`]; two fields resolved to the same strategy
/// hold pointers to the same handler, so identity checks are cheap.
#[derive(Debug)]
pub struct TypeHandler {
    oid: u32,
    name: &'static str,
    kind: ValueKind,
}

impl TypeHandler {
    fn new(oid: u32, name: &'static str, kind: ValueKind) -> Arc<Self> {
        Arc::new(Self { oid, name, kind })
    }

    pub fn oid(&self) -> u32 {
        self.oid
    }

    /// The PostgreSQL type name, e.g. `int4`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

/// Registry of type handlers, shared read-only across all catalogs on a
/// connection.
///
/// Lookups are queries only; nothing in the decode path mutates the
/// registry, so one `Arc<TypeRegistry>` may serve concurrent resolution
/// from many catalogs at once.
pub struct TypeRegistry {
    by_oid: HashMap<u32, Arc<TypeHandler>>,
    unknown: Arc<TypeHandler>,
    text: Arc<TypeHandler>,
}

impl TypeRegistry {
    /// Build a registry with handlers for the built-in PostgreSQL types.
    pub fn new() -> Self {
        let mut by_oid = HashMap::new();
        for handler in [
            TypeHandler::new(16, "bool", ValueKind::Bool),
            TypeHandler::new(17, "bytea", ValueKind::Opaque),
            TypeHandler::new(18, "char", ValueKind::Text),
            TypeHandler::new(19, "name", ValueKind::Text),
            TypeHandler::new(20, "int8", ValueKind::Int8),
            TypeHandler::new(21, "int2", ValueKind::Int2),
            TypeHandler::new(23, "int4", ValueKind::Int4),
            TypeHandler::new(25, "text", ValueKind::Text),
            TypeHandler::new(26, "oid", ValueKind::Int4),
            TypeHandler::new(114, "json", ValueKind::Text),
            TypeHandler::new(700, "float4", ValueKind::Float4),
            TypeHandler::new(701, "float8", ValueKind::Float8),
            TypeHandler::new(1042, "bpchar", ValueKind::Text),
            TypeHandler::new(1043, "varchar", ValueKind::Text),
            TypeHandler::new(1114, "timestamp", ValueKind::Text),
            TypeHandler::new(1184, "timestamptz", ValueKind::Text),
            TypeHandler::new(1700, "numeric", ValueKind::Text),
            TypeHandler::new(2950, "uuid", ValueKind::Opaque),
            TypeHandler::new(3802, "jsonb", ValueKind::Text),
        ] {
            by_oid.insert(handler.oid(), handler);
        }

        Self {
            by_oid,
            unknown: TypeHandler::new(0, "unknown", ValueKind::Opaque),
            text: TypeHandler::new(0, "unrecognized", ValueKind::Text),
        }
    }

    /// Resolve a binary-format strategy for `oid`.
    ///
    /// OIDs the registry has no handler for resolve to the opaque
    /// [`unknown_handler`](Self::unknown_handler), never an error.
    pub fn resolve(&self, oid: u32) -> Arc<TypeHandler> {
        self.by_oid
            .get(&oid)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.unknown))
    }

    /// The fallback strategy for binary columns of unknown type.
    pub fn unknown_handler(&self) -> Arc<TypeHandler> {
        Arc::clone(&self.unknown)
    }

    /// The shared strategy for text-format columns.
    ///
    /// Text values carry their own representation, so the type OID plays no
    /// part in choosing this strategy.
    pub fn text_handler(&self) -> Arc<TypeHandler> {
        Arc::clone(&self.text)
    }

    /// Human-readable name for a type OID, for diagnostics only.
    pub fn type_name(&self, oid: u32) -> Option<&'static str> {
        self.by_oid.get(&oid).map(|h| h.name())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_oid() {
        let registry = TypeRegistry::new();
        let handler = registry.resolve(23);
        assert_eq!(handler.name(), "int4");
        assert_eq!(handler.kind(), ValueKind::Int4);
    }

    #[test]
    fn test_resolve_unknown_oid_falls_back() {
        let registry = TypeRegistry::new();
        let handler = registry.resolve(999_999);
        assert!(Arc::ptr_eq(&handler, &registry.unknown_handler()));
    }

    #[test]
    fn test_text_handler_is_a_singleton() {
        let registry = TypeRegistry::new();
        assert!(Arc::ptr_eq(
            &registry.text_handler(),
            &registry.text_handler()
        ));
    }

    #[test]
    fn test_type_name_lookup() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.type_name(25), Some("text"));
        assert_eq!(registry.type_name(999_999), None);
    }
}
