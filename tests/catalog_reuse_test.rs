//! Public-API tests for catalog reuse across a stream of messages, the way
//! a connection would drive it: one catalog, many loads, with clones taken
//! for metadata that must outlive the next message.

use bytes::{BufMut, Bytes, BytesMut};
use std::sync::Arc;

use pg_rowdesc::{Format, RowDescription, TypeRegistry, WireReader};

fn encode_message(fields: &[(&str, u32, i16)]) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_u16(fields.len() as u16);
    for (name, type_oid, format_code) in fields {
        buf.put(name.as_bytes());
        buf.put_u8(0);
        buf.put_u32(0); // table oid
        buf.put_i16(0); // attr number
        buf.put_u32(*type_oid);
        buf.put_i16(-1); // type size
        buf.put_i32(-1); // type modifier
        buf.put_i16(*format_code);
    }
    buf.freeze()
}

#[test]
fn catalog_survives_a_stream_of_result_shapes() {
    let registry = Arc::new(TypeRegistry::new());
    let mut row = RowDescription::new(Arc::clone(&registry));

    // A wide statement, then a narrow one, then wide again.
    let shapes: Vec<Vec<(&str, u32, i16)>> = vec![
        vec![("id", 23, 1), ("name", 25, 0), ("active", 16, 1)],
        vec![("count", 20, 1)],
        vec![("a", 700, 1), ("b", 701, 1), ("c", 25, 0), ("d", 23, 1)],
    ];

    for shape in &shapes {
        let msg = encode_message(shape);
        row.load(&mut WireReader::new(&msg)).unwrap();

        assert_eq!(row.len(), shape.len());
        for (pos, ((name, type_oid, format_code), f)) in shape.iter().zip(row.iter()).enumerate() {
            assert_eq!(f.name(), *name);
            assert_eq!(f.type_oid(), *type_oid);
            assert_eq!(f.format().code(), *format_code);
            assert_eq!(row.try_field_index(name), Some(pos));
        }
    }
}

#[test]
fn cloned_shape_outlives_the_next_message() {
    let registry = Arc::new(TypeRegistry::new());
    let mut row = RowDescription::new(Arc::clone(&registry));

    let first = encode_message(&[("id", 23, 1), ("payload", 25, 0)]);
    row.load(&mut WireReader::new(&first)).unwrap();
    let cached = row.clone();

    let second = encode_message(&[("unrelated", 16, 1)]);
    row.load(&mut WireReader::new(&second)).unwrap();

    assert_eq!(cached.len(), 2);
    assert_eq!(cached.field_index("payload"), 1);
    assert_eq!(cached[0].type_oid(), 23);
    assert!(Arc::ptr_eq(cached[0].handler(), &registry.resolve(23)));
    assert!(Arc::ptr_eq(cached[1].handler(), &registry.text_handler()));
}

#[test]
fn format_decides_the_strategy() {
    let registry = Arc::new(TypeRegistry::new());
    let mut row = RowDescription::new(Arc::clone(&registry));

    // Same type OID in both formats.
    let msg = encode_message(&[("bin", 23, 1), ("txt", 23, 0)]);
    row.load(&mut WireReader::new(&msg)).unwrap();

    assert!(Arc::ptr_eq(row[0].handler(), &registry.resolve(23)));
    assert!(Arc::ptr_eq(row[1].handler(), &registry.text_handler()));
    assert_eq!(row[0].format(), Format::Binary);
    assert_eq!(row[1].format(), Format::Text);
}
