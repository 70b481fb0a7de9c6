use crate::{FormatError, ResourceMap, ResourceMapType, write_resource_map};

#[test]
fn write_then_parse() {
    let bytes = write_resource_map(
        ResourceMapType::Bitmaps,
        &[
            ("ui\\shell\\bitmaps\\background", b"pixels"),
            ("sky\\sky", b"\x01\x02\x03"),
        ],
    );
    let map = ResourceMap::parse(&bytes).unwrap();

    assert_eq!(map.kind(), ResourceMapType::Bitmaps);
    assert_eq!(map.len(), 2);
    assert_eq!(map.find("sky\\sky"), Some(1));
    assert_eq!(map.find("missing"), None);

    let entry = map.get(0).unwrap();
    assert_eq!(entry.path, "ui\\shell\\bitmaps\\background");
    assert_eq!(entry.data, b"pixels");
    assert_eq!(entry.data_offset, 16);
    assert_eq!(map.get(1).unwrap().data_offset, 22);
}

#[test]
fn empty_map() {
    let bytes = write_resource_map(ResourceMapType::Loc, &[]);
    let map = ResourceMap::parse(&bytes).unwrap();
    assert!(map.is_empty());
    assert_eq!(map.kind(), ResourceMapType::Loc);
}

#[test]
fn rejects_unknown_type() {
    let mut bytes = write_resource_map(ResourceMapType::Sounds, &[]);
    bytes[0] = 9;
    let err = ResourceMap::parse(&bytes).unwrap_err();
    assert!(matches!(err, FormatError::InvalidResourceMap(_)));
}

#[test]
fn rejects_truncated_table() {
    let bytes = write_resource_map(ResourceMapType::Sounds, &[("a", b"xyz")]);
    let err = ResourceMap::parse(&bytes[..bytes.len() - 4]).unwrap_err();
    assert!(matches!(err, FormatError::OutOfRange { .. }));
}
