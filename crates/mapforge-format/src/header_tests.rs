use crate::{
    DEMO_HEAD_LITERAL, FOOT_LITERAL, FormatError, HEAD_LITERAL, HEADER_SIZE, Header, HeaderLayout,
    MapType, read_u16_le, read_u32_le,
};

fn sample() -> Header {
    Header {
        engine_version: 609,
        decompressed_size: 0x1_2345,
        compressed_padding: 0,
        tag_data_offset: 0x9000,
        tag_data_size: 0x3000,
        name: "bloodgulch".to_string(),
        build: "01.00.00.0609".to_string(),
        map_type: MapType::Multiplayer as u16,
        crc32: 0x7B30_9554,
    }
}

#[test]
fn standard_layout_offsets() {
    let bytes = sample().to_bytes(HeaderLayout::Standard).unwrap();

    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(read_u32_le(&bytes, 0x000), HEAD_LITERAL);
    assert_eq!(read_u32_le(&bytes, 0x004), 609);
    assert_eq!(read_u32_le(&bytes, 0x010), 0x9000);
    assert_eq!(&bytes[0x20..0x2A], b"bloodgulch");
    assert_eq!(bytes[0x2A], 0);
    assert_eq!(&bytes[0x40..0x4D], b"01.00.00.0609");
    assert_eq!(read_u32_le(&bytes, 0x064), 0x7B30_9554);
    assert_eq!(read_u32_le(&bytes, 0x7FC), FOOT_LITERAL);
}

#[test]
fn both_layouts_decode_to_same_header() {
    for layout in [HeaderLayout::Standard, HeaderLayout::Demo] {
        let bytes = sample().to_bytes(layout).unwrap();
        let (decoded, detected) = Header::from_bytes(&bytes).unwrap();
        assert_eq!(detected, layout);
        assert_eq!(decoded, sample());
    }
}

#[test]
fn demo_layout_literals() {
    let bytes = sample().to_bytes(HeaderLayout::Demo).unwrap();
    assert_eq!(read_u32_le(&bytes, 0x2C0), DEMO_HEAD_LITERAL);
    assert_eq!(read_u16_le(&bytes, 0x002), MapType::Multiplayer as u16);
    assert_eq!(read_u32_le(&bytes, HeaderLayout::Demo.crc32_offset()), 0x7B30_9554);
}

#[test]
fn forge_offset_is_unused_by_fields() {
    for layout in [HeaderLayout::Standard, HeaderLayout::Demo] {
        let bytes = sample().to_bytes(layout).unwrap();
        let offset = layout.forge_offset();
        assert_eq!(&bytes[offset..offset + 4], &[0, 0, 0, 0]);
    }
}

#[test]
fn name_must_leave_room_for_terminator() {
    let mut header = sample();
    header.name = "a".repeat(31);
    assert!(header.to_bytes(HeaderLayout::Standard).is_ok());

    header.name = "a".repeat(32);
    let err = header.to_bytes(HeaderLayout::Standard).unwrap_err();
    assert!(matches!(err, FormatError::StringTooLong { len: 32, .. }));
}

#[test]
fn rejects_garbage() {
    let err = Header::from_bytes(&[0u8; 16]).unwrap_err();
    assert!(matches!(err, FormatError::FileTooSmall { actual: 16, .. }));

    let err = Header::from_bytes(&vec![0u8; HEADER_SIZE]).unwrap_err();
    assert!(matches!(err, FormatError::InvalidHeader));
}

#[test]
fn map_type_from_u16() {
    assert_eq!(MapType::from_u16(0), Some(MapType::Singleplayer));
    assert_eq!(MapType::from_u16(2), Some(MapType::UserInterface));
    assert_eq!(MapType::from_u16(3), None);
}
