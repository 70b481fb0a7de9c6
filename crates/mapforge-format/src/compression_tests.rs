use crate::FormatError;
use crate::compression::{DEFAULT_LEVEL, compress_map, compress_verified, decompress_map};
use crate::header::HEADER_SIZE;

fn map_bytes() -> Vec<u8> {
    let mut data = vec![0xEEu8; HEADER_SIZE];
    data.extend((0..20_000u32).map(|i| (i % 7) as u8));
    data
}

#[test]
fn header_is_kept_verbatim() {
    let data = map_bytes();
    let compressed = compress_map(&data, 3).unwrap();

    assert_eq!(&compressed[..HEADER_SIZE], &data[..HEADER_SIZE]);
    assert!(compressed.len() < data.len());
}

#[test]
fn verified_compression_restores() {
    let data = map_bytes();
    let compressed = compress_verified(&data, DEFAULT_LEVEL).unwrap();
    assert_eq!(decompress_map(&compressed, data.len()).unwrap(), data);
}

#[test]
fn size_mismatch_is_reported() {
    let data = map_bytes();
    let compressed = compress_map(&data, 3).unwrap();
    let err = decompress_map(&compressed, data.len() + 1).unwrap_err();
    assert!(matches!(err, FormatError::SizeMismatch { .. }));
}

#[test]
fn too_small_to_compress() {
    let err = compress_map(&[0u8; 10], 3).unwrap_err();
    assert!(matches!(err, FormatError::FileTooSmall { .. }));
}
