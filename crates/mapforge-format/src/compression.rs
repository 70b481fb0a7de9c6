//! Whole-file compression for engines that support it.
//!
//! The 0x800-byte header is kept as is; everything after it is a single
//! zstd frame. The header's decompressed size describes the original file.

use crate::error::FormatError;
use crate::header::HEADER_SIZE;

pub const DEFAULT_LEVEL: i32 = 19;

/// Compress everything after the header.
pub fn compress_map(data: &[u8], level: i32) -> Result<Vec<u8>, FormatError> {
    if data.len() < HEADER_SIZE {
        return Err(FormatError::FileTooSmall {
            actual: data.len(),
            minimum: HEADER_SIZE,
        });
    }
    let body = zstd::encode_all(&data[HEADER_SIZE..], level).map_err(FormatError::Compression)?;

    let mut out = Vec::with_capacity(HEADER_SIZE + body.len());
    out.extend_from_slice(&data[..HEADER_SIZE]);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Inverse of [`compress_map`]; `expected_size` is the full decompressed size.
pub fn decompress_map(data: &[u8], expected_size: usize) -> Result<Vec<u8>, FormatError> {
    if data.len() < HEADER_SIZE {
        return Err(FormatError::FileTooSmall {
            actual: data.len(),
            minimum: HEADER_SIZE,
        });
    }
    let body = zstd::decode_all(&data[HEADER_SIZE..]).map_err(FormatError::Compression)?;

    let mut out = Vec::with_capacity(HEADER_SIZE + body.len());
    out.extend_from_slice(&data[..HEADER_SIZE]);
    out.extend_from_slice(&body);
    if out.len() != expected_size {
        return Err(FormatError::SizeMismatch {
            header: expected_size,
            actual: out.len(),
        });
    }
    Ok(out)
}

/// Compress and check that the result decompresses back to the same bytes.
pub fn compress_verified(data: &[u8], level: i32) -> Result<Vec<u8>, FormatError> {
    let compressed = compress_map(data, level)?;
    let restored = decompress_map(&compressed, data.len())?;
    if restored != data {
        return Err(FormatError::SizeMismatch {
            header: data.len(),
            actual: restored.len(),
        });
    }
    Ok(compressed)
}
