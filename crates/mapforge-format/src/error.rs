/// Error reading or producing an on-disk structure.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("file too small: {actual} bytes (minimum {minimum})")]
    FileTooSmall { actual: usize, minimum: usize },
    #[error("invalid header: no known head/foot literals")]
    InvalidHeader,
    #[error("unsupported engine version: {0:#x}")]
    UnsupportedEngine(u32),
    #[error("{field} is too long: {len} bytes (maximum {max})")]
    StringTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("invalid tag data: {0}")]
    InvalidTagData(String),
    #[error("invalid resource map: {0}")]
    InvalidResourceMap(String),
    #[error("offset {offset:#x} out of range for {len} bytes")]
    OutOfRange { offset: usize, len: usize },
    #[error("CRC32 forge failed: expected {expected:#010x}, got {actual:#010x}")]
    ForgeFailed { expected: u32, actual: u32 },
    #[error("compression failed: {0}")]
    Compression(std::io::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decompressed size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: usize, actual: usize },
}
