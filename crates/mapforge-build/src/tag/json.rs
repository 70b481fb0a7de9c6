use mapforge_core::TagClass;

use super::{TagFile, TagParseError, TagParser};

/// Reads tag files stored as JSON field trees.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonTagParser;

impl TagParser for JsonTagParser {
    fn parse(&self, class: TagClass, bytes: &[u8]) -> Result<TagFile, TagParseError> {
        let file: TagFile = serde_json::from_slice(bytes)?;
        if file.class != class {
            return Err(TagParseError::ClassMismatch {
                expected: class,
                found: file.class,
            });
        }
        Ok(file)
    }
}
