//! Tag file model.
//!
//! A tag file is a tree of named fields whose byte layout is carried by the
//! tree itself. The build pipeline only relies on the generic encodings
//! below; what a field means is up to the engine.
//!
//! | value        | bytes | layout                                              |
//! |--------------|-------|-----------------------------------------------------|
//! | `int8`       | 1     |                                                     |
//! | `int16`      | 2     |                                                     |
//! | `int32`      | 4     | also `uint*`, `float`                               |
//! | `string`     | 32    | NUL padded                                          |
//! | `reference`  | 16    | class, path pointer, path length, tag id (4 if id only) |
//! | `block`      | 12    | count, pointer, 0                                   |
//! | `data`       | 20    | size, flags, file offset, pointer, 0                |
//! | `asset`      | 20    | size, flags, offset, 0, 0                           |
//! | `vertices`   | 12    | count, pool offset, 0                               |
//! | `indices`    | 12    | count, pool offset, 0                               |

mod json;

#[cfg(test)]
mod tag_tests;

pub use json::JsonTagParser;

use mapforge_core::TagClass;
use serde::{Deserialize, Serialize};

pub const STRING_SIZE: usize = 32;
pub const REFERENCE_SIZE: usize = 16;
pub const ID_ONLY_REFERENCE_SIZE: usize = 4;
pub const BLOCK_SIZE: usize = 12;
pub const DATA_SIZE: usize = 20;
pub const ASSET_SIZE: usize = 20;
pub const MODEL_DATA_SIZE: usize = 12;

/// Size of one uncompressed model vertex.
pub const VERTEX_SIZE: usize = 68;
/// Size of one model triangle index.
pub const INDEX_SIZE: usize = 2;

/// Offset of the pointer inside a block field.
pub const BLOCK_POINTER_OFFSET: usize = 4;
/// Offset of the pointer inside a data field.
pub const DATA_POINTER_OFFSET: usize = 12;

/// A parsed tag file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagFile {
    pub class: TagClass,
    pub root: FieldStruct,
}

/// An ordered list of fields; one struct in the compiled output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldStruct {
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub value: FieldValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldValue {
    Int8 {
        value: i8,
    },
    Uint8 {
        value: u8,
    },
    Int16 {
        value: i16,
    },
    Uint16 {
        value: u16,
    },
    Int32 {
        value: i32,
    },
    Uint32 {
        value: u32,
    },
    Float {
        value: f32,
    },
    String {
        value: String,
    },
    Pad {
        size: usize,
    },
    Bytes {
        data: Vec<u8>,
    },
    Reference {
        class: TagClass,
        /// `None` is a null reference.
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        id_only: bool,
    },
    Block {
        elements: Vec<FieldStruct>,
        #[serde(default)]
        unsafe_to_dedupe: bool,
    },
    Data {
        data: Vec<u8>,
        #[serde(default)]
        unsafe_to_dedupe: bool,
    },
    Asset {
        data: Vec<u8>,
    },
    Vertices {
        data: Vec<u8>,
    },
    Indices {
        data: Vec<u8>,
    },
}

impl FieldValue {
    /// Encoded size inside its struct.
    pub fn size(&self) -> usize {
        match self {
            Self::Int8 { .. } | Self::Uint8 { .. } => 1,
            Self::Int16 { .. } | Self::Uint16 { .. } => 2,
            Self::Int32 { .. } | Self::Uint32 { .. } | Self::Float { .. } => 4,
            Self::String { .. } => STRING_SIZE,
            Self::Pad { size } => *size,
            Self::Bytes { data } => data.len(),
            Self::Reference { id_only: true, .. } => ID_ONLY_REFERENCE_SIZE,
            Self::Reference { .. } => REFERENCE_SIZE,
            Self::Block { .. } => BLOCK_SIZE,
            Self::Data { .. } => DATA_SIZE,
            Self::Asset { .. } => ASSET_SIZE,
            Self::Vertices { .. } | Self::Indices { .. } => MODEL_DATA_SIZE,
        }
    }
}

impl Field {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl FieldStruct {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Encoded size of all fields.
    pub fn size(&self) -> usize {
        self.fields.iter().map(|f| f.value.size()).sum()
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Byte offset of the first field called `name`.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for field in &self.fields {
            if field.name == name {
                return Some(offset);
            }
            offset += field.value.size();
        }
        None
    }

    /// Byte offset of the first reference field.
    pub fn first_reference_offset(&self) -> Option<usize> {
        let mut offset = 0;
        for field in &self.fields {
            if let FieldValue::Reference { .. } = field.value {
                return Some(offset);
            }
            offset += field.value.size();
        }
        None
    }
}

/// Error produced by a [`TagParser`].
#[derive(Debug, thiserror::Error)]
pub enum TagParseError {
    #[error("invalid tag file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a {expected} tag, found {found}")]
    ClassMismatch { expected: TagClass, found: TagClass },
}

/// Turns tag file bytes into a field tree.
pub trait TagParser {
    fn parse(&self, class: TagClass, bytes: &[u8]) -> Result<TagFile, TagParseError>;
}
