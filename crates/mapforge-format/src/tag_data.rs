//! Tag data section records.
//!
//! The tag data section starts with a 40-byte header followed by the tag
//! array (32 bytes per tag). Tag ids are salted with the tag index so that
//! stale ids from another map are unlikely to resolve.

use crate::bytes::{read_u32_le, write_u32_le};
use crate::error::FormatError;

pub const TAG_DATA_HEADER_SIZE: usize = 40;
pub const TAG_ARRAY_ENTRY_SIZE: usize = 32;
pub const TAGS_LITERAL: u32 = 0x7461_6773;

/// Index 0xFFFF is reserved so no tag id collides with the null id.
pub const MAX_TAGS: usize = 0xFFFF;

const TAG_ID_SALT: u16 = 0xE174;

/// Tag id for the tag at `index`, or `None` past [`MAX_TAGS`].
pub fn tag_id(index: usize) -> Option<u32> {
    if index >= MAX_TAGS {
        return None;
    }
    let index = index as u16;
    let salt = TAG_ID_SALT.wrapping_add(index);
    Some(((salt as u32) << 16) | index as u32)
}

/// Tag index encoded in a tag id.
pub fn tag_index_from_id(id: u32) -> usize {
    (id & 0xFFFF) as usize
}

/// Header at the start of the tag data section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagDataHeader {
    pub tag_array_address: u32,
    pub scenario_tag_id: u32,
    /// Per-tag file checksums folded by the engine's checksum rule.
    pub tag_file_checksums: u32,
    pub tag_count: u32,
    pub model_part_count: u32,
    pub model_data_file_offset: u32,
    pub model_part_count_again: u32,
    pub vertex_size: u32,
    pub model_data_size: u32,
    pub literal: u32,
}

impl TagDataHeader {
    pub fn to_bytes(&self) -> [u8; TAG_DATA_HEADER_SIZE] {
        let mut bytes = [0u8; TAG_DATA_HEADER_SIZE];
        let fields = [
            self.tag_array_address,
            self.scenario_tag_id,
            self.tag_file_checksums,
            self.tag_count,
            self.model_part_count,
            self.model_data_file_offset,
            self.model_part_count_again,
            self.vertex_size,
            self.model_data_size,
            self.literal,
        ];
        for (i, value) in fields.into_iter().enumerate() {
            write_u32_le(&mut bytes, i * 4, value);
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < TAG_DATA_HEADER_SIZE {
            return Err(FormatError::InvalidTagData(format!(
                "tag data header needs {TAG_DATA_HEADER_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        let header = Self {
            tag_array_address: read_u32_le(bytes, 0),
            scenario_tag_id: read_u32_le(bytes, 4),
            tag_file_checksums: read_u32_le(bytes, 8),
            tag_count: read_u32_le(bytes, 12),
            model_part_count: read_u32_le(bytes, 16),
            model_data_file_offset: read_u32_le(bytes, 20),
            model_part_count_again: read_u32_le(bytes, 24),
            vertex_size: read_u32_le(bytes, 28),
            model_data_size: read_u32_le(bytes, 32),
            literal: read_u32_le(bytes, 36),
        };
        if header.literal != TAGS_LITERAL {
            return Err(FormatError::InvalidTagData(format!(
                "bad tags literal {:#010x}",
                header.literal
            )));
        }
        Ok(header)
    }
}

/// One entry of the tag array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagArrayEntry {
    pub primary_class: u32,
    pub secondary_class: u32,
    pub tertiary_class: u32,
    pub tag_id: u32,
    pub path_address: u32,
    /// Base struct address, or the resource index of an indexed tag.
    pub data: u32,
    pub indexed: u32,
}

impl TagArrayEntry {
    pub fn to_bytes(&self) -> [u8; TAG_ARRAY_ENTRY_SIZE] {
        let mut bytes = [0u8; TAG_ARRAY_ENTRY_SIZE];
        write_u32_le(&mut bytes, 0, self.primary_class);
        write_u32_le(&mut bytes, 4, self.secondary_class);
        write_u32_le(&mut bytes, 8, self.tertiary_class);
        write_u32_le(&mut bytes, 12, self.tag_id);
        write_u32_le(&mut bytes, 16, self.path_address);
        write_u32_le(&mut bytes, 20, self.data);
        write_u32_le(&mut bytes, 24, self.indexed);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            primary_class: read_u32_le(bytes, 0),
            secondary_class: read_u32_le(bytes, 4),
            tertiary_class: read_u32_le(bytes, 8),
            tag_id: read_u32_le(bytes, 12),
            path_address: read_u32_le(bytes, 16),
            data: read_u32_le(bytes, 20),
            indexed: read_u32_le(bytes, 24),
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed != 0
    }
}
