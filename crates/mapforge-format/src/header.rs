//! Cache file header (0x800 bytes).
//!
//! Two layouts exist. The standard layout is used by retail, Custom Edition
//! and native maps:
//!
//! ```text
//! 0x000 'head'            0x020 name[32]
//! 0x004 engine version    0x040 build[32]
//! 0x008 decompressed size 0x060 map type (u16)
//! 0x00C compressed pad    0x064 crc32
//! 0x010 tag data offset   0x7F8 forge bytes (reserved)
//! 0x014 tag data size     0x7FC 'foot'
//! ```
//!
//! The demo layout scatters the same fields through the header behind the
//! `Ehed`/`Gfot` literals.

use crate::bytes::{read_u16_le, read_u32_le, write_u16_le, write_u32_le};
use crate::error::FormatError;

pub const HEADER_SIZE: usize = 0x800;

pub const HEAD_LITERAL: u32 = 0x6865_6164;
pub const FOOT_LITERAL: u32 = 0x666F_6F74;
pub const DEMO_HEAD_LITERAL: u32 = 0x4568_6564;
pub const DEMO_FOOT_LITERAL: u32 = 0x4766_6F74;

const STRING_FIELD_SIZE: usize = 32;

/// Which header layout a cache file uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderLayout {
    Standard,
    Demo,
}

/// Field offsets for one layout.
struct Offsets {
    head: usize,
    engine: usize,
    decompressed_size: usize,
    compressed_padding: usize,
    tag_data_offset: usize,
    tag_data_size: usize,
    name: usize,
    build: usize,
    map_type: usize,
    crc32: usize,
    forge: usize,
    foot: usize,
    head_literal: u32,
    foot_literal: u32,
}

const STANDARD: Offsets = Offsets {
    head: 0x000,
    engine: 0x004,
    decompressed_size: 0x008,
    compressed_padding: 0x00C,
    tag_data_offset: 0x010,
    tag_data_size: 0x014,
    name: 0x020,
    build: 0x040,
    map_type: 0x060,
    crc32: 0x064,
    forge: 0x7F8,
    foot: 0x7FC,
    head_literal: HEAD_LITERAL,
    foot_literal: FOOT_LITERAL,
};

const DEMO: Offsets = Offsets {
    head: 0x2C0,
    engine: 0x588,
    decompressed_size: 0x5E8,
    compressed_padding: 0x5F4,
    tag_data_offset: 0x5EC,
    tag_data_size: 0x2C4,
    name: 0x58C,
    build: 0x2C8,
    map_type: 0x002,
    crc32: 0x5B0,
    forge: 0x004,
    foot: 0x5F0,
    head_literal: DEMO_HEAD_LITERAL,
    foot_literal: DEMO_FOOT_LITERAL,
};

impl HeaderLayout {
    fn offsets(self) -> &'static Offsets {
        match self {
            HeaderLayout::Standard => &STANDARD,
            HeaderLayout::Demo => &DEMO,
        }
    }

    /// Offset of the CRC32 field.
    pub fn crc32_offset(self) -> usize {
        self.offsets().crc32
    }

    /// Offset of the four reserved bytes rewritten by CRC forging.
    pub fn forge_offset(self) -> usize {
        self.offsets().forge
    }
}

/// Scenario kind stored in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum MapType {
    Singleplayer = 0,
    Multiplayer = 1,
    UserInterface = 2,
}

impl MapType {
    pub fn from_u16(value: u16) -> Option<MapType> {
        match value {
            0 => Some(MapType::Singleplayer),
            1 => Some(MapType::Multiplayer),
            2 => Some(MapType::UserInterface),
            _ => None,
        }
    }
}

impl std::fmt::Display for MapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MapType::Singleplayer => "singleplayer",
            MapType::Multiplayer => "multiplayer",
            MapType::UserInterface => "user interface",
        })
    }
}

/// Decoded cache file header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub engine_version: u32,
    /// Size of the whole file once decompressed.
    pub decompressed_size: u32,
    pub compressed_padding: u32,
    pub tag_data_offset: u32,
    pub tag_data_size: u32,
    pub name: String,
    pub build: String,
    /// Raw map type; see [`MapType::from_u16`].
    pub map_type: u16,
    pub crc32: u32,
}

impl Header {
    /// Encode into a full 0x800-byte header.
    pub fn to_bytes(&self, layout: HeaderLayout) -> Result<Vec<u8>, FormatError> {
        let o = layout.offsets();
        let mut bytes = vec![0u8; HEADER_SIZE];

        write_u32_le(&mut bytes, o.head, o.head_literal);
        write_u32_le(&mut bytes, o.engine, self.engine_version);
        write_u32_le(&mut bytes, o.decompressed_size, self.decompressed_size);
        write_u32_le(&mut bytes, o.compressed_padding, self.compressed_padding);
        write_u32_le(&mut bytes, o.tag_data_offset, self.tag_data_offset);
        write_u32_le(&mut bytes, o.tag_data_size, self.tag_data_size);
        write_string(&mut bytes, o.name, "scenario name", &self.name)?;
        write_string(&mut bytes, o.build, "build string", &self.build)?;
        write_u16_le(&mut bytes, o.map_type, self.map_type);
        write_u32_le(&mut bytes, o.crc32, self.crc32);
        write_u32_le(&mut bytes, o.foot, o.foot_literal);

        Ok(bytes)
    }

    /// Decode a header, detecting its layout from the literals.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Header, HeaderLayout), FormatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::FileTooSmall {
                actual: bytes.len(),
                minimum: HEADER_SIZE,
            });
        }

        let layout = [HeaderLayout::Standard, HeaderLayout::Demo]
            .into_iter()
            .find(|l| {
                let o = l.offsets();
                read_u32_le(bytes, o.head) == o.head_literal
                    && read_u32_le(bytes, o.foot) == o.foot_literal
            })
            .ok_or(FormatError::InvalidHeader)?;
        let o = layout.offsets();

        let header = Header {
            engine_version: read_u32_le(bytes, o.engine),
            decompressed_size: read_u32_le(bytes, o.decompressed_size),
            compressed_padding: read_u32_le(bytes, o.compressed_padding),
            tag_data_offset: read_u32_le(bytes, o.tag_data_offset),
            tag_data_size: read_u32_le(bytes, o.tag_data_size),
            name: read_string(bytes, o.name),
            build: read_string(bytes, o.build),
            map_type: read_u16_le(bytes, o.map_type),
            crc32: read_u32_le(bytes, o.crc32),
        };
        Ok((header, layout))
    }
}

/// Largest string that fits a 32-byte field with its terminator.
pub(crate) const MAX_STRING_LEN: usize = STRING_FIELD_SIZE - 1;

fn write_string(
    bytes: &mut [u8],
    offset: usize,
    field: &'static str,
    value: &str,
) -> Result<(), FormatError> {
    if value.len() > MAX_STRING_LEN {
        return Err(FormatError::StringTooLong {
            field,
            len: value.len(),
            max: MAX_STRING_LEN,
        });
    }
    bytes[offset..offset + value.len()].copy_from_slice(value.as_bytes());
    Ok(())
}

fn read_string(bytes: &[u8], offset: usize) -> String {
    let field = &bytes[offset..offset + STRING_FIELD_SIZE];
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
