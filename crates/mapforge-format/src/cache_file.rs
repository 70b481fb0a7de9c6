//! Cache file reader.
//!
//! Parses the header, tag data header and tag array of a built map and
//! resolves memory addresses back to file bytes.

use std::path::Path;

use crate::bytes::read_u32_le;
use crate::compression::decompress_map;
use crate::engine::Engine;
use crate::error::FormatError;
use crate::header::{HEADER_SIZE, Header, HeaderLayout};
use crate::tag_data::{
    TAG_ARRAY_ENTRY_SIZE, TAG_DATA_HEADER_SIZE, TagArrayEntry, TagDataHeader,
};

/// A region of the file loaded at a fixed address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Section {
    pub file_offset: usize,
    pub size: usize,
    pub address: u32,
}

/// One tag as listed in the tag array.
#[derive(Clone, Debug)]
pub struct CachedTag {
    pub entry: TagArrayEntry,
    pub path: String,
}

/// A parsed cache file.
#[derive(Debug)]
pub struct CacheFile {
    data: Vec<u8>,
    header: Header,
    layout: HeaderLayout,
    engine: Option<Engine>,
    tag_data_header: TagDataHeader,
    tags: Vec<CachedTag>,
    sections: Vec<Section>,
}

impl CacheFile {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Parse a map, decompressing it first if the header says so.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FormatError> {
        let (header, layout) = Header::from_bytes(&data)?;
        let engine = Engine::from_version(header.engine_version);

        let data = match engine {
            Some(e)
                if e.info().supports_compression
                    && header.decompressed_size as usize != data.len() =>
            {
                decompress_map(&data, header.decompressed_size as usize)?
            }
            _ => data,
        };

        let tag_data_offset = header.tag_data_offset as usize;
        let tag_data_size = header.tag_data_size as usize;
        if tag_data_size < TAG_DATA_HEADER_SIZE
            || tag_data_offset < HEADER_SIZE
            || tag_data_offset + tag_data_size > data.len()
        {
            return Err(FormatError::OutOfRange {
                offset: tag_data_offset,
                len: data.len(),
            });
        }

        let tag_data_header = TagDataHeader::from_bytes(&data[tag_data_offset..])?;
        let tag_data_address = tag_data_header
            .tag_array_address
            .wrapping_sub(TAG_DATA_HEADER_SIZE as u32);

        let mut file = Self {
            data,
            header,
            layout,
            engine,
            tag_data_header,
            tags: Vec::new(),
            sections: vec![Section {
                file_offset: tag_data_offset,
                size: tag_data_size,
                address: tag_data_address,
            }],
        };
        file.tags = file.read_tag_array()?;
        Ok(file)
    }

    fn read_tag_array(&self) -> Result<Vec<CachedTag>, FormatError> {
        let count = self.tag_data_header.tag_count as usize;
        let array = self
            .read(
                self.tag_data_header.tag_array_address,
                count * TAG_ARRAY_ENTRY_SIZE,
            )
            .ok_or_else(|| FormatError::InvalidTagData(format!("tag array of {count} tags")))?;

        array
            .chunks_exact(TAG_ARRAY_ENTRY_SIZE)
            .map(|bytes| {
                let entry = TagArrayEntry::from_bytes(bytes);
                let path = self.read_c_str(entry.path_address).ok_or_else(|| {
                    FormatError::InvalidTagData(format!(
                        "tag path at {:#010x} is out of range",
                        entry.path_address
                    ))
                })?;
                Ok(CachedTag { entry, path })
            })
            .collect()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn layout(&self) -> HeaderLayout {
        self.layout
    }

    pub fn engine(&self) -> Option<Engine> {
        self.engine
    }

    pub fn tag_data_header(&self) -> &TagDataHeader {
        &self.tag_data_header
    }

    pub fn tags(&self) -> &[CachedTag] {
        &self.tags
    }

    /// Decompressed file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Address the tag data section is loaded at.
    pub fn tag_data_address(&self) -> u32 {
        self.sections[0].address
    }

    /// Register another loaded section (a BSP) for address resolution.
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Bytes at `address`, if `len` bytes fit inside one loaded section.
    pub fn read(&self, address: u32, len: usize) -> Option<&[u8]> {
        self.sections.iter().find_map(|s| {
            let start = address.checked_sub(s.address)? as usize;
            let end = start.checked_add(len)?;
            if end > s.size {
                return None;
            }
            self.data
                .get(s.file_offset + start..s.file_offset + end)
        })
    }

    pub fn read_u32(&self, address: u32) -> Option<u32> {
        self.read(address, 4).map(|b| read_u32_le(b, 0))
    }

    /// NUL-terminated string at `address`.
    pub fn read_c_str(&self, address: u32) -> Option<String> {
        let section = self.sections.iter().find(|s| {
            address
                .checked_sub(s.address)
                .is_some_and(|off| (off as usize) < s.size)
        })?;
        let start = section.file_offset + (address - section.address) as usize;
        let end = section.file_offset + section.size;
        let bytes = self.data.get(start..end)?;
        let len = bytes.iter().position(|&b| b == 0)?;
        Some(String::from_utf8_lossy(&bytes[..len]).into_owned())
    }
}
