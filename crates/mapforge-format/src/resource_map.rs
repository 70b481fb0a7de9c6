//! Resource maps (`bitmaps.map`, `sounds.map`, `loc.map`).
//!
//! ```text
//! header:  type, paths offset, resources offset, resource count (4 x u32)
//! entry:   path offset (relative to paths offset), size, data offset
//! paths:   NUL-terminated strings
//! ```

use crate::bytes::{read_u32_le, write_u32_le};
use crate::error::FormatError;

const HEADER_SIZE: usize = 16;
const ENTRY_SIZE: usize = 12;

/// Kind of resource map, as stored in its header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceMapType {
    Bitmaps = 1,
    Sounds = 2,
    Loc = 3,
}

impl ResourceMapType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Bitmaps),
            2 => Some(Self::Sounds),
            3 => Some(Self::Loc),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceMapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Bitmaps => "bitmaps",
            Self::Sounds => "sounds",
            Self::Loc => "loc",
        })
    }
}

/// A resource borrowed from a parsed map.
#[derive(Clone, Copy, Debug)]
pub struct ResourceEntry<'a> {
    pub path: &'a str,
    pub data: &'a [u8],
    /// Absolute offset of `data` in the resource map file.
    pub data_offset: u32,
}

/// Parsed view over resource map bytes.
#[derive(Debug)]
pub struct ResourceMap<'a> {
    kind: ResourceMapType,
    entries: Vec<ResourceEntry<'a>>,
}

impl<'a> ResourceMap<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::FileTooSmall {
                actual: bytes.len(),
                minimum: HEADER_SIZE,
            });
        }

        let raw_kind = read_u32_le(bytes, 0);
        let kind = ResourceMapType::from_u32(raw_kind).ok_or_else(|| {
            FormatError::InvalidResourceMap(format!("unknown resource map type {raw_kind}"))
        })?;
        let paths_offset = read_u32_le(bytes, 4) as usize;
        let resources_offset = read_u32_le(bytes, 8) as usize;
        let count = read_u32_le(bytes, 12) as usize;

        let table_end = count
            .checked_mul(ENTRY_SIZE)
            .and_then(|size| size.checked_add(resources_offset))
            .filter(|&end| end <= bytes.len())
            .ok_or(FormatError::OutOfRange {
                offset: resources_offset,
                len: bytes.len(),
            })?;

        let mut entries = Vec::with_capacity(count);
        for entry in bytes[resources_offset..table_end].chunks_exact(ENTRY_SIZE) {
            let path_offset = paths_offset + read_u32_le(entry, 0) as usize;
            let size = read_u32_le(entry, 4) as usize;
            let data_offset = read_u32_le(entry, 8);

            let path = read_c_str(bytes, path_offset)?;
            let start = data_offset as usize;
            let data = start
                .checked_add(size)
                .and_then(|end| bytes.get(start..end))
                .ok_or(FormatError::OutOfRange {
                    offset: start,
                    len: bytes.len(),
                })?;

            entries.push(ResourceEntry {
                path,
                data,
                data_offset,
            });
        }

        Ok(Self { kind, entries })
    }

    pub fn kind(&self) -> ResourceMapType {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ResourceEntry<'a>> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ResourceEntry<'a>] {
        &self.entries
    }

    /// Index of the first resource with this path.
    pub fn find(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.path == path)
    }
}

fn read_c_str(bytes: &[u8], offset: usize) -> Result<&str, FormatError> {
    let tail = bytes.get(offset..).ok_or(FormatError::OutOfRange {
        offset,
        len: bytes.len(),
    })?;
    let end = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| FormatError::InvalidResourceMap(format!("unterminated path at {offset:#x}")))?;
    std::str::from_utf8(&tail[..end])
        .map_err(|_| FormatError::InvalidResourceMap(format!("non-UTF-8 path at {offset:#x}")))
}

/// Serialize a resource map: header, resource data, paths, then the entry table.
pub fn write_resource_map(kind: ResourceMapType, resources: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = vec![0u8; HEADER_SIZE];
    let mut data_offsets = Vec::with_capacity(resources.len());
    for (_, data) in resources {
        data_offsets.push(out.len() as u32);
        out.extend_from_slice(data);
    }

    let paths_offset = out.len();
    let mut path_offsets = Vec::with_capacity(resources.len());
    for (path, _) in resources {
        path_offsets.push((out.len() - paths_offset) as u32);
        out.extend_from_slice(path.as_bytes());
        out.push(0);
    }

    let resources_offset = out.len();
    for (i, (_, data)) in resources.iter().enumerate() {
        let mut entry = [0u8; ENTRY_SIZE];
        write_u32_le(&mut entry, 0, path_offsets[i]);
        write_u32_le(&mut entry, 4, data.len() as u32);
        write_u32_le(&mut entry, 8, data_offsets[i]);
        out.extend_from_slice(&entry);
    }

    write_u32_le(&mut out, 0, kind as u32);
    write_u32_le(&mut out, 4, paths_offset as u32);
    write_u32_le(&mut out, 8, resources_offset as u32);
    write_u32_le(&mut out, 12, resources.len() as u32);
    out
}
