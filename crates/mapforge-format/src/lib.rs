//! On-disk formats for mapforge.
//!
//! This crate contains:
//! - Engine targets and their limits ([`Engine`], [`EngineInfo`])
//! - The cache file header in both layouts ([`Header`], [`HeaderLayout`])
//! - Tag data header and tag array records ([`TagDataHeader`], [`TagArrayEntry`])
//! - Resource maps ([`ResourceMap`])
//! - CRC32 forging and whole-file compression
//! - A cache file reader and a human-readable dump

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod bytes;
mod cache_file;
pub mod compression;
pub mod crc;
mod dump;
mod engine;
mod error;
mod header;
mod resource_map;
mod tag_data;

#[cfg(test)]
mod compression_tests;
#[cfg(test)]
mod header_tests;
#[cfg(test)]
mod resource_map_tests;

pub use bytes::{align_up, read_u16_le, read_u32_le, write_u16_le, write_u32_le};
pub use cache_file::{CacheFile, CachedTag, Section};
pub use dump::dump;
pub use engine::{ChecksumRule, Engine, EngineInfo};
pub use error::FormatError;
pub use header::{
    DEMO_FOOT_LITERAL, DEMO_HEAD_LITERAL, FOOT_LITERAL, HEAD_LITERAL, HEADER_SIZE, Header,
    HeaderLayout, MapType,
};
pub use resource_map::{ResourceEntry, ResourceMap, ResourceMapType, write_resource_map};
pub use tag_data::{
    MAX_TAGS, TAG_ARRAY_ENTRY_SIZE, TAG_DATA_HEADER_SIZE, TAGS_LITERAL, TagArrayEntry,
    TagDataHeader, tag_id, tag_index_from_id,
};
