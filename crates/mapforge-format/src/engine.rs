//! Engine targets.
//!
//! Everything that differs between target engines lives in one static table
//! so the build pipeline asks capabilities instead of matching on engines.

use mapforge_core::TagClass;

use crate::header::HeaderLayout;
use crate::resource_map::ResourceMapType;

/// Cache file target engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Engine {
    Demo,
    Retail,
    CustomEdition,
    Native,
}

/// How per-tag file checksums are folded into the tag data header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksumRule {
    /// XOR of every tag's CRC32.
    Xor,
    /// CRC32 over the concatenated little-endian per-tag CRC32s.
    Crc32,
}

/// Static description of an engine target.
#[derive(Clone, Copy, Debug)]
pub struct EngineInfo {
    /// Name accepted on the command line.
    pub name: &'static str,
    pub version: u32,
    pub build_string: &'static str,
    pub header_layout: HeaderLayout,
    /// Default address the tag data section is loaded at.
    pub tag_data_address: u32,
    /// Bytes available for tag data plus the largest BSP.
    pub max_tag_space: u64,
    pub max_file_size: u64,
    pub struct_alignment: usize,
    pub checksum_rule: ChecksumRule,
    pub supports_compression: bool,
    pub compress_by_default: bool,
}

const LEGACY_TAG_SPACE: u64 = 0x170_0000;

const DEMO: EngineInfo = EngineInfo {
    name: "demo",
    version: 6,
    build_string: "01.00.00.0576",
    header_layout: HeaderLayout::Demo,
    tag_data_address: 0x4BF1_0000,
    max_tag_space: LEGACY_TAG_SPACE,
    max_file_size: 0x800_0000,
    struct_alignment: 4,
    checksum_rule: ChecksumRule::Xor,
    supports_compression: false,
    compress_by_default: false,
};

const RETAIL: EngineInfo = EngineInfo {
    name: "retail",
    version: 7,
    build_string: "01.00.00.0564",
    header_layout: HeaderLayout::Standard,
    tag_data_address: 0x4044_0000,
    max_tag_space: LEGACY_TAG_SPACE,
    max_file_size: 0x800_0000,
    struct_alignment: 4,
    checksum_rule: ChecksumRule::Xor,
    supports_compression: false,
    compress_by_default: false,
};

const CUSTOM_EDITION: EngineInfo = EngineInfo {
    name: "custom",
    version: 609,
    build_string: "01.00.00.0609",
    header_layout: HeaderLayout::Standard,
    tag_data_address: 0x4044_0000,
    max_tag_space: LEGACY_TAG_SPACE,
    max_file_size: 0x1800_0000,
    struct_alignment: 4,
    checksum_rule: ChecksumRule::Xor,
    supports_compression: false,
    compress_by_default: false,
};

const NATIVE: EngineInfo = EngineInfo {
    name: "native",
    version: 0x1A86,
    build_string: "mapforge",
    header_layout: HeaderLayout::Standard,
    tag_data_address: 0x4044_0000,
    max_tag_space: 0x1_0000_0000 - 0x4044_0000,
    max_file_size: u32::MAX as u64,
    struct_alignment: 4,
    checksum_rule: ChecksumRule::Crc32,
    supports_compression: true,
    compress_by_default: true,
};

impl Engine {
    pub const ALL: &'static [Engine] = &[
        Engine::CustomEdition,
        Engine::Demo,
        Engine::Native,
        Engine::Retail,
    ];

    pub fn info(self) -> &'static EngineInfo {
        match self {
            Engine::Demo => &DEMO,
            Engine::Retail => &RETAIL,
            Engine::CustomEdition => &CUSTOM_EDITION,
            Engine::Native => &NATIVE,
        }
    }

    /// Parse a command-line engine name.
    pub fn from_name(name: &str) -> Option<Engine> {
        Self::ALL.iter().copied().find(|e| e.info().name == name)
    }

    pub fn from_version(version: u32) -> Option<Engine> {
        Self::ALL.iter().copied().find(|e| e.info().version == version)
    }

    pub fn supports_resource_maps(self) -> bool {
        self != Engine::Native
    }

    /// Resource map serving tags of `class` on this engine, if any.
    pub fn resource_map_for(self, class: TagClass) -> Option<ResourceMapType> {
        if !self.supports_resource_maps() {
            return None;
        }
        match class {
            TagClass::Bitmap => Some(ResourceMapType::Bitmaps),
            TagClass::Sound => Some(ResourceMapType::Sounds),
            c if c.is_localization() && self == Engine::CustomEdition => {
                Some(ResourceMapType::Loc)
            }
            _ => None,
        }
    }

    /// Candidate resource map file names, most preferred first.
    pub fn resource_map_file_names(self, kind: ResourceMapType) -> &'static [&'static str] {
        match (self, kind) {
            (Engine::CustomEdition, ResourceMapType::Bitmaps) => {
                &["custom_bitmaps.map", "bitmaps.map"]
            }
            (Engine::CustomEdition, ResourceMapType::Sounds) => &["custom_sounds.map", "sounds.map"],
            (Engine::CustomEdition, ResourceMapType::Loc) => &["custom_loc.map", "loc.map"],
            (Engine::Retail | Engine::Demo, ResourceMapType::Bitmaps) => &["bitmaps.map"],
            (Engine::Retail | Engine::Demo, ResourceMapType::Sounds) => &["sounds.map"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.info().name)
    }
}
