//! Cache file assembly.
//!
//! ```text
//! file:     header | inline asset data | BSP sections | model data | tag data
//! tag data: tag data header | tag array | tag paths | global structs
//! BSP:      BSP header | BSP structs
//! ```
//!
//! Structs are placed depth-first from each live tag's base struct in tag
//! order. Structs nothing reaches (merged away, or owned by stubbed tags) are
//! not written.

use mapforge_core::{Interner, NULL_TAG_ID, TagClass};
use mapforge_format::compression::{DEFAULT_LEVEL, compress_verified};
use mapforge_format::crc::{crc32, forge};
use mapforge_format::{
    ChecksumRule, Engine, HEADER_SIZE, Header, MAX_TAGS, TAG_ARRAY_ENTRY_SIZE,
    TAG_DATA_HEADER_SIZE, TAGS_LITERAL, TagArrayEntry, TagDataHeader, align_up, tag_id,
    write_u32_le,
};
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parameters::BuildParameters;
use crate::stock::stock_crc;
use crate::Result;

use super::BuildWorkload;
use super::structs::{AssetLocation, ModelDataKind};

/// Base pointer, 16 reserved bytes, `sbsp`.
const BSP_HEADER_SIZE: usize = 24;

/// Alignment of sections inside the file.
const SECTION_ALIGNMENT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Placement {
    /// `None` is the tag data section.
    section: Option<usize>,
    offset: usize,
}

struct BspSection {
    base: usize,
    size: usize,
    address: u64,
}

impl BuildWorkload<'_> {
    pub(crate) fn assemble(
        &mut self,
        parameters: &BuildParameters,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<u8>> {
        let engine = parameters.engine;
        let info = engine.info();
        let align = info.struct_alignment;
        let tag_data_address = u64::from(parameters.effective_tag_data_address());
        let tag_count = self.tags.len();

        if tag_count > MAX_TAGS {
            return Err(diagnostics
                .report(DiagnosticKind::TooManyTags)
                .message(format!("{tag_count} tags, at most {MAX_TAGS} allowed"))
                .fail());
        }
        for (index, tag) in self.tags.iter().enumerate() {
            if tag.base_struct.is_none() && !tag.stubbed {
                return Err(diagnostics
                    .report(DiagnosticKind::UncompiledTag)
                    .tag(self.tag_name(index))
                    .fail());
            }
        }

        // Tag paths
        let mut interner = Interner::new();
        let symbols: Vec<_> = self
            .tags
            .iter()
            .map(|t| interner.intern(t.path.as_str()))
            .collect();
        let (path_blob, path_offsets) = interner.to_blob(SECTION_ALIGNMENT);
        for (tag, symbol) in self.tags.iter_mut().zip(&symbols) {
            tag.path_offset = Some(path_offsets[symbol.as_u32() as usize]);
        }
        let paths_start = TAG_DATA_HEADER_SIZE + TAG_ARRAY_ENTRY_SIZE * tag_count;

        // Global section
        let mut placements: Vec<Option<Placement>> = vec![None; self.structs.len()];
        let mut visited = vec![false; self.structs.len()];
        let mut order = Vec::new();
        for (index, tag) in self.tags.iter().enumerate() {
            if tag.stubbed || self.bsp_of_tag(index).is_some() {
                continue;
            }
            if let Some(base) = tag.base_struct {
                self.walk_structs(base, &mut visited, &mut order);
            }
        }

        let mut cursor = paths_start + path_blob.len();
        for &index in &order {
            self.check_section(index, None, diagnostics)?;
            cursor = align_up(cursor, align);
            placements[index] = Some(Placement {
                section: None,
                offset: cursor,
            });
            cursor += self.structs[index].data.len();
        }
        let tag_data_size = align_up(cursor, SECTION_ALIGNMENT);

        // BSP sections
        let mut bsps = Vec::with_capacity(self.bsp_tags.len());
        for (bsp, &tag) in self.bsp_tags.iter().enumerate() {
            let Some(base) = self.tags[tag].base_struct else {
                continue;
            };
            let mut order = Vec::new();
            self.walk_structs(base, &mut visited, &mut order);

            let mut cursor = BSP_HEADER_SIZE;
            for &index in &order {
                self.check_section(index, Some(bsp), diagnostics)?;
                cursor = align_up(cursor, align);
                placements[index] = Some(Placement {
                    section: Some(bsp),
                    offset: cursor,
                });
                cursor += self.structs[index].data.len();
            }
            let size = align_up(cursor, SECTION_ALIGNMENT);

            let Some(address) = (tag_data_address + info.max_tag_space).checked_sub(size as u64)
            else {
                return Err(diagnostics
                    .report(DiagnosticKind::TagSpaceExceeded)
                    .message(format!("BSP is {size} bytes"))
                    .tag(self.tag_name(tag))
                    .fail());
            };
            if address + size as u64 > u64::from(u32::MAX) + 1 {
                return Err(diagnostics
                    .report(DiagnosticKind::AddressOverflow)
                    .message(format!("BSP at {address:#x} ends past the 32-bit address space"))
                    .tag(self.tag_name(tag))
                    .fail());
            }
            bsps.push(BspSection {
                base,
                size,
                address,
            });
        }

        let largest_bsp = bsps.iter().map(|b| b.size).max().unwrap_or(0);
        let used = (tag_data_size + largest_bsp) as u64;
        if used > info.max_tag_space {
            return Err(diagnostics
                .report(DiagnosticKind::TagSpaceExceeded)
                .message(format!(
                    "{tag_data_size} bytes of tag data and {largest_bsp} bytes of BSP exceed {}",
                    info.max_tag_space
                ))
                .fail());
        }
        if tag_data_address + tag_data_size as u64 > u64::from(u32::MAX) + 1 {
            return Err(diagnostics
                .report(DiagnosticKind::AddressOverflow)
                .message(format!(
                    "tag data at {tag_data_address:#x} ends past the 32-bit address space"
                ))
                .fail());
        }
        debug!(
            structs = placements.iter().flatten().count(),
            tag_data_size, largest_bsp, "laid out structs"
        );

        let section_address = |section: Option<usize>| match section {
            None => tag_data_address,
            Some(bsp) => bsps[bsp].address,
        };

        // Struct bytes, pointers and dependencies
        let mut tag_data = vec![0u8; tag_data_size];
        let mut bsp_data: Vec<Vec<u8>> = bsps.iter().map(|b| vec![0u8; b.size]).collect();

        for (index, placement) in placements.iter().enumerate() {
            let Some(placement) = *placement else {
                continue;
            };
            let s = &self.structs[index];
            let buffer = match placement.section {
                None => &mut tag_data,
                Some(bsp) => &mut bsp_data[bsp],
            };
            let start = placement.offset;
            buffer[start..start + s.data.len()].copy_from_slice(&s.data);

            for pointer in &s.pointers {
                let Some(target) = placements[pointer.struct_index] else {
                    return Err(diagnostics
                        .report(DiagnosticKind::DanglingPointer)
                        .message(format!(
                            "struct #{index} points to unplaced struct #{}",
                            pointer.struct_index
                        ))
                        .tag(self.tag_name(s.owner))
                        .fail());
                };
                if target.section != placement.section {
                    return Err(diagnostics
                        .report(DiagnosticKind::CrossSectionPointer)
                        .message(format!("struct #{index} points to struct #{}", pointer.struct_index))
                        .tag(self.tag_name(s.owner))
                        .fail());
                }
                let address = section_address(target.section) + target.offset as u64;
                let Ok(address) = u32::try_from(address) else {
                    return Err(diagnostics
                        .report(DiagnosticKind::AddressOverflow)
                        .message(format!("pointer to {address:#x}"))
                        .tag(self.tag_name(s.owner))
                        .fail());
                };
                write_u32_le(buffer, start + pointer.offset, address);
            }

            for dependency in &s.dependencies {
                let target = &self.tags[dependency.tag_index];
                let id = tag_id(dependency.tag_index).unwrap_or(NULL_TAG_ID);
                let at = start + dependency.offset;
                if dependency.tag_id_only {
                    write_u32_le(buffer, at, id);
                    continue;
                }
                let path_address =
                    tag_data_address + (paths_start as u64) + u64::from(target.path_offset.unwrap_or(0));
                write_u32_le(buffer, at, target.class.fourcc());
                write_u32_le(buffer, at + 4, path_address as u32);
                write_u32_le(buffer, at + 8, target.path.as_str().len() as u32);
                write_u32_le(buffer, at + 12, id);
            }
        }

        // Inline asset data
        let mut raw_blob = Vec::new();
        for asset in &self.assets {
            let Some(placement) = placements[asset.struct_index] else {
                continue;
            };
            let size = self.raw_sizes[asset.raw_index];
            let (flags, offset) = match self.asset_locations[asset.raw_index] {
                AssetLocation::Inline => {
                    let offset = HEADER_SIZE + raw_blob.len();
                    if let Some(data) = &self.raw_data[asset.raw_index] {
                        raw_blob.extend_from_slice(data);
                    }
                    (0, offset as u32)
                }
                AssetLocation::External(offset) => (1, offset),
                AssetLocation::Removed => (1, 0),
            };
            let buffer = match placement.section {
                None => &mut tag_data,
                Some(bsp) => &mut bsp_data[bsp],
            };
            let at = placement.offset + asset.offset;
            write_u32_le(buffer, at, size as u32);
            write_u32_le(buffer, at + 4, flags);
            write_u32_le(buffer, at + 8, offset);
        }

        // File offsets
        let mut file_cursor = align_up(HEADER_SIZE + raw_blob.len(), SECTION_ALIGNMENT);
        let mut bsp_file_offsets = Vec::with_capacity(bsps.len());
        for bsp in &bsps {
            bsp_file_offsets.push(file_cursor);
            file_cursor = align_up(file_cursor + bsp.size, SECTION_ALIGNMENT);
        }
        let model_data_offset = file_cursor;
        let model_data_size = self.model_vertices.len() + self.model_indices.len();
        let tag_data_offset = align_up(model_data_offset + model_data_size, SECTION_ALIGNMENT);

        // BSP headers and the scenario's BSP table
        for (bsp, section) in bsps.iter().enumerate() {
            let base_offset = placements[section.base].map_or(0, |p| p.offset);
            let buffer = &mut bsp_data[bsp];
            write_u32_le(buffer, 0, (section.address + base_offset as u64) as u32);
            write_u32_le(buffer, 20, TagClass::ScenarioStructureBsp.fourcc());
        }
        for slot in &self.bsp_slots {
            let Some(placement) = placements[slot.struct_index] else {
                continue;
            };
            let Some(bsp) = slot.bsp_tag.and_then(|tag| self.bsp_of_tag(tag)) else {
                continue;
            };
            let buffer = match placement.section {
                None => &mut tag_data,
                Some(section) => &mut bsp_data[section],
            };
            let start = placement.offset;
            write_u32_le(buffer, start + slot.file_offset_at, bsp_file_offsets[bsp] as u32);
            write_u32_le(buffer, start + slot.size_at, bsps[bsp].size as u32);
            write_u32_le(buffer, start + slot.address_at, bsps[bsp].address as u32);
        }

        // Tag array
        for (index, tag) in self.tags.iter().enumerate() {
            let [primary_class, secondary_class, tertiary_class] = tag.class.class_chain();
            let data = if tag.stubbed {
                tag.resource_index.unwrap_or(0)
            } else if self.bsp_of_tag(index).is_some() {
                0
            } else {
                tag.base_struct
                    .and_then(|base| placements[base])
                    .map_or(0, |p| (tag_data_address + p.offset as u64) as u32)
            };
            let path_address =
                tag_data_address + (paths_start as u64) + u64::from(tag.path_offset.unwrap_or(0));
            let entry = TagArrayEntry {
                primary_class,
                secondary_class,
                tertiary_class,
                tag_id: tag_id(index).unwrap_or(NULL_TAG_ID),
                path_address: path_address as u32,
                data,
                indexed: u32::from(tag.stubbed),
            };
            let at = TAG_DATA_HEADER_SIZE + TAG_ARRAY_ENTRY_SIZE * index;
            tag_data[at..at + TAG_ARRAY_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
        }
        tag_data[paths_start..paths_start + path_blob.len()].copy_from_slice(&path_blob);

        // Tag data header
        let model_part_count = self
            .model_refs
            .iter()
            .filter(|m| m.kind == ModelDataKind::Vertices && placements[m.struct_index].is_some())
            .count() as u32;
        let header = TagDataHeader {
            tag_array_address: (tag_data_address + TAG_DATA_HEADER_SIZE as u64) as u32,
            scenario_tag_id: self
                .scenario_index
                .and_then(tag_id)
                .unwrap_or(NULL_TAG_ID),
            tag_file_checksums: self.tag_file_checksums(info.checksum_rule),
            tag_count: tag_count as u32,
            model_part_count,
            model_data_file_offset: model_data_offset as u32,
            model_part_count_again: model_part_count,
            vertex_size: self.model_vertices.len() as u32,
            model_data_size: model_data_size as u32,
            literal: TAGS_LITERAL,
        };
        tag_data[..TAG_DATA_HEADER_SIZE].copy_from_slice(&header.to_bytes());

        // File
        let file_size = tag_data_offset + tag_data_size;
        if file_size as u64 > info.max_file_size {
            return Err(diagnostics
                .report(DiagnosticKind::FileTooLarge)
                .message(format!(
                    "{file_size} bytes, at most {} allowed",
                    info.max_file_size
                ))
                .fail());
        }
        let mut file = Vec::with_capacity(file_size);
        file.resize(HEADER_SIZE, 0);
        file.extend_from_slice(&raw_blob);
        for (bsp, data) in bsp_data.iter().enumerate() {
            file.resize(bsp_file_offsets[bsp], 0);
            file.extend_from_slice(data);
        }
        file.resize(model_data_offset, 0);
        file.extend_from_slice(&self.model_vertices);
        file.extend_from_slice(&self.model_indices);
        file.resize(tag_data_offset, 0);
        file.extend_from_slice(&tag_data);

        let name = self.report.scenario_name.clone();
        let layout = info.header_layout;
        let mut header = Header {
            engine_version: info.version,
            decompressed_size: file_size as u32,
            compressed_padding: 0,
            tag_data_offset: tag_data_offset as u32,
            tag_data_size: tag_data_size as u32,
            name: name.clone(),
            build: info.build_string.to_owned(),
            map_type: self.map_type,
            crc32: crc32(&file[HEADER_SIZE..]),
        };

        let forged = parameters.forge_crc.or_else(|| {
            if engine == Engine::CustomEdition {
                stock_crc(&name)
            } else {
                None
            }
        });
        if let Some(target) = forged {
            header.crc32 = target;
        }
        match header.to_bytes(layout) {
            Ok(bytes) => file[..HEADER_SIZE].copy_from_slice(&bytes),
            Err(e) => {
                return Err(diagnostics
                    .report(DiagnosticKind::InvalidParameter)
                    .message(e.to_string())
                    .fail());
            }
        }
        if let Some(target) = forged {
            if let Err(e) = forge(&mut file, layout.forge_offset(), target) {
                return Err(diagnostics
                    .report(DiagnosticKind::ForgeFailed)
                    .message(e.to_string())
                    .fail());
            }
            debug!(crc32 = %format!("{target:08X}"), "forged CRC32");
        }

        self.report.tag_count = tag_count;
        self.report.struct_count = placements.iter().flatten().count();
        self.report.raw_data_bytes = raw_blob.len();
        self.report.tag_data_size = tag_data_size;
        self.report.bsp_count = bsps.len();
        self.report.largest_bsp_size = largest_bsp;
        self.report.file_size = file_size;
        self.report.crc32 = header.crc32;

        if parameters.compress {
            file = match compress_verified(&file, DEFAULT_LEVEL) {
                Ok(compressed) => compressed,
                Err(e) => {
                    return Err(diagnostics
                        .report(DiagnosticKind::CompressionFailed)
                        .message(e.to_string())
                        .fail());
                }
            };
            self.report.compressed_size = Some(file.len());
            debug!(size = file.len(), "compressed map");
        }

        Ok(file)
    }

    /// Error if `index` belongs to a different section than the one being laid out.
    fn check_section(
        &self,
        index: usize,
        section: Option<usize>,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let actual = self.structs[index].bsp;
        if actual == section {
            return Ok(());
        }
        Err(diagnostics
            .report(DiagnosticKind::CrossSectionPointer)
            .message(format!("struct #{index} is reachable from another section"))
            .tag(self.tag_name(self.structs[index].owner))
            .fail())
    }

    fn tag_file_checksums(&self, rule: ChecksumRule) -> u32 {
        match rule {
            ChecksumRule::Xor => self.tags.iter().fold(0, |acc, t| acc ^ t.file_checksum),
            ChecksumRule::Crc32 => {
                let mut hasher = crc32fast::Hasher::new();
                for tag in &self.tags {
                    hasher.update(&tag.file_checksum.to_le_bytes());
                }
                hasher.finalize()
            }
        }
    }
}
