//! Raw asset partitioning.
//!
//! Decides, per asset block, whether its bytes go into the map, into an
//! external resource map, or nowhere. Raw data entries are only ever
//! replaced by `None`; their bytes are never edited.

use std::fs::File;
use std::ops::Deref;
use std::path::PathBuf;

use mapforge_core::NULL_TAG_ID;
use mapforge_format::{Engine, ResourceMap, ResourceMapType, write_u32_le};
use memmap2::Mmap;
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parameters::{BuildParameters, RawDataHandling};
use crate::{Error, Result};

use super::BuildWorkload;
use super::structs::AssetLocation;

/// Bytes of a resource map file.
enum ResourceBytes {
    Mapped(Mmap),
    /// Empty files cannot be mapped.
    Owned(Vec<u8>),
}

impl Deref for ResourceBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ResourceBytes::Mapped(map) => &map[..],
            ResourceBytes::Owned(bytes) => &bytes[..],
        }
    }
}

struct LoadedMap {
    kind: ResourceMapType,
    file: PathBuf,
    bytes: ResourceBytes,
}

impl BuildWorkload<'_> {
    pub(crate) fn partition_raw_data(
        &mut self,
        parameters: &BuildParameters,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let engine = parameters.engine;
        let always_index = match parameters.raw_data_handling {
            RawDataHandling::RetainAll => return Ok(()),
            RawDataHandling::RemoveAll => {
                self.remove_all_raw_data();
                return Ok(());
            }
            RawDataHandling::Default => false,
            RawDataHandling::AlwaysIndex if engine == Engine::CustomEdition => true,
            RawDataHandling::AlwaysIndex => {
                diagnostics
                    .report(DiagnosticKind::AlwaysIndexUnsupported)
                    .message(format!("{engine} maps"))
                    .emit();
                false
            }
        };

        let candidates: Vec<(usize, ResourceMapType)> = self
            .tags
            .iter()
            .enumerate()
            .filter_map(|(index, tag)| {
                let kind = engine.resource_map_for(tag.class)?;
                if kind != ResourceMapType::Loc && tag.asset_data.is_empty() {
                    return None;
                }
                Some((index, kind))
            })
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let mut loaded: Vec<LoadedMap> = Vec::new();
        for &(_, kind) in &candidates {
            if !loaded.iter().any(|m| m.kind == kind) {
                loaded.push(load_resource_map(parameters, kind, diagnostics)?);
            }
        }

        let mut maps = Vec::with_capacity(loaded.len());
        for map in &loaded {
            match ResourceMap::parse(&map.bytes) {
                Ok(parsed) if parsed.kind() != map.kind => {
                    return Err(diagnostics
                        .report(DiagnosticKind::ResourceMapInvalid)
                        .message(format!(
                            "{} holds {}, expected {}",
                            map.file.display(),
                            parsed.kind(),
                            map.kind
                        ))
                        .fail());
                }
                Ok(parsed) => maps.push((map.kind, parsed)),
                Err(e) => {
                    return Err(diagnostics
                        .report(DiagnosticKind::ResourceMapInvalid)
                        .message(format!("{}: {e}", map.file.display()))
                        .fail());
                }
            }
        }

        for (tag, kind) in candidates {
            let Some(map) = maps.iter().find(|(k, _)| *k == kind).map(|(_, m)| m) else {
                continue;
            };
            let Some(resource) = map.find(self.tags[tag].path.as_str()) else {
                continue;
            };
            let Some(entry) = map.get(resource) else {
                continue;
            };

            if !always_index {
                let ours = match kind {
                    ResourceMapType::Loc => self.flatten_tag_data(tag),
                    ResourceMapType::Bitmaps | ResourceMapType::Sounds => self.tag_asset_bytes(tag),
                };
                if entry.data != ours.as_slice() {
                    diagnostics
                        .report(DiagnosticKind::ModifiedStockTag)
                        .message(format!("differs from {kind}"))
                        .tag(self.tag_name(tag))
                        .emit();
                    continue;
                }
            }

            if engine == Engine::CustomEdition {
                let t = &mut self.tags[tag];
                t.stubbed = true;
                t.resource_index = Some(resource as u32);
                for &raw in &t.asset_data {
                    self.raw_data[raw] = None;
                    self.asset_locations[raw] = AssetLocation::Removed;
                }
                self.report.stubbed_tags += 1;
            } else {
                let mut position = 0u32;
                for &raw in &self.tags[tag].asset_data {
                    self.raw_data[raw] = None;
                    self.asset_locations[raw] = AssetLocation::External(entry.data_offset + position);
                    position += self.raw_sizes[raw] as u32;
                }
            }

            self.report.indexed_tags += 1;
            self.report.indexed_bytes += entry.data.len();
        }

        debug!(
            indexed = self.report.indexed_tags,
            stubbed = self.report.stubbed_tags,
            bytes = self.report.indexed_bytes,
            "partitioned raw data"
        );
        Ok(())
    }

    fn remove_all_raw_data(&mut self) {
        for tag in &mut self.tags {
            if tag.asset_data.is_empty() {
                continue;
            }
            for &raw in &tag.asset_data {
                self.raw_data[raw] = None;
                self.asset_locations[raw] = AssetLocation::Removed;
            }
            tag.external_asset_data = true;
        }
    }

    /// A tag's asset blocks, concatenated in field order.
    fn tag_asset_bytes(&self, tag: usize) -> Vec<u8> {
        let mut bytes = Vec::new();
        for &raw in &self.tags[tag].asset_data {
            if let Some(data) = &self.raw_data[raw] {
                bytes.extend_from_slice(data);
            }
        }
        bytes
    }

    /// A tag's struct tree as one buffer, as stored in a resource map.
    ///
    /// Structs are 4-byte aligned in walk order and pointers hold offsets
    /// from the start of the buffer. References keep their class and get a
    /// null tag id.
    pub fn flatten_tag_data(&self, tag: usize) -> Vec<u8> {
        let Some(base) = self.tags[tag].base_struct else {
            return Vec::new();
        };

        let mut visited = vec![false; self.structs.len()];
        let mut order = Vec::new();
        self.walk_structs(base, &mut visited, &mut order);

        let mut offsets = vec![0usize; self.structs.len()];
        let mut cursor = 0;
        for &index in &order {
            cursor = mapforge_format::align_up(cursor, 4);
            offsets[index] = cursor;
            cursor += self.structs[index].data.len();
        }

        let mut out = vec![0u8; mapforge_format::align_up(cursor, 4)];
        for &index in &order {
            let s = &self.structs[index];
            let start = offsets[index];
            out[start..start + s.data.len()].copy_from_slice(&s.data);

            for p in &s.pointers {
                write_u32_le(&mut out, start + p.offset, offsets[p.struct_index] as u32);
            }
            for d in &s.dependencies {
                if d.tag_id_only {
                    write_u32_le(&mut out, start + d.offset, NULL_TAG_ID);
                } else {
                    write_u32_le(&mut out, start + d.offset + 12, NULL_TAG_ID);
                }
            }
        }
        out
    }
}

fn load_resource_map(
    parameters: &BuildParameters,
    kind: ResourceMapType,
    diagnostics: &mut Diagnostics,
) -> Result<LoadedMap> {
    let names = parameters.engine.resource_map_file_names(kind);
    let Some(path) = names
        .iter()
        .map(|name| parameters.maps_directory.join(name))
        .find(|path| path.is_file())
    else {
        return Err(diagnostics
            .report(DiagnosticKind::ResourceMapMissing)
            .message(format!(
                "{} in {}",
                names.join(" or "),
                parameters.maps_directory.display()
            ))
            .fail());
    };

    let io_error = |source| Error::Io {
        path: path.clone(),
        source,
    };
    let file = File::open(&path).map_err(io_error)?;
    let len = file.metadata().map_err(io_error)?.len();
    let bytes = if len == 0 {
        ResourceBytes::Owned(Vec::new())
    } else {
        // SAFETY: the map is only read during this build and nothing in the
        // process writes to resource maps.
        ResourceBytes::Mapped(unsafe { Mmap::map(&file) }.map_err(io_error)?)
    };
    debug!(map = %path.display(), bytes = bytes.len(), "loaded resource map");

    Ok(LoadedMap {
        kind,
        file: path,
        bytes,
    })
}
