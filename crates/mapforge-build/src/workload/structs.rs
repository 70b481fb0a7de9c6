//! Tag and struct tables.
//!
//! Everything refers to everything else by index: tags by tag index, structs
//! by struct index. Indices stay stable for the whole build; merged or
//! dropped structs stay in the table and are simply never laid out.

use mapforge_core::{TagClass, TagPath};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::Result;

use super::BuildWorkload;

/// One compiled tag.
#[derive(Clone, Debug)]
pub struct WorkloadTag {
    pub path: TagPath,
    /// Class of the tag file that was found.
    pub class: TagClass,
    /// Class the tag was requested as, when that was an abstract class.
    pub alias: Option<TagClass>,
    pub base_struct: Option<usize>,
    /// Indices into the raw data table.
    pub asset_data: Vec<usize>,
    pub resource_index: Option<u32>,
    pub external_asset_data: bool,
    /// Body omitted; the tag lives in a resource map.
    pub stubbed: bool,
    /// Offset of the path in the path table, set during assembly.
    pub path_offset: Option<u32>,
    /// CRC32 of the tag file bytes.
    pub file_checksum: u32,
}

impl WorkloadTag {
    pub(crate) fn new(path: TagPath, class: TagClass) -> Self {
        Self {
            path,
            class,
            alias: None,
            base_struct: None,
            asset_data: Vec::new(),
            resource_index: None,
            external_asset_data: false,
            stubbed: false,
            path_offset: None,
            file_checksum: 0,
        }
    }

    /// `path.extension`, for diagnostics.
    pub fn display_name(&self) -> String {
        format!("{}.{}", self.path, self.class.extension())
    }
}

/// Reference from a struct offset to a tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub tag_index: usize,
    pub offset: usize,
    /// Only the tag id is written (4 bytes).
    pub tag_id_only: bool,
}

/// Reference from a struct offset to another struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StructPointer {
    pub struct_index: usize,
    pub offset: usize,
    pub limit_to_32_bits: bool,
}

#[derive(Clone, Debug, Default)]
pub struct WorkloadStruct {
    pub data: Vec<u8>,
    pub dependencies: Vec<Dependency>,
    pub pointers: Vec<StructPointer>,
    /// Offset within its section, set during layout.
    pub offset: Option<usize>,
    /// Never merged, even with a byte-identical struct.
    pub unsafe_to_dedupe: bool,
    /// BSP this struct belongs to; `None` is global.
    pub bsp: Option<usize>,
    /// Tag that produced this struct.
    pub owner: usize,
}

impl WorkloadStruct {
    /// Struct currently pointed to from `offset`.
    pub fn resolve_pointer(&self, offset: usize) -> Option<usize> {
        self.pointers
            .iter()
            .find(|p| p.offset == offset)
            .map(|p| p.struct_index)
    }

    /// Tag currently referenced from `offset`.
    pub fn resolve_dependency(&self, offset: usize) -> Option<usize> {
        self.dependencies
            .iter()
            .find(|d| d.offset == offset)
            .map(|d| d.tag_index)
    }
}

/// Asset header inside a struct, patched once the asset's location is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetRef {
    pub struct_index: usize,
    pub offset: usize,
    pub raw_index: usize,
}

/// Where a raw data block ends up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AssetLocation {
    #[default]
    Inline,
    /// Offset inside a resource map.
    External(u32),
    Removed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelDataKind {
    Vertices,
    Indices,
}

/// Vertex or index pool reference inside a struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelDataRef {
    pub struct_index: usize,
    pub offset: usize,
    pub kind: ModelDataKind,
    pub count: u32,
}

/// One entry of the scenario's BSP table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BspSlot {
    pub struct_index: usize,
    pub file_offset_at: usize,
    pub size_at: usize,
    pub address_at: usize,
    pub bsp_tag: Option<usize>,
}

impl BuildWorkload<'_> {
    /// Check that every edge points at a live entry inside its struct.
    pub fn verify_struct_table(&self, diagnostics: &mut Diagnostics) -> Result<()> {
        for (index, s) in self.structs.iter().enumerate() {
            let owner = self.tag_name(s.owner);

            for p in &s.pointers {
                if p.struct_index >= self.structs.len() {
                    return Err(diagnostics
                        .report(DiagnosticKind::DanglingPointer)
                        .message(format!("struct #{index} points to #{}", p.struct_index))
                        .tag(owner)
                        .fail());
                }
                if p.offset + 4 > s.data.len() {
                    return Err(diagnostics
                        .report(DiagnosticKind::OffsetOutOfBounds)
                        .message(format!(
                            "pointer at {:#x} in struct #{index} of {} bytes",
                            p.offset,
                            s.data.len()
                        ))
                        .tag(owner)
                        .fail());
                }
            }

            for d in &s.dependencies {
                if d.tag_index >= self.tags.len() {
                    return Err(diagnostics
                        .report(DiagnosticKind::DanglingDependency)
                        .message(format!("struct #{index} references tag #{}", d.tag_index))
                        .tag(owner)
                        .fail());
                }
                let width = if d.tag_id_only { 4 } else { 16 };
                if d.offset + width > s.data.len() {
                    return Err(diagnostics
                        .report(DiagnosticKind::OffsetOutOfBounds)
                        .message(format!(
                            "dependency at {:#x} in struct #{index} of {} bytes",
                            d.offset,
                            s.data.len()
                        ))
                        .tag(owner)
                        .fail());
                }
            }
        }
        Ok(())
    }

    /// Depth-first preorder from `root`, following pointers in offset order.
    ///
    /// Structs already marked in `visited` are skipped, so walking several
    /// roots with one `visited` yields each struct once.
    pub(crate) fn walk_structs(&self, root: usize, visited: &mut [bool], order: &mut Vec<usize>) {
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            if visited[index] {
                continue;
            }
            visited[index] = true;
            order.push(index);

            let mut pointers = self.structs[index].pointers.clone();
            pointers.sort_by_key(|p| p.offset);
            stack.extend(pointers.iter().rev().map(|p| p.struct_index));
        }
    }

    pub(crate) fn tag_name(&self, tag: usize) -> String {
        self.tags
            .get(tag)
            .map(|t| t.display_name())
            .unwrap_or_else(|| format!("tag #{tag}"))
    }
}
