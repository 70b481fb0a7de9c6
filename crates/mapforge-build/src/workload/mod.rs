//! The build workload.
//!
//! A [`BuildWorkload`] is filled by the loader and the struct compiler, then
//! walked by the later stages in a fixed order:
//! - `loader`: tag slots, memoization, tag file lookup
//! - `compile`: field trees to structs, pointers and dependencies
//! - `class_hooks`: per-class fixups after a tag is compiled
//! - `bsp`: assigns structs to BSP sections
//! - `dedupe`: merges identical structs (`optimize_space`)
//! - `partition`: decides where asset data lives
//! - `assemble`: lays out and writes the cache file

mod assemble;
mod bsp;
mod class_hooks;
mod compile;
mod dedupe;
mod loader;
mod partition;
mod structs;

#[cfg(test)]
mod partition_tests;

use std::path::PathBuf;

use indexmap::IndexMap;
use mapforge_core::{TagClass, TagPath};
use tracing::{debug, info};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parameters::BuildParameters;
use crate::tag::{JsonTagParser, TagParser};
use crate::Result;

pub use structs::{
    AssetLocation, AssetRef, BspSlot, Dependency, ModelDataKind, ModelDataRef, StructPointer,
    WorkloadStruct, WorkloadTag,
};

/// Longest scenario name the cache file header can hold.
const MAX_SCENARIO_NAME_LEN: usize = 31;

/// Statistics of a finished build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub scenario_name: String,
    pub tag_count: usize,
    /// Structs written to the file.
    pub struct_count: usize,
    pub dedupe_merged: usize,
    pub dedupe_bytes_saved: usize,
    pub indexed_tags: usize,
    pub stubbed_tags: usize,
    pub indexed_bytes: usize,
    /// Asset bytes stored inside the map.
    pub raw_data_bytes: usize,
    pub tag_data_size: usize,
    pub bsp_count: usize,
    pub largest_bsp_size: usize,
    pub file_size: usize,
    /// Size after compression, if the map was compressed.
    pub compressed_size: Option<usize>,
    pub crc32: u32,
}

/// A finished cache file.
#[derive(Clone, Debug)]
pub struct BuiltMap {
    pub data: Vec<u8>,
    pub report: BuildReport,
}

/// Single-use builder state for one build.
pub struct BuildWorkload<'a> {
    parser: &'a dyn TagParser,
    tags_directories: Vec<PathBuf>,
    /// Compile referenced tags, not only the root.
    recursion: bool,

    pub(crate) tags: Vec<WorkloadTag>,
    /// Requested `(path, class)` to tag index; abstract classes are aliases.
    lookup: IndexMap<(TagPath, TagClass), usize>,
    /// Whether the tag body was compiled (or is being compiled).
    compiled: Vec<bool>,

    pub(crate) structs: Vec<WorkloadStruct>,
    pub(crate) raw_data: Vec<Option<Vec<u8>>>,
    pub(crate) raw_sizes: Vec<usize>,
    pub(crate) asset_locations: Vec<AssetLocation>,
    pub(crate) assets: Vec<AssetRef>,
    pub(crate) model_refs: Vec<ModelDataRef>,
    pub(crate) model_vertices: Vec<u8>,
    pub(crate) model_indices: Vec<u8>,

    pub(crate) scenario_index: Option<usize>,
    pub(crate) map_type: u16,
    pub(crate) bsp_slots: Vec<BspSlot>,
    /// BSP index to tag index.
    pub(crate) bsp_tags: Vec<usize>,

    pub(crate) report: BuildReport,
}

impl<'a> BuildWorkload<'a> {
    pub(crate) fn new(
        parser: &'a dyn TagParser,
        tags_directories: Vec<PathBuf>,
        recursion: bool,
    ) -> Self {
        Self {
            parser,
            tags_directories,
            recursion,
            tags: Vec::new(),
            lookup: IndexMap::new(),
            compiled: Vec::new(),
            structs: Vec::new(),
            raw_data: Vec::new(),
            raw_sizes: Vec::new(),
            asset_locations: Vec::new(),
            assets: Vec::new(),
            model_refs: Vec::new(),
            model_vertices: Vec::new(),
            model_indices: Vec::new(),
            scenario_index: None,
            map_type: 0,
            bsp_slots: Vec::new(),
            bsp_tags: Vec::new(),
            report: BuildReport::default(),
        }
    }

    /// Compile one tag without assembling a map.
    ///
    /// With `recursion` off, referenced tags only get a slot and an
    /// existence check.
    pub fn compile_single_tag(
        parser: &'a dyn TagParser,
        path: &str,
        class: TagClass,
        tags_directories: Vec<PathBuf>,
        recursion: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let mut workload = Self::new(parser, tags_directories, recursion);
        let path = workload.normalize_path(path, None, diagnostics)?;
        let index = workload.load_tag(&path, class, None, diagnostics)?;
        if class == TagClass::Scenario {
            workload.scenario_index = Some(index);
        }
        workload.compile_tag(index, diagnostics)?;
        workload.verify_struct_table(diagnostics)?;
        Ok(workload)
    }

    /// Compile one tag from bytes already in memory.
    ///
    /// `path` names the tag and is never read; references are still
    /// resolved against `tags_directories`.
    pub fn compile_single_tag_bytes(
        parser: &'a dyn TagParser,
        bytes: &[u8],
        path: &str,
        class: TagClass,
        tags_directories: Vec<PathBuf>,
        recursion: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let mut workload = Self::new(parser, tags_directories, recursion);
        let path = workload.normalize_path(path, None, diagnostics)?;
        let index = workload.push_slot(path, class, None);
        if class == TagClass::Scenario {
            workload.scenario_index = Some(index);
        }
        workload.compile_tag_bytes(index, bytes, diagnostics)?;
        workload.verify_struct_table(diagnostics)?;
        Ok(workload)
    }

    pub fn tags(&self) -> &[WorkloadTag] {
        &self.tags
    }

    pub fn structs(&self) -> &[WorkloadStruct] {
        &self.structs
    }

    pub fn raw_data(&self) -> &[Option<Vec<u8>>] {
        &self.raw_data
    }

    pub fn asset_locations(&self) -> &[AssetLocation] {
        &self.asset_locations
    }

    pub fn bsp_slots(&self) -> &[BspSlot] {
        &self.bsp_slots
    }

    /// Tag index for a requested `(path, class)`, if it has a slot.
    pub fn tag_index(&self, path: &TagPath, class: TagClass) -> Option<usize> {
        self.lookup.get(&(path.clone(), class)).copied()
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }
}

/// Build a cache file from `scenario` using JSON tag files.
pub fn compile_map(
    scenario: &str,
    parameters: &BuildParameters,
    diagnostics: &mut Diagnostics,
) -> Result<BuiltMap> {
    compile_map_with_parser(&JsonTagParser, scenario, parameters, diagnostics)
}

/// Build a cache file from `scenario` with an explicit tag parser.
///
/// Nothing is returned on failure; the reason is in `diagnostics`.
pub fn compile_map_with_parser(
    parser: &dyn TagParser,
    scenario: &str,
    parameters: &BuildParameters,
    diagnostics: &mut Diagnostics,
) -> Result<BuiltMap> {
    diagnostics.set_hide_pedantic(parameters.hide_pedantic_warnings);
    let engine = parameters.engine;

    if parameters.tags_directories.is_empty() {
        return Err(diagnostics
            .report(DiagnosticKind::InvalidParameter)
            .message("no tags directory given")
            .fail());
    }
    if parameters.compress && !engine.info().supports_compression {
        return Err(diagnostics
            .report(DiagnosticKind::InvalidParameter)
            .message(format!("{engine} maps cannot be compressed"))
            .fail());
    }

    let mut workload =
        BuildWorkload::new(parser, parameters.tags_directories.clone(), true);

    let scenario = scenario.strip_suffix(".scenario").unwrap_or(scenario);
    let mut scenario_path = workload.normalize_path(scenario, None, diagnostics)?;
    let name = match &parameters.rename_scenario {
        Some(rename) => workload
            .normalize_path(rename, None, diagnostics)?
            .base_name()
            .to_owned(),
        None => scenario_path.base_name().to_owned(),
    };
    if name.len() > MAX_SCENARIO_NAME_LEN {
        return Err(diagnostics
            .report(DiagnosticKind::InvalidParameter)
            .message(format!(
                "scenario name `{name}` is longer than {MAX_SCENARIO_NAME_LEN} characters"
            ))
            .fail());
    }

    if let Some(index) = &parameters.index {
        for entry in index {
            workload.reserve_tag(&entry.path, entry.class);
        }
        debug!(count = index.len(), "reserved tags from index");
    }

    let scenario_index =
        workload.load_tag(&scenario_path, TagClass::Scenario, None, diagnostics)?;
    workload.scenario_index = Some(scenario_index);
    workload.compile_tag(scenario_index, diagnostics)?;
    workload.compile_reserved(diagnostics)?;
    debug!(
        tags = workload.tags.len(),
        structs = workload.structs.len(),
        "loaded tags"
    );

    workload.verify_struct_table(diagnostics)?;
    workload.partition_bsps(diagnostics)?;

    if parameters.optimize_space {
        workload.deduplicate();
        debug!(
            merged = workload.report.dedupe_merged,
            saved = workload.report.dedupe_bytes_saved,
            "deduplicated structs"
        );
    }

    workload.partition_raw_data(parameters, diagnostics)?;

    if parameters.rename_scenario.is_some() {
        scenario_path = scenario_path.with_base_name(&name);
        workload.tags[scenario_index].path = scenario_path;
    }
    workload.report.scenario_name = name;

    let data = workload.assemble(parameters, diagnostics)?;
    let report = workload.report;

    if parameters.verbose {
        info!(
            scenario = %report.scenario_name,
            engine = %engine,
            tags = report.tag_count,
            structs = report.struct_count,
            bsps = report.bsp_count,
            tag_data = report.tag_data_size,
            raw_data = report.raw_data_bytes,
            indexed = report.indexed_tags,
            file_size = report.file_size,
            crc32 = %format!("{:08X}", report.crc32),
            "built map"
        );
    }

    Ok(BuiltMap { data, report })
}
