//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! This module contains:
//! - `*Params` structs populated from clap
//! - `from_matches()` extractors
//! - `Into<*Args>` impls to bridge dispatch → command handlers

use std::path::PathBuf;

use clap::ArgMatches;
use mapforge_build::RawDataHandling;

use super::ColorChoice;
use crate::commands::build::BuildArgs;
use crate::commands::dump::DumpArgs;

pub struct BuildParams {
    pub scenario: String,
    pub engine: Option<String>,
    pub tags: Vec<PathBuf>,
    pub maps: PathBuf,
    pub output: Option<PathBuf>,
    pub index: Option<PathBuf>,
    pub forge_crc: Option<String>,
    pub compress: Option<bool>,
    pub optimize: bool,
    pub raw_data_handling: RawDataHandling,
    pub rename_scenario: Option<String>,
    pub fs_path: bool,
    pub hide_pedantic_warnings: bool,
    pub quiet: bool,
    pub color: ColorChoice,
}

impl BuildParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let tags: Vec<PathBuf> = m
            .get_many::<PathBuf>("tags")
            .map(|dirs| dirs.cloned().collect())
            .unwrap_or_default();

        Self {
            scenario: m.get_one::<String>("scenario").cloned().unwrap_or_default(),
            engine: m.get_one::<String>("engine").cloned(),
            tags: if tags.is_empty() {
                vec![PathBuf::from("tags")]
            } else {
                tags
            },
            maps: m
                .get_one::<PathBuf>("maps")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("maps")),
            output: m.get_one::<PathBuf>("output").cloned(),
            index: m.get_one::<PathBuf>("index").cloned(),
            forge_crc: m.get_one::<String>("forge_crc").cloned(),
            compress: parse_compress(m),
            optimize: m.get_flag("optimize"),
            raw_data_handling: parse_raw_data_handling(m),
            rename_scenario: m.get_one::<String>("rename_scenario").cloned(),
            fs_path: m.get_flag("fs_path"),
            hide_pedantic_warnings: m.get_flag("hide_pedantic_warnings"),
            quiet: m.get_flag("quiet"),
            color: parse_color(m),
        }
    }
}

impl From<BuildParams> for BuildArgs {
    fn from(p: BuildParams) -> Self {
        Self {
            scenario: p.scenario,
            engine: p.engine,
            tags: p.tags,
            maps: p.maps,
            output: p.output,
            index: p.index,
            forge_crc: p.forge_crc,
            compress: p.compress,
            optimize: p.optimize,
            raw_data_handling: p.raw_data_handling,
            rename_scenario: p.rename_scenario,
            fs_path: p.fs_path,
            hide_pedantic_warnings: p.hide_pedantic_warnings,
            quiet: p.quiet,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub map: PathBuf,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            map: m.get_one::<PathBuf>("map").cloned().unwrap_or_default(),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            map: p.map,
            color: p.color.should_colorize(),
        }
    }
}

/// Parse --color flag into ColorChoice.
fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// `-c` and `-u` override each other; neither means the engine default.
fn parse_compress(m: &ArgMatches) -> Option<bool> {
    if m.get_flag("compress") {
        Some(true)
    } else if m.get_flag("uncompressed") {
        Some(false)
    } else {
        None
    }
}

/// `-n`, `-a` and `-d` override each other, so at most one is set.
fn parse_raw_data_handling(m: &ArgMatches) -> RawDataHandling {
    if m.get_flag("no_external_tags") {
        RawDataHandling::RetainAll
    } else if m.get_flag("always_index_tags") {
        RawDataHandling::AlwaysIndex
    } else if m.get_flag("discard") {
        RawDataHandling::RemoveAll
    } else {
        RawDataHandling::Default
    }
}
