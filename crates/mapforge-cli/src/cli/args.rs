//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Scenario tag path (positional).
pub fn scenario_arg() -> Arg {
    Arg::new("scenario")
        .value_name("SCENARIO")
        .required(true)
        .help("Scenario tag path, or a file path with --fs-path")
}

/// Target engine (-g/--game-engine).
///
/// Validated by the command so an unknown engine exits with the
/// invalid-argument status instead of clap's usage error.
pub fn engine_arg() -> Arg {
    Arg::new("engine")
        .short('g')
        .long("game-engine")
        .value_name("ENGINE")
        .help("Target engine: custom, demo, native, retail")
}

/// Tags directories (-t/--tags), repeatable.
pub fn tags_arg() -> Arg {
    Arg::new("tags")
        .short('t')
        .long("tags")
        .value_name("DIR")
        .action(ArgAction::Append)
        .value_parser(value_parser!(PathBuf))
        .help("Tags directory; repeat to add more, earlier ones take precedence [default: tags]")
}

/// Maps directory (-m/--maps).
pub fn maps_arg() -> Arg {
    Arg::new("maps")
        .short('m')
        .long("maps")
        .value_name("DIR")
        .default_value("maps")
        .value_parser(value_parser!(PathBuf))
        .help("Directory with resource maps and the default output location")
}

/// Output file (-o/--output).
pub fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write the map here instead of <maps>/<scenario>.map")
}

/// Tag index file (-w/--with-index).
pub fn index_arg() -> Arg {
    Arg::new("index")
        .short('w')
        .long("with-index")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Order tags as listed in an index file")
}

/// Forged CRC32 (-C/--forge-crc).
pub fn forge_crc_arg() -> Arg {
    Arg::new("forge_crc")
        .short('C')
        .long("forge-crc")
        .value_name("CRC")
        .help("Forge the map's CRC32 to this value (1-8 hex digits)")
}

/// Compress the map (-c/--compress).
pub fn compress_arg() -> Arg {
    Arg::new("compress")
        .short('c')
        .long("compress")
        .action(ArgAction::SetTrue)
        .overrides_with("uncompressed")
        .help("Compress the map")
}

/// Do not compress the map (-u/--uncompressed).
pub fn uncompressed_arg() -> Arg {
    Arg::new("uncompressed")
        .short('u')
        .long("uncompressed")
        .action(ArgAction::SetTrue)
        .overrides_with("compress")
        .help("Do not compress the map (default for custom, demo and retail)")
}

/// Deduplicate structs (-O/--optimize).
pub fn optimize_arg() -> Arg {
    Arg::new("optimize")
        .short('O')
        .long("optimize")
        .action(ArgAction::SetTrue)
        .help("Merge identical structs; slower builds, smaller maps")
}

const RAW_DATA_FLAGS: [&str; 3] = ["no_external_tags", "always_index_tags", "discard"];

fn raw_data_arg(id: &'static str, short: char, long: &'static str, help: &'static str) -> Arg {
    let others: Vec<&str> = RAW_DATA_FLAGS.into_iter().filter(|f| *f != id).collect();
    Arg::new(id)
        .short(short)
        .long(long)
        .action(ArgAction::SetTrue)
        .overrides_with_all(others)
        .help(help)
}

/// Keep all asset data in the map (-n/--no-external-tags).
pub fn no_external_tags_arg() -> Arg {
    raw_data_arg(
        "no_external_tags",
        'n',
        "no-external-tags",
        "Never use resource maps; larger map, faster build",
    )
}

/// Index everything found in resource maps (-a/--always-index-tags).
pub fn always_index_tags_arg() -> Arg {
    raw_data_arg(
        "always_index_tags",
        'a',
        "always-index-tags",
        "Index tags found in resource maps without comparing them",
    )
}

/// Drop all asset data (-d/--discard).
pub fn discard_arg() -> Arg {
    raw_data_arg(
        "discard",
        'd',
        "discard",
        "Discard all asset data; the map is not playable on most clients",
    )
}

/// New scenario name (-N/--rename-scenario).
pub fn rename_scenario_arg() -> Arg {
    Arg::new("rename_scenario")
        .short('N')
        .long("rename-scenario")
        .value_name("NAME")
        .help("Rename the scenario")
}

/// Scenario is a filesystem path (-P/--fs-path).
pub fn fs_path_arg() -> Arg {
    Arg::new("fs_path")
        .short('P')
        .long("fs-path")
        .action(ArgAction::SetTrue)
        .help("Treat SCENARIO as a file inside a tags directory")
}

/// Hide pedantic warnings (-H/--hide-pedantic-warnings).
pub fn hide_pedantic_arg() -> Arg {
    Arg::new("hide_pedantic_warnings")
        .short('H')
        .long("hide-pedantic-warnings")
        .action(ArgAction::SetTrue)
        .help("Don't show minor warnings")
}

/// Only print errors (-q/--quiet).
pub fn quiet_arg() -> Arg {
    Arg::new("quiet")
        .short('q')
        .long("quiet")
        .action(ArgAction::SetTrue)
        .help("Only print errors")
}

/// Cache file to inspect (positional).
pub fn map_path_arg() -> Arg {
    Arg::new("map")
        .value_name("MAP")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Cache file to inspect")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}
