//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("mapforge")
        .about("Build cache files for Halo: Combat Evolved")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(build_command())
        .subcommand(dump_command())
}

/// Compile a scenario and everything it references into a map.
pub fn build_command() -> Command {
    Command::new("build")
        .about("Build a cache file from a scenario tag")
        .override_usage("  mapforge build [OPTIONS] -g <ENGINE> <SCENARIO>")
        .after_help(
            r#"EXAMPLES:
  mapforge build -g custom levels\test\bloodgulch\bloodgulch
  mapforge build -g native -t tags -t stock_tags levels\a10\a10
  mapforge build -g retail -P tags/levels/test/test.scenario -o out/test.map"#,
        )
        .arg(scenario_arg())
        .arg(engine_arg())
        .arg(tags_arg())
        .arg(maps_arg())
        .arg(output_arg())
        .arg(index_arg())
        .arg(forge_crc_arg())
        .arg(compress_arg())
        .arg(uncompressed_arg())
        .arg(optimize_arg())
        .arg(no_external_tags_arg())
        .arg(always_index_tags_arg())
        .arg(discard_arg())
        .arg(rename_scenario_arg())
        .arg(fs_path_arg())
        .arg(hide_pedantic_arg())
        .arg(quiet_arg())
        .arg(color_arg())
}

/// Print the header, tag data header and tag list of a built map.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show the layout of a cache file")
        .override_usage("  mapforge dump <MAP>")
        .arg(map_path_arg())
        .arg(color_arg())
}
