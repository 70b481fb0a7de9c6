//! Tests for CLI dispatch logic.
//!
//! These tests verify:
//! 1. Defaults: tags and maps directories, engine-default compression
//! 2. Overriding flags: the last of -c/-u and of -n/-a/-d wins
//! 3. Params extraction: correct fields are extracted from ArgMatches

use std::path::PathBuf;

use clap::error::ErrorKind;
use mapforge_build::RawDataHandling;

use super::*;
use crate::cli::commands::{build_command, dump_command};

fn build_params(args: &[&str]) -> BuildParams {
    let mut argv = vec!["build"];
    argv.extend_from_slice(args);
    let m = build_command().try_get_matches_from(argv).unwrap();
    BuildParams::from_matches(&m)
}

#[test]
fn build_defaults() {
    let params = build_params(&["levels\\test\\test"]);

    assert_eq!(params.scenario, "levels\\test\\test");
    assert_eq!(params.engine, None);
    assert_eq!(params.tags, [PathBuf::from("tags")]);
    assert_eq!(params.maps, PathBuf::from("maps"));
    assert_eq!(params.output, None);
    assert_eq!(params.compress, None);
    assert_eq!(params.raw_data_handling, RawDataHandling::Default);
    assert!(!params.optimize);
    assert!(!params.quiet);
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn build_tags_keep_order() {
    let params = build_params(&["-t", "mine", "--tags", "stock", "-t", "extra", "x"]);
    assert_eq!(
        params.tags,
        [
            PathBuf::from("mine"),
            PathBuf::from("stock"),
            PathBuf::from("extra")
        ]
    );
}

#[test]
fn build_extracts_every_option() {
    let params = build_params(&[
        "-g",
        "custom",
        "-m",
        "out_maps",
        "-o",
        "out/test.map",
        "-w",
        "test.txt",
        "-C",
        "DEADBEEF",
        "-O",
        "-N",
        "renamed",
        "-P",
        "-H",
        "-q",
        "--color",
        "never",
        "tags/levels/test/test.scenario",
    ]);

    assert_eq!(params.engine.as_deref(), Some("custom"));
    assert_eq!(params.maps, PathBuf::from("out_maps"));
    assert_eq!(params.output, Some(PathBuf::from("out/test.map")));
    assert_eq!(params.index, Some(PathBuf::from("test.txt")));
    assert_eq!(params.forge_crc.as_deref(), Some("DEADBEEF"));
    assert!(params.optimize);
    assert_eq!(params.rename_scenario.as_deref(), Some("renamed"));
    assert!(params.fs_path);
    assert!(params.hide_pedantic_warnings);
    assert!(params.quiet);
    assert_eq!(params.color, ColorChoice::Never);
}

#[test]
fn last_compression_flag_wins() {
    assert_eq!(build_params(&["-c", "x"]).compress, Some(true));
    assert_eq!(build_params(&["-u", "x"]).compress, Some(false));
    assert_eq!(build_params(&["-c", "-u", "x"]).compress, Some(false));
    assert_eq!(build_params(&["-u", "-c", "x"]).compress, Some(true));
}

#[test]
fn last_raw_data_flag_wins() {
    assert_eq!(
        build_params(&["-n", "x"]).raw_data_handling,
        RawDataHandling::RetainAll
    );
    assert_eq!(
        build_params(&["-a", "x"]).raw_data_handling,
        RawDataHandling::AlwaysIndex
    );
    assert_eq!(
        build_params(&["-d", "x"]).raw_data_handling,
        RawDataHandling::RemoveAll
    );
    assert_eq!(
        build_params(&["-d", "-n", "x"]).raw_data_handling,
        RawDataHandling::RetainAll
    );
    assert_eq!(
        build_params(&["-n", "-a", "x"]).raw_data_handling,
        RawDataHandling::AlwaysIndex
    );
}

#[test]
fn build_requires_scenario() {
    let err = build_command()
        .try_get_matches_from(["build", "-g", "native"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn build_rejects_unknown_flags() {
    let err = build_command()
        .try_get_matches_from(["build", "--fuel", "10", "x"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
}

#[test]
fn unknown_engine_is_left_to_the_command() {
    let params = build_params(&["-g", "xbox", "x"]);
    assert_eq!(params.engine.as_deref(), Some("xbox"));
}

#[test]
fn dump_extracts_map_path() {
    let m = dump_command()
        .try_get_matches_from(["dump", "maps/test.map", "--color", "always"])
        .unwrap();
    let params = DumpParams::from_matches(&m);

    assert_eq!(params.map, PathBuf::from("maps/test.map"));
    assert_eq!(params.color, ColorChoice::Always);
}

#[test]
fn dump_requires_map() {
    let err = dump_command().try_get_matches_from(["dump"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn build_help_lists_engines() {
    let help = build_command().render_help().to_string();
    assert!(help.contains("--game-engine"));
    assert!(help.contains("custom, demo, native, retail"));
    assert!(help.contains("--forge-crc"));
}
