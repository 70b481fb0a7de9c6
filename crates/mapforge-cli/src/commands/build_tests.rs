use std::path::Path;

use mapforge_build::{Field, FieldStruct, FieldValue, RawDataHandling, TagFile};
use mapforge_core::{TagClass, TagPath};
use mapforge_format::CacheFile;
use mapforge_format::crc::crc32;
use tempfile::TempDir;

use super::Exit;
use super::build::{BuildArgs, output_warnings, parse_crc, run};
use super::dump::{self, DumpArgs};

const SCENARIO: &str = "levels\\test\\test";

fn tag_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("maps")).unwrap();
    write_tag(
        dir.path(),
        SCENARIO,
        TagClass::Scenario,
        vec![Field::new(
            "weapon",
            FieldValue::Reference {
                class: TagClass::Weapon,
                path: Some("weapons\\gun".to_owned()),
                id_only: false,
            },
        )],
    );
    write_tag(
        dir.path(),
        "weapons\\gun",
        TagClass::Weapon,
        vec![Field::new("ammo", FieldValue::Int32 { value: 12 })],
    );
    dir
}

fn write_tag(root: &Path, path: &str, class: TagClass, fields: Vec<Field>) {
    let file = TagFile {
        class,
        root: FieldStruct::new(fields),
    };
    let (path, _) = TagPath::normalize(path).unwrap();
    let target = path.to_file_path(&root.join("tags"), class.extension());
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    std::fs::write(target, serde_json::to_vec(&file).unwrap()).unwrap();
}

fn args(dir: &TempDir, engine: &str) -> BuildArgs {
    BuildArgs {
        scenario: SCENARIO.to_owned(),
        engine: Some(engine.to_owned()),
        tags: vec![dir.path().join("tags")],
        maps: dir.path().join("maps"),
        output: None,
        index: None,
        forge_crc: None,
        compress: None,
        optimize: false,
        raw_data_handling: RawDataHandling::Default,
        rename_scenario: None,
        fs_path: false,
        hide_pedantic_warnings: false,
        quiet: true,
        color: false,
    }
}

#[test]
fn crc_accepts_one_to_eight_hex_digits() {
    assert_eq!(parse_crc("0"), Ok(0));
    assert_eq!(parse_crc("deadBEEF"), Ok(0xDEAD_BEEF));
    assert_eq!(parse_crc("7B309554"), Ok(0x7B30_9554));
    assert_eq!(parse_crc(""), Err(" (must be 1-8 digits)".to_owned()));
    assert_eq!(
        parse_crc("123456789"),
        Err("123456789 (must be 1-8 digits)".to_owned())
    );
    assert_eq!(parse_crc("12G4"), Err("12G4 (must be hexadecimal)".to_owned()));
}

#[test]
fn output_name_must_match_scenario() {
    assert!(output_warnings(Path::new("out/test.map"), "test").is_empty());

    let warnings = output_warnings(Path::new("out/test.bin"), "test");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("`.map`"));

    let warnings = output_warnings(Path::new("out/other.map"), "test");
    insta::assert_snapshot!(warnings.join("\n"), @r#"
    the base name `other` does not match the scenario `test`; the map will fail to load under this file name
    did you intend to use --rename-scenario "other"?
    "#);

    let warnings = output_warnings(Path::new("out/Other.map"), "test");
    assert_eq!(warnings.len(), 1);
}

#[test]
fn builds_into_maps_directory() {
    let dir = tag_tree();
    assert_eq!(run(args(&dir, "native")), Exit::Ok);

    let output = dir.path().join("maps").join("test.map");
    let map = CacheFile::from_path(&output).unwrap();
    let paths: Vec<_> = map.tags().iter().map(|t| t.path.as_str()).collect();
    assert_eq!(paths, [SCENARIO, "weapons\\gun"]);

    let dumped = dump::run(DumpArgs {
        map: output,
        color: false,
    });
    assert_eq!(dumped, Exit::Ok);
}

#[test]
fn explicit_output_and_rename() {
    let dir = tag_tree();
    let output = dir.path().join("renamed.map");
    let mut build = args(&dir, "custom");
    build.output = Some(output.clone());
    build.rename_scenario = Some("renamed".to_owned());
    build.forge_crc = Some("1234abcd".to_owned());

    assert_eq!(run(build), Exit::Ok);
    let data = std::fs::read(&output).unwrap();
    assert_eq!(crc32(&data), 0x1234_ABCD);
    let map = CacheFile::from_bytes(data).unwrap();
    assert_eq!(map.header().name, "renamed");
}

#[test]
fn fs_path_resolves_inside_tags_directory() {
    let dir = tag_tree();
    let mut build = args(&dir, "native");
    build.scenario = dir
        .path()
        .join("tags/levels/test/test.scenario")
        .to_string_lossy()
        .into_owned();
    build.fs_path = true;
    assert_eq!(run(build), Exit::Ok);
    assert!(dir.path().join("maps/test.map").is_file());
}

#[test]
fn fs_path_outside_tags_is_unhandled() {
    let dir = tag_tree();
    let mut build = args(&dir, "native");
    build.scenario = "/elsewhere/test.scenario".to_owned();
    build.fs_path = true;
    assert_eq!(run(build), Exit::UnhandledArgument);
}

#[test]
fn index_file_orders_tags() {
    let dir = tag_tree();
    let index = dir.path().join("test.txt");
    std::fs::write(&index, "weapons\\gun.weapon\n").unwrap();
    let mut build = args(&dir, "native");
    build.index = Some(index);

    assert_eq!(run(build), Exit::Ok);
    let map = CacheFile::from_path(dir.path().join("maps/test.map")).unwrap();
    assert_eq!(map.tags()[0].path, "weapons\\gun");
}

#[test]
fn argument_errors_have_their_own_status() {
    let dir = tag_tree();

    let mut build = args(&dir, "native");
    build.engine = None;
    assert_eq!(run(build), Exit::NothingToDo);

    assert_eq!(run(args(&dir, "xbox")), Exit::InvalidArgument);

    let mut build = args(&dir, "native");
    build.forge_crc = Some("xyz".to_owned());
    assert_eq!(run(build), Exit::InvalidArgument);

    let mut build = args(&dir, "native");
    build.index = Some(dir.path().join("missing.txt"));
    assert_eq!(run(build), Exit::InvalidArgument);

    let mut build = args(&dir, "native");
    build.index = Some(dir.path().join("bad.txt"));
    std::fs::write(dir.path().join("bad.txt"), "no_extension\n").unwrap();
    assert_eq!(run(build), Exit::InvalidArgument);
}

#[test]
fn build_failures_exit_with_failed() {
    let dir = tag_tree();
    let mut build = args(&dir, "native");
    build.scenario = "levels\\missing\\missing".to_owned();
    assert_eq!(run(build), Exit::Failed);
    assert!(!dir.path().join("maps/missing.map").exists());
}

#[test]
fn unwritable_output_is_a_save_error() {
    let dir = tag_tree();
    let mut build = args(&dir, "native");
    build.output = Some(dir.path().join("no/such/dir/test.map"));
    assert_eq!(run(build), Exit::FileSaveError);
}
