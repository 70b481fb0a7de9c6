use mapforge_core::TagClass;
use mapforge_format::{CacheFile, Engine, HEADER_SIZE, ResourceMapType, read_u32_le};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::tag::JsonTagParser;
use crate::test_utils::*;
use crate::workload::BuildWorkload;
use crate::{Error, RawDataHandling};

const SCENARIO: &str = "levels\\test\\test";
const BACKGROUND: &str = "ui\\shell\\bitmaps\\background";
const PIXELS: [u8; 8] = [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE];

fn bitmap_tree() -> TagTree {
    let tree = TagTree::new();
    tree.write(
        SCENARIO,
        TagClass::Scenario,
        vec![reference("background", TagClass::Bitmap, BACKGROUND)],
    );
    tree.write(
        BACKGROUND,
        TagClass::Bitmap,
        vec![int32("width", 2), asset("pixels", &PIXELS)],
    );
    tree
}

/// `(size, flags, offset)` of the background's asset header.
fn asset_header(map: &CacheFile) -> (u32, u32, u32) {
    let header = map.read(tag_address(map, BACKGROUND) + 4, 12).unwrap();
    (
        read_u32_le(header, 0),
        read_u32_le(header, 4),
        read_u32_le(header, 8),
    )
}

fn contains_pixels(data: &[u8]) -> bool {
    data.windows(PIXELS.len()).any(|w| w == PIXELS)
}

#[test]
fn native_inlines_without_resource_maps() {
    let tree = bitmap_tree();
    let (built, diagnostics) = tree.build(SCENARIO, &tree.parameters(Engine::Native));
    let map = CacheFile::from_bytes(built.data).unwrap();

    assert_eq!(built.report.raw_data_bytes, 8);
    assert_eq!(asset_header(&map), (8, 0, HEADER_SIZE as u32));
    assert_eq!(&map.bytes()[HEADER_SIZE..HEADER_SIZE + 8], &PIXELS);
    assert!(!diagnostics.has_warnings());
}

#[test]
fn remove_all_drops_asset_bytes() {
    let tree = bitmap_tree();
    let parameters = tree
        .parameters(Engine::Native)
        .raw_data_handling(RawDataHandling::RemoveAll);
    let (built, _) = tree.build(SCENARIO, &parameters);

    assert!(!contains_pixels(&built.data));
    assert_eq!(built.report.raw_data_bytes, 0);
    let map = CacheFile::from_bytes(built.data).unwrap();
    assert_eq!(asset_header(&map), (8, 1, 0));
}

#[test]
fn retain_all_ignores_matching_resources() {
    let tree = bitmap_tree();
    tree.write_resource_map(
        "bitmaps.map",
        ResourceMapType::Bitmaps,
        &[(BACKGROUND, &PIXELS)],
    );
    let parameters = tree
        .parameters(Engine::CustomEdition)
        .raw_data_handling(RawDataHandling::RetainAll);
    let (built, _) = tree.build(SCENARIO, &parameters);

    assert_eq!(built.report.indexed_tags, 0);
    assert!(contains_pixels(&built.data));
    let map = CacheFile::from_bytes(built.data).unwrap();
    assert!(map.tags().iter().all(|t| !t.entry.is_indexed()));
}

#[test]
fn custom_edition_stubs_matching_tags() {
    let tree = bitmap_tree();
    tree.write_resource_map(
        "bitmaps.map",
        ResourceMapType::Bitmaps,
        &[("other", &[0; 4]), (BACKGROUND, &[0; 8])],
    );
    tree.write_resource_map(
        "custom_bitmaps.map",
        ResourceMapType::Bitmaps,
        &[("other", &[0; 4]), (BACKGROUND, &PIXELS)],
    );
    let (built, diagnostics) = tree.build(SCENARIO, &tree.parameters(Engine::CustomEdition));

    assert_eq!(built.report.indexed_tags, 1);
    assert_eq!(built.report.stubbed_tags, 1);
    assert_eq!(built.report.indexed_bytes, 8);
    assert!(!contains_pixels(&built.data));
    assert!(!diagnostics.has_warnings());

    let map = CacheFile::from_bytes(built.data).unwrap();
    let background = map.tags().iter().find(|t| t.path == BACKGROUND).unwrap();
    assert!(background.entry.is_indexed());
    assert_eq!(background.entry.data, 1);
}

#[test]
fn modified_stock_tag_is_inlined_with_a_warning() {
    let tree = bitmap_tree();
    tree.write_resource_map(
        "bitmaps.map",
        ResourceMapType::Bitmaps,
        &[(BACKGROUND, &[0; 8])],
    );
    let (built, diagnostics) = tree.build(SCENARIO, &tree.parameters(Engine::CustomEdition));

    assert_eq!(built.report.indexed_tags, 0);
    assert_eq!(built.report.raw_data_bytes, 8);
    assert!(diagnostics.contains(DiagnosticKind::ModifiedStockTag));
    assert!(!diagnostics.has_errors());
}

#[test]
fn always_index_skips_the_comparison() {
    let tree = bitmap_tree();
    tree.write_resource_map(
        "bitmaps.map",
        ResourceMapType::Bitmaps,
        &[(BACKGROUND, &[0; 8])],
    );
    let parameters = tree
        .parameters(Engine::CustomEdition)
        .raw_data_handling(RawDataHandling::AlwaysIndex);
    let (built, diagnostics) = tree.build(SCENARIO, &parameters);

    assert_eq!(built.report.stubbed_tags, 1);
    assert!(!diagnostics.contains(DiagnosticKind::ModifiedStockTag));
}

#[test]
fn retail_points_assets_into_the_resource_map() {
    let tree = bitmap_tree();
    tree.write_resource_map(
        "bitmaps.map",
        ResourceMapType::Bitmaps,
        &[("other", &[0; 4]), (BACKGROUND, &PIXELS)],
    );
    let (built, _) = tree.build(SCENARIO, &tree.parameters(Engine::Retail));

    assert_eq!(built.report.indexed_tags, 1);
    assert_eq!(built.report.stubbed_tags, 0);
    assert!(!contains_pixels(&built.data));

    let map = CacheFile::from_bytes(built.data).unwrap();
    // 16-byte map header, then 4 bytes of `other`.
    assert_eq!(asset_header(&map), (8, 1, 20));
    assert!(map.tags().iter().all(|t| !t.entry.is_indexed()));
}

#[test]
fn always_index_on_retail_warns_and_compares() {
    let tree = bitmap_tree();
    tree.write_resource_map(
        "bitmaps.map",
        ResourceMapType::Bitmaps,
        &[(BACKGROUND, &[0; 8])],
    );
    let parameters = tree
        .parameters(Engine::Retail)
        .raw_data_handling(RawDataHandling::AlwaysIndex);
    let (built, diagnostics) = tree.build(SCENARIO, &parameters);

    assert!(diagnostics.contains(DiagnosticKind::AlwaysIndexUnsupported));
    assert!(diagnostics.contains(DiagnosticKind::ModifiedStockTag));
    assert_eq!(built.report.indexed_tags, 0);
}

#[test]
fn missing_resource_map_is_an_input_error() {
    let tree = bitmap_tree();
    let mut diagnostics = Diagnostics::new();
    let err = crate::compile_map(
        SCENARIO,
        &tree.parameters(Engine::CustomEdition),
        &mut diagnostics,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Input(_)));
    assert!(diagnostics.contains(DiagnosticKind::ResourceMapMissing));
    assert!(err.to_string().contains("custom_bitmaps.map or bitmaps.map"));
}

#[test]
fn resource_map_of_the_wrong_type_is_rejected() {
    let tree = bitmap_tree();
    tree.write_resource_map(
        "custom_bitmaps.map",
        ResourceMapType::Sounds,
        &[(BACKGROUND, &PIXELS)],
    );
    let mut diagnostics = Diagnostics::new();
    let err = crate::compile_map(
        SCENARIO,
        &tree.parameters(Engine::CustomEdition),
        &mut diagnostics,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Input(_)));
    assert!(diagnostics.contains(DiagnosticKind::ResourceMapInvalid));
    assert!(err.to_string().contains("holds sounds, expected bitmaps"));
}

#[test]
fn flattened_tag_data_uses_relative_pointers() {
    let tree = TagTree::new();
    tree.write(
        "ui\\strings",
        TagClass::UnicodeStringList,
        vec![uint32("flags", 7), data("strings", b"hi\0\0")],
    );
    let mut diagnostics = Diagnostics::new();
    let workload = BuildWorkload::compile_single_tag(
        &JsonTagParser,
        "ui\\strings",
        TagClass::UnicodeStringList,
        vec![tree.tags_dir()],
        true,
        &mut diagnostics,
    )
    .unwrap();

    let flat = workload.flatten_tag_data(0);
    let mut expected = vec![7, 0, 0, 0];
    expected.extend_from_slice(&[4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 24, 0, 0, 0, 0, 0, 0, 0]);
    expected.extend_from_slice(b"hi\0\0");
    assert_eq!(flat, expected);
}

#[test]
fn localization_tags_match_against_flattened_data() {
    let tree = TagTree::new();
    tree.write(
        SCENARIO,
        TagClass::Scenario,
        vec![reference("strings", TagClass::UnicodeStringList, "ui\\strings")],
    );
    tree.write(
        "ui\\strings",
        TagClass::UnicodeStringList,
        vec![uint32("flags", 7), data("strings", b"hi\0\0")],
    );

    let mut flat = vec![7, 0, 0, 0];
    flat.extend_from_slice(&[4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 24, 0, 0, 0, 0, 0, 0, 0]);
    flat.extend_from_slice(b"hi\0\0");
    tree.write_resource_map("loc.map", ResourceMapType::Loc, &[("ui\\strings", &flat)]);

    let (built, _) = tree.build(SCENARIO, &tree.parameters(Engine::CustomEdition));
    assert_eq!(built.report.stubbed_tags, 1);

    let map = CacheFile::from_bytes(built.data).unwrap();
    let strings = map.tags().iter().find(|t| t.path == "ui\\strings").unwrap();
    assert!(strings.entry.is_indexed());
    assert_eq!(strings.entry.data, 0);
}
