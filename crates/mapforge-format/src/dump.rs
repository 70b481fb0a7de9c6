//! Human-readable cache file dump.

use std::fmt::Write as _;

use mapforge_core::{Colors, NULL_CLASS, TagClass, fourcc_to_string};

use crate::cache_file::CacheFile;
use crate::header::MapType;

/// Render header, tag data header and the tag list.
pub fn dump(file: &CacheFile, colors: Colors) -> String {
    let mut out = String::new();
    dump_header(&mut out, file, colors);
    dump_tag_data_header(&mut out, file, colors);
    dump_tags(&mut out, file, colors);
    out
}

fn dump_header(out: &mut String, file: &CacheFile, c: Colors) {
    let h = file.header();
    let engine = file
        .engine()
        .map(|e| e.to_string())
        .unwrap_or_else(|| format!("unknown ({:#x})", h.engine_version));
    let map_type = MapType::from_u16(h.map_type)
        .map(|t| t.to_string())
        .unwrap_or_else(|| format!("unknown ({})", h.map_type));

    writeln!(out, "{}[header]{}", c.blue, c.reset).ok();
    writeln!(out, "name         = {}", h.name).ok();
    writeln!(out, "build        = {}", h.build).ok();
    writeln!(out, "engine       = {engine}").ok();
    writeln!(out, "map_type     = {map_type}").ok();
    writeln!(out, "file_size    = {}", h.decompressed_size).ok();
    writeln!(
        out,
        "tag_data     = {}{:#010x} +{:#x}{}",
        c.dim, h.tag_data_offset, h.tag_data_size, c.reset
    )
    .ok();
    writeln!(out, "crc32        = {:#010x}", h.crc32).ok();
    out.push('\n');
}

fn dump_tag_data_header(out: &mut String, file: &CacheFile, c: Colors) {
    let t = file.tag_data_header();
    writeln!(out, "{}[tag_data]{}", c.blue, c.reset).ok();
    writeln!(out, "address      = {:#010x}", file.tag_data_address()).ok();
    writeln!(out, "tag_array    = {:#010x}", t.tag_array_address).ok();
    writeln!(out, "scenario     = {:#010x}", t.scenario_tag_id).ok();
    writeln!(out, "checksums    = {:#010x}", t.tag_file_checksums).ok();
    writeln!(out, "tag_count    = {}", t.tag_count).ok();
    writeln!(
        out,
        "model_data   = {}{:#010x} +{:#x}{}",
        c.dim, t.model_data_file_offset, t.model_data_size, c.reset
    )
    .ok();
    out.push('\n');
}

fn dump_tags(out: &mut String, file: &CacheFile, c: Colors) {
    writeln!(out, "{}[tags]{}", c.blue, c.reset).ok();
    let width = file.tags().len().saturating_sub(1).to_string().len().max(1);
    for (i, tag) in file.tags().iter().enumerate() {
        let e = &tag.entry;
        let extension = TagClass::from_fourcc(e.primary_class)
            .map(|class| class.extension().to_string())
            .unwrap_or_else(|| fourcc_to_string(e.primary_class));
        let data = if e.is_indexed() {
            format!("indexed #{}", e.data)
        } else {
            format!("{:#010x}", e.data)
        };
        let parents = [e.secondary_class, e.tertiary_class]
            .into_iter()
            .filter(|&class| class != NULL_CLASS)
            .map(fourcc_to_string)
            .collect::<Vec<_>>();
        let parents = if parents.is_empty() {
            String::new()
        } else {
            format!(" ({})", parents.join(", "))
        };

        writeln!(
            out,
            "{i:>width$}  {}{:#010x}{}  {}{}.{}{}{}  {}{}{}",
            c.dim,
            e.tag_id,
            c.reset,
            c.blue,
            tag.path,
            extension,
            c.reset,
            parents,
            c.dim,
            data,
            c.reset,
        )
        .ok();
    }
}
