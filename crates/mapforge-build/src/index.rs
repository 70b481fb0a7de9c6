//! Tag index files.
//!
//! One `path.extension` per line; a blank line or the end of the file stops
//! reading. Used to force tag order to match a stock map.

use std::path::Path;

use mapforge_core::{TagClass, TagPath};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::{Error, Result};

/// One tag named by an index file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub path: TagPath,
    pub class: TagClass,
}

/// Parse tag index text.
pub fn parse_tag_index(text: &str, diagnostics: &mut Diagnostics) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            break;
        }

        let Some((path, extension)) = line.rsplit_once('.') else {
            return Err(diagnostics
                .report(DiagnosticKind::InvalidIndex)
                .message(format!("line {}: `{line}` has no extension", number + 1))
                .fail());
        };
        let Some(class) = TagClass::from_extension(extension) else {
            return Err(diagnostics
                .report(DiagnosticKind::InvalidIndex)
                .message(format!(
                    "line {}: `{extension}` is not a tag class",
                    number + 1
                ))
                .fail());
        };
        let path = match TagPath::normalize(path) {
            Ok((path, _)) => path,
            Err(e) => {
                return Err(diagnostics
                    .report(DiagnosticKind::InvalidIndex)
                    .message(format!("line {}: {e}", number + 1))
                    .fail());
            }
        };

        entries.push(IndexEntry { path, class });
    }

    Ok(entries)
}

/// Read and parse a tag index file.
pub fn read_tag_index(path: &Path, diagnostics: &mut Diagnostics) -> Result<Vec<IndexEntry>> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        diagnostics
            .report(DiagnosticKind::InvalidIndex)
            .message(format!("cannot read {}", path.display()))
            .emit();
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    parse_tag_index(&text, diagnostics)
}
