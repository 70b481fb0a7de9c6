//! mapforge build pipeline: tag files in, cache file out.
//!
//! This crate provides the build workload:
//! - `tag` - tag file model and the parser seam
//! - `workload` - loader, class hooks, BSP partitioning, deduplicator,
//!   raw asset partitioner and assembler
//! - `diagnostics` - error and warning reporting
//! - `index` - tag index files
//! - `stock` - forged CRCs of stock maps

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod index;
mod parameters;
pub mod stock;
pub mod tag;
pub mod workload;

#[cfg(test)]
pub mod test_utils;

use std::path::PathBuf;

pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use index::{IndexEntry, parse_tag_index};
pub use parameters::{BuildParameters, RawDataHandling};
pub use tag::{Field, FieldStruct, FieldValue, JsonTagParser, TagFile, TagParser};
pub use workload::{BuildReport, BuildWorkload, BuiltMap, compile_map, compile_map_with_parser};

/// Errors that abort a build.
///
/// Every error is also recorded in [`Diagnostics`] with its tag context
/// before it is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A tag, resource map or index file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Missing or malformed input.
    #[error("{0}")]
    Input(String),

    /// Internal graph invariant violated (dangling index, out-of-bounds offset).
    #[error("internal consistency error: {0}")]
    Consistency(String),

    /// A limit of the target engine was exceeded.
    #[error("{0}")]
    Capacity(String),

    /// Forging or compression did not verify.
    #[error("{0}")]
    PostCondition(String),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, Error>;
