//! Core data structures shared by the mapforge crates.
//!
//! - [`TagClass`]: the closed set of tag classes with their four-character codes
//! - [`TagPath`]: normalized, engine-style tag paths
//! - [`Interner`]: deduplicating string table for tag paths
//! - [`Colors`]: ANSI palette for CLI output

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod colors;
mod interner;
mod path;
mod tag_class;


pub use colors::Colors;
pub use interner::{Interner, Symbol};
pub use path::{PathError, TagPath};
pub use tag_class::{TagClass, fourcc_to_string};

/// Tag class value used when a class slot is empty.
pub const NULL_CLASS: u32 = 0xFFFF_FFFF;

/// Tag id value of a null reference.
pub const NULL_TAG_ID: u32 = 0xFFFF_FFFF;
