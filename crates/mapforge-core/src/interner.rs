//! String interning for the tag path table.
//!
//! Tag paths are stored once in the cache file even when several tags share
//! them (same path, different class). Interning hands out `Symbol`s in
//! insertion order; `to_blob` lays the strings out as the engine expects.

use indexmap::IndexSet;

/// A lightweight handle to an interned string.
///
/// Symbols are ordered by insertion order, not lexicographically.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Raw index for serialization/debugging.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

}

/// String interner. Deduplicates strings and returns cheap Symbol handles.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    strings: IndexSet<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its Symbol.
    /// If the string was already interned, returns the existing Symbol.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(index) = self.strings.get_index_of(s) {
            return Symbol(index as u32);
        }
        let (index, _) = self.strings.insert_full(s.to_owned());
        Symbol(index as u32)
    }

    /// Resolve a Symbol back to its string.
    ///
    /// # Panics
    /// Panics if the symbol was not created by this interner.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Emit the string blob and per-symbol offsets.
    ///
    /// Strings are NUL-terminated and concatenated in symbol order; the blob
    /// is zero-padded to a multiple of `align`.
    pub fn to_blob(&self, align: usize) -> (Vec<u8>, Vec<u32>) {
        let mut blob = Vec::new();
        let mut offsets = Vec::with_capacity(self.strings.len());

        for s in &self.strings {
            offsets.push(blob.len() as u32);
            blob.extend_from_slice(s.as_bytes());
            blob.push(0);
        }

        let rem = blob.len() % align.max(1);
        if rem != 0 {
            blob.resize(blob.len() + align - rem, 0);
        }

        (blob, offsets)
    }
}
