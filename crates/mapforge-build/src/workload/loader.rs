//! Tag graph loader.
//!
//! Tags are memoized on their normalized `(path, class)`. A tag's slot is
//! allocated before its body is compiled, so reference cycles resolve to the
//! slot instead of recursing forever.

use std::path::PathBuf;

use mapforge_core::{TagClass, TagPath};
use tracing::trace;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::tag::TagParseError;
use crate::{Error, Result};

use super::BuildWorkload;
use super::structs::WorkloadTag;

impl BuildWorkload<'_> {
    /// Slot for `(path, class)`, compiling the tag on first use.
    pub fn compile_tag_recursively(
        &mut self,
        path: &TagPath,
        class: TagClass,
        diagnostics: &mut Diagnostics,
    ) -> Result<usize> {
        let index = self.load_tag(path, class, None, diagnostics)?;
        if !self.compiled[index] {
            self.compile_tag(index, diagnostics)?;
        }
        Ok(index)
    }

    /// Allocate a slot without compiling or checking the file.
    ///
    /// Used to pin tag order; the body is compiled when first referenced or
    /// by [`compile_reserved`](Self::compile_reserved).
    pub fn reserve_tag(&mut self, path: &TagPath, class: TagClass) -> usize {
        if let Some(&index) = self.lookup.get(&(path.clone(), class)) {
            return index;
        }
        self.push_slot(path.clone(), class, None)
    }

    /// Resolve `(path, class)` to a slot, allocating it if needed.
    ///
    /// Abstract classes resolve to the first concrete subclass that already
    /// has a slot or whose file exists.
    pub(crate) fn load_tag(
        &mut self,
        path: &TagPath,
        class: TagClass,
        referrer: Option<usize>,
        diagnostics: &mut Diagnostics,
    ) -> Result<usize> {
        if let Some(&index) = self.lookup.get(&(path.clone(), class)) {
            return Ok(index);
        }

        let candidates = class.concrete_classes();
        for &candidate in &candidates {
            if let Some(&index) = self.lookup.get(&(path.clone(), candidate)) {
                self.lookup.insert((path.clone(), class), index);
                return Ok(index);
            }
        }

        let Some(concrete) = candidates
            .iter()
            .copied()
            .find(|&c| self.find_tag_file(path, c).is_some())
        else {
            let mut report = diagnostics
                .report(DiagnosticKind::TagNotFound)
                .message(format!("{path}.{class}"));
            if let Some(referrer) = referrer {
                report = report.tag(self.tag_name(referrer));
            }
            return Err(report.fail());
        };

        let alias = (concrete != class).then_some(class);
        Ok(self.push_slot(path.clone(), concrete, alias))
    }

    pub(crate) fn push_slot(&mut self, path: TagPath, class: TagClass, alias: Option<TagClass>) -> usize {
        let index = self.tags.len();
        let mut tag = WorkloadTag::new(path.clone(), class);
        tag.alias = alias;
        self.tags.push(tag);
        self.compiled.push(false);

        if let Some(alias) = alias {
            self.lookup.insert((path.clone(), alias), index);
        }
        self.lookup.insert((path, class), index);
        index
    }

    /// First tags directory holding the file for `(path, class)`.
    fn find_tag_file(&self, path: &TagPath, class: TagClass) -> Option<PathBuf> {
        self.tags_directories
            .iter()
            .map(|dir| path.to_file_path(dir, class.extension()))
            .find(|file| file.is_file())
    }

    /// Read, parse and compile the body of tag `index`.
    pub(crate) fn compile_tag(&mut self, index: usize, diagnostics: &mut Diagnostics) -> Result<()> {
        self.compiled[index] = true;

        let path = self.tags[index].path.clone();
        let class = self.tags[index].class;
        let name = self.tag_name(index);

        let Some(file) = self.find_tag_file(&path, class) else {
            return Err(diagnostics
                .report(DiagnosticKind::TagNotFound)
                .message(&name)
                .fail());
        };
        trace!(tag = %name, file = %file.display(), "compiling tag");

        let bytes = std::fs::read(&file).map_err(|source| {
            diagnostics
                .report(DiagnosticKind::TagUnreadable)
                .message(file.display().to_string())
                .tag(&name)
                .emit();
            Error::Io {
                path: file.clone(),
                source,
            }
        })?;
        self.compile_tag_bytes(index, &bytes, diagnostics)
    }

    /// Parse and compile tag `index` from bytes already in memory.
    pub(crate) fn compile_tag_bytes(
        &mut self,
        index: usize,
        bytes: &[u8],
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        self.compiled[index] = true;
        self.tags[index].file_checksum = crc32fast::hash(bytes);

        let class = self.tags[index].class;
        let name = self.tag_name(index);
        let tag_file = match self.parser.parse(class, bytes) {
            Ok(tag_file) => tag_file,
            Err(e) => {
                let kind = match e {
                    TagParseError::ClassMismatch { .. } => DiagnosticKind::WrongTagClass,
                    TagParseError::Json(_) => DiagnosticKind::MalformedTag,
                };
                return Err(diagnostics
                    .report(kind)
                    .message(e.to_string())
                    .tag(name)
                    .fail());
            }
        };

        let base = self.compile_struct(
            index,
            std::slice::from_ref(&tag_file.root),
            false,
            diagnostics,
        )?;
        self.tags[index].base_struct = Some(base);

        self.run_class_hooks(index, &tag_file.root, diagnostics)
    }

    /// Compile reserved slots nothing referenced.
    pub(crate) fn compile_reserved(&mut self, diagnostics: &mut Diagnostics) -> Result<()> {
        let mut index = 0;
        while index < self.tags.len() {
            if !self.compiled[index] {
                self.compile_tag(index, diagnostics)?;
            }
            index += 1;
        }
        Ok(())
    }

    /// Normalize a tag path, warning when case had to be folded.
    pub(crate) fn normalize_path(
        &self,
        raw: &str,
        referrer: Option<usize>,
        diagnostics: &mut Diagnostics,
    ) -> Result<TagPath> {
        match TagPath::normalize(raw) {
            Ok((path, folded)) => {
                if folded {
                    let mut report = diagnostics
                        .report(DiagnosticKind::PathCaseFolded)
                        .message(format!("`{raw}`"));
                    if let Some(referrer) = referrer {
                        report = report.tag(self.tag_name(referrer));
                    }
                    report.emit();
                }
                Ok(path)
            }
            Err(e) => {
                let mut report = diagnostics
                    .report(DiagnosticKind::InvalidTagPath)
                    .message(e.to_string());
                if let Some(referrer) = referrer {
                    report = report.tag(self.tag_name(referrer));
                }
                Err(report.fail())
            }
        }
    }
}
