//! Tag path normalization.
//!
//! Engine tag paths are lowercase, use `\` separators and carry no extension
//! (`levels\test\test`). Paths coming from the command line, index files or
//! tag references may use either separator and any case; they are folded
//! into the engine form before being used as identity keys.

use std::path::{Path, PathBuf};

/// Error produced when a tag path cannot be normalized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("tag path is empty")]
    Empty,
    #[error("tag path `{0}` escapes the tags directory")]
    ParentComponent(String),
    #[error("tag path `{0}` contains non-ASCII characters")]
    NonAscii(String),
}

/// A normalized tag path (`levels\test\test`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagPath(String);

impl TagPath {
    /// Normalize a path given in any separator style and case.
    ///
    /// Returns the normalized path and whether case folding changed it.
    pub fn normalize(raw: &str) -> Result<(TagPath, bool), PathError> {
        if !raw.is_ascii() {
            return Err(PathError::NonAscii(raw.to_string()));
        }

        let mut components = Vec::new();
        for component in raw.split(['\\', '/']) {
            match component {
                "" | "." => continue,
                ".." => return Err(PathError::ParentComponent(raw.to_string())),
                _ => components.push(component),
            }
        }
        if components.is_empty() {
            return Err(PathError::Empty);
        }

        let joined = components.join("\\");
        let lowered = joined.to_ascii_lowercase();
        let folded = lowered != joined;
        Ok((TagPath(lowered), folded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last component (`levels\test\test` -> `test`).
    pub fn base_name(&self) -> &str {
        self.0.rsplit('\\').next().unwrap_or(&self.0)
    }

    /// Everything before the last component, without the trailing separator.
    pub fn directory(&self) -> Option<&str> {
        self.0.rfind('\\').map(|i| &self.0[..i])
    }

    /// Same directory, different base name.
    pub fn with_base_name(&self, base_name: &str) -> TagPath {
        match self.directory() {
            Some(dir) => TagPath(format!("{dir}\\{base_name}")),
            None => TagPath(base_name.to_string()),
        }
    }

    /// Filesystem location of this tag inside `tags_directory`.
    pub fn to_file_path(&self, tags_directory: &Path, extension: &str) -> PathBuf {
        let mut path = tags_directory.to_path_buf();
        for component in self.0.split('\\') {
            path.push(component);
        }
        let mut file_name = path.into_os_string();
        file_name.push(".");
        file_name.push(extension);
        PathBuf::from(file_name)
    }

    /// Convert a filesystem path inside one of `tags_directories` into a tag
    /// path, requiring the given extension. The first directory containing the
    /// file wins.
    pub fn from_file_path(
        file: &Path,
        tags_directories: &[PathBuf],
        extension: &str,
    ) -> Option<TagPath> {
        if file.extension().and_then(|e| e.to_str()) != Some(extension) {
            return None;
        }
        let stem = file.with_extension("");
        for dir in tags_directories {
            let Ok(relative) = stem.strip_prefix(dir) else {
                continue;
            };
            let joined: Vec<&str> = relative
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect();
            if let Ok((path, _)) = TagPath::normalize(&joined.join("\\")) {
                return Some(path);
            }
        }
        None
    }
}

impl std::fmt::Display for TagPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TagPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
