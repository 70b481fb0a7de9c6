use std::path::PathBuf;

use mapforge_format::Engine;

use crate::index::IndexEntry;

/// What to do with bitmap, sound and localization asset data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RawDataHandling {
    /// Index data that byte-matches a resource map, inline the rest.
    #[default]
    Default,
    /// Drop all asset data; the map is not usable by clients that need it.
    RemoveAll,
    /// Inline everything, never consult resource maps.
    RetainAll,
    /// Index everything found in a resource map without comparing bytes
    /// (Custom Edition only).
    AlwaysIndex,
}

/// Options for one build.
#[derive(Clone, Debug)]
pub struct BuildParameters {
    pub engine: Engine,
    /// Searched in order; earlier directories take precedence.
    pub tags_directories: Vec<PathBuf>,
    pub maps_directory: PathBuf,
    pub raw_data_handling: RawDataHandling,
    pub verbose: bool,
    /// Tags to place first, in this order.
    pub index: Option<Vec<IndexEntry>>,
    pub forge_crc: Option<u32>,
    pub tag_data_address: Option<u32>,
    pub rename_scenario: Option<String>,
    pub optimize_space: bool,
    pub compress: bool,
    pub hide_pedantic_warnings: bool,
}

impl BuildParameters {
    /// Defaults for `engine`: `tags` and `maps` directories, compression if
    /// the engine compresses by default.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            tags_directories: vec![PathBuf::from("tags")],
            maps_directory: PathBuf::from("maps"),
            raw_data_handling: RawDataHandling::Default,
            verbose: false,
            index: None,
            forge_crc: None,
            tag_data_address: None,
            rename_scenario: None,
            optimize_space: false,
            compress: engine.info().compress_by_default,
            hide_pedantic_warnings: false,
        }
    }

    pub fn tags_directories(mut self, dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.tags_directories = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn maps_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.maps_directory = dir.into();
        self
    }

    pub fn raw_data_handling(mut self, handling: RawDataHandling) -> Self {
        self.raw_data_handling = handling;
        self
    }

    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    pub fn index(mut self, index: Vec<IndexEntry>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn forge_crc(mut self, crc: u32) -> Self {
        self.forge_crc = Some(crc);
        self
    }

    pub fn tag_data_address(mut self, address: u32) -> Self {
        self.tag_data_address = Some(address);
        self
    }

    pub fn rename_scenario(mut self, name: impl Into<String>) -> Self {
        self.rename_scenario = Some(name.into());
        self
    }

    pub fn optimize_space(mut self, value: bool) -> Self {
        self.optimize_space = value;
        self
    }

    pub fn compress(mut self, value: bool) -> Self {
        self.compress = value;
        self
    }

    pub fn hide_pedantic_warnings(mut self, value: bool) -> Self {
        self.hide_pedantic_warnings = value;
        self
    }

    /// Tag data address to use, falling back to the engine default.
    pub fn effective_tag_data_address(&self) -> u32 {
        self.tag_data_address
            .unwrap_or(self.engine.info().tag_data_address)
    }
}
