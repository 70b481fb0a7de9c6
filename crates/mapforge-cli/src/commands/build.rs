use std::path::{Path, PathBuf};

use mapforge_build::stock::stock_crc;
use mapforge_build::{
    BuildParameters, Diagnostics, RawDataHandling, compile_map, index::read_tag_index,
};
use mapforge_core::{TagClass, TagPath};
use mapforge_format::Engine;
use tracing::info;

use super::Exit;

const MAP_EXTENSION: &str = "map";

pub struct BuildArgs {
    pub scenario: String,
    pub engine: Option<String>,
    pub tags: Vec<PathBuf>,
    pub maps: PathBuf,
    pub output: Option<PathBuf>,
    pub index: Option<PathBuf>,
    pub forge_crc: Option<String>,
    pub compress: Option<bool>,
    pub optimize: bool,
    pub raw_data_handling: RawDataHandling,
    pub rename_scenario: Option<String>,
    pub fs_path: bool,
    pub hide_pedantic_warnings: bool,
    pub quiet: bool,
    pub color: bool,
}

pub fn run(args: BuildArgs) -> Exit {
    let Some(engine_name) = args.engine.as_deref() else {
        eprintln!("error: no engine target specified (use -g)");
        return Exit::NothingToDo;
    };
    let Some(engine) = Engine::from_name(engine_name) else {
        eprintln!(
            "error: unknown engine `{engine_name}` (expected custom, demo, native or retail)"
        );
        return Exit::InvalidArgument;
    };

    let forge_crc = match args.forge_crc.as_deref().map(parse_crc).transpose() {
        Ok(crc) => crc,
        Err(msg) => {
            eprintln!("error: invalid CRC32 {msg}");
            return Exit::InvalidArgument;
        }
    };

    let scenario = if args.fs_path {
        let file = Path::new(&args.scenario);
        match TagPath::from_file_path(file, &args.tags, TagClass::Scenario.extension()) {
            Some(path) => path.as_str().to_owned(),
            None => {
                eprintln!(
                    "error: {} is not a scenario tag in any tags directory",
                    args.scenario
                );
                return Exit::UnhandledArgument;
            }
        }
    } else {
        args.scenario.clone()
    };

    let mut diagnostics = Diagnostics::new();
    let index = match &args.index {
        Some(path) => match read_tag_index(path, &mut diagnostics) {
            Ok(index) => Some(index),
            Err(e) => {
                if !diagnostics.is_empty() {
                    eprint!("{}", diagnostics.render_colored(args.color));
                }
                eprintln!("error: invalid index {}: {e}", path.display());
                return Exit::InvalidArgument;
            }
        },
        None => None,
    };

    let mut parameters = BuildParameters::new(engine)
        .tags_directories(args.tags.iter().cloned())
        .maps_directory(args.maps.clone())
        .raw_data_handling(args.raw_data_handling)
        .verbose(!args.quiet)
        .optimize_space(args.optimize)
        .hide_pedantic_warnings(args.hide_pedantic_warnings);
    if let Some(compress) = args.compress {
        parameters = parameters.compress(compress);
    }
    if let Some(crc) = forge_crc {
        parameters = parameters.forge_crc(crc);
    }
    if let Some(index) = index {
        parameters = parameters.index(index);
    }
    if let Some(name) = &args.rename_scenario {
        parameters = parameters.rename_scenario(name.clone());
    }

    let result = compile_map(&scenario, &parameters, &mut diagnostics);
    if !diagnostics.is_empty() && (!args.quiet || diagnostics.has_errors()) {
        eprint!("{}", diagnostics.render_colored(args.color));
    }
    let built = match result {
        Ok(built) => built,
        Err(e) => {
            eprintln!("error: failed to compile the map: {e}");
            return Exit::Failed;
        }
    };

    let map_name = built.report.scenario_name.as_str();
    if forge_crc.is_none() && engine == Engine::CustomEdition && stock_crc(map_name).is_some() {
        info!(scenario = map_name, "used built-in CRC32");
    }

    let output = match &args.output {
        Some(path) => {
            if !args.quiet {
                for warning in output_warnings(path, map_name) {
                    eprintln!("warning: {warning}");
                }
            }
            path.clone()
        }
        None => args.maps.join(format!("{map_name}.{MAP_EXTENSION}")),
    };

    if let Err(e) = std::fs::write(&output, &built.data) {
        eprintln!("error: failed to write {}: {e}", output.display());
        return Exit::FileSaveError;
    }
    info!(path = %output.display(), bytes = built.data.len(), "wrote map");
    Exit::Ok
}

/// Parse a CRC32 given as 1-8 hexadecimal digits.
pub fn parse_crc(text: &str) -> Result<u32, String> {
    if text.is_empty() || text.len() > 8 {
        return Err(format!("{text} (must be 1-8 digits)"));
    }
    if !text.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("{text} (must be hexadecimal)"));
    }
    u32::from_str_radix(text, 16).map_err(|e| format!("{text} ({e})"))
}

/// Problems with an explicit output path that keep the engine from loading
/// the map.
pub fn output_warnings(output: &Path, map_name: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    if output.extension().and_then(|e| e.to_str()) != Some(MAP_EXTENSION) {
        warnings.push(format!(
            "the file extension is not `.{MAP_EXTENSION}`, which the target engine requires"
        ));
    }

    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem != map_name {
        warnings.push(format!(
            "the base name `{stem}` does not match the scenario `{map_name}`; \
             the map will fail to load under this file name"
        ));
        if !stem.chars().any(|c| c.is_uppercase()) {
            warnings.push(format!("did you intend to use --rename-scenario \"{stem}\"?"));
        }
    }

    warnings
}
