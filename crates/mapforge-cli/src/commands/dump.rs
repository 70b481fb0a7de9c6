use std::path::PathBuf;

use mapforge_core::Colors;
use mapforge_format::{CacheFile, dump};

use super::Exit;

pub struct DumpArgs {
    pub map: PathBuf,
    pub color: bool,
}

pub fn run(args: DumpArgs) -> Exit {
    let file = match CacheFile::from_path(&args.map) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("error: {}: {e}", args.map.display());
            return Exit::Failed;
        }
    };

    print!("{}", dump(&file, Colors::new(args.color)));
    Exit::Ok
}
