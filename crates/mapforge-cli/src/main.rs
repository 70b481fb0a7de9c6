mod cli;
mod commands;

use std::process::ExitCode;

use cli::{BuildParams, DumpParams, build_cli};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let matches = build_cli().get_matches();

    let quiet = matches
        .subcommand_matches("build")
        .is_some_and(|m| m.get_flag("quiet"));
    init_logging(quiet);

    let exit = match matches.subcommand() {
        Some(("build", m)) => {
            let params = BuildParams::from_matches(m);
            commands::build::run(params.into())
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into())
        }
        _ => unreachable!("clap should have caught this"),
    };
    exit.into()
}

/// Log to stderr; `RUST_LOG` overrides the default level.
fn init_logging(quiet: bool) {
    let default = if quiet { "error" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
