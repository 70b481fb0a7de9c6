pub mod build;
pub mod dump;

#[cfg(test)]
mod build_tests;

use std::process::ExitCode;

/// Process exit status.
///
/// Status 2 (unknown argument) is produced by clap itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    Ok = 0,
    NothingToDo = 1,
    UnhandledArgument = 3,
    FileSaveError = 4,
    Failed = 5,
    InvalidArgument = 6,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}
