//! Command dispatch: bridges CLI args -> worker actions -> output formatting.

pub mod catalog;
pub mod exec;
pub mod settings;
pub mod status;

use hmiview_core::HmiWorker;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a worker-bound command to the appropriate handler.
pub fn dispatch(cmd: Command, worker: &HmiWorker, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Catalog => catalog::handle(worker, global),
        Command::Status => status::handle(worker, global),
        Command::Exec(args) => exec::handle(worker, args, global),
        // Settings and Completions are handled before a worker exists
        Command::Settings(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a catalog and is dispatched earlier".into(),
        )),
    }
}
