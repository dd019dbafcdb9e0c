//! `exec`: apply actions to one worker, then print the resulting status.

use tracing::debug;

use hmiview_core::{Action, ActionResult, HmiWorker};

use crate::cli::{ExecArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::status;

fn describe(action: &Action) -> String {
    match action {
        Action::ChangeMode(v)
        | Action::ChangeLaunch(v)
        | Action::ChangeMap(v)
        | Action::ChangeVehicle(v) => format!("{} {v}", action.label()),
        Action::ChangeDrivingMode(mode) => format!("{} {mode}", action.label()),
        Action::RunCommand {
            kind,
            name,
            command,
        } => format!("{kind} {name}: {command}"),
        Action::SubmitDriveEvent(event) => format!("drive event \"{}\"", event.message),
        Action::SetupMode | Action::ResetMode | Action::EnterAutoMode | Action::Disengage => {
            action.label().to_owned()
        }
    }
}

fn outcome(result: &ActionResult) -> String {
    match result {
        ActionResult::Ok => "ok".into(),
        ActionResult::ExitCode(code) => format!("exit {code}"),
        ActionResult::Launch(report) => match report.failed_op() {
            None => "ok".into(),
            Some(op) => format!("applied, but {op} failed"),
        },
    }
}

pub fn handle(worker: &HmiWorker, args: ExecArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut side_effect_failures = 0;
    let mut first_error: Option<CliError> = None;

    for action in args.actions {
        let what = describe(&action);
        debug!(action = %what, "applying");
        match worker.trigger(action) {
            Ok(result) => {
                if !result.succeeded() {
                    side_effect_failures += 1;
                }
                output::note(&format!("{what}: {}", outcome(&result)), global.quiet);
            }
            Err(err) => {
                let err = CliError::from(err);
                if !args.keep_going {
                    return Err(err);
                }
                output::note(&format!("{what}: {err}"), global.quiet);
                first_error.get_or_insert(err);
            }
        }
    }

    status::print(&worker.status(), global)?;

    if let Some(err) = first_error {
        return Err(err);
    }
    if side_effect_failures > 0 {
        return Err(CliError::SideEffectsFailed {
            count: side_effect_failures,
        });
    }
    Ok(())
}
