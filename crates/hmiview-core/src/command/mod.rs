// ── Action API ──
//
// Every operator request flows through a single `Action` enum. The worker
// validates it against the catalog, mutates status, delegates side effects
// and notifies handlers, in that order.

use crate::collaborator::LaunchOp;
use crate::config::ComponentKind;
use crate::model::{DriveEvent, DrivingMode};

/// All requests the worker accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── State transitions ────────────────────────────────────────────
    ChangeMode(String),
    ChangeLaunch(String),
    ChangeMap(String),
    ChangeVehicle(String),
    ChangeDrivingMode(DrivingMode),

    // ── Value-less shortcuts ─────────────────────────────────────────
    /// Start the current launch.
    SetupMode,
    /// Stop the current launch and clear it.
    ResetMode,
    /// Same as `ChangeDrivingMode(CompleteAutoDrive)`.
    EnterAutoMode,
    /// Same as `ChangeDrivingMode(Manual)`.
    Disengage,

    // ── Commands (no state change) ───────────────────────────────────
    RunCommand {
        kind: ComponentKind,
        name: String,
        command: String,
    },
    SubmitDriveEvent(DriveEvent),
}

impl Action {
    pub fn run_module(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::RunCommand {
            kind: ComponentKind::Module,
            name: name.into(),
            command: command.into(),
        }
    }

    pub fn run_hardware(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::RunCommand {
            kind: ComponentKind::Hardware,
            name: name.into(),
            command: command.into(),
        }
    }

    pub fn run_tool(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::RunCommand {
            kind: ComponentKind::Tool,
            name: name.into(),
            command: command.into(),
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChangeMode(_) => "change_mode",
            Self::ChangeLaunch(_) => "change_launch",
            Self::ChangeMap(_) => "change_map",
            Self::ChangeVehicle(_) => "change_vehicle",
            Self::ChangeDrivingMode(_) => "change_driving_mode",
            Self::SetupMode => "setup_mode",
            Self::ResetMode => "reset_mode",
            Self::EnterAutoMode => "enter_auto_mode",
            Self::Disengage => "disengage",
            Self::RunCommand { .. } => "run_command",
            Self::SubmitDriveEvent(_) => "submit_drive_event",
        }
    }
}

/// Outcome of the external launch requests made while applying an action.
/// `None` means the request was not needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchReport {
    pub stopped: Option<bool>,
    pub started: Option<bool>,
}

impl LaunchReport {
    /// No request failed.
    pub fn succeeded(&self) -> bool {
        self.stopped != Some(false) && self.started != Some(false)
    }

    /// The first failed request, if any.
    pub fn failed_op(&self) -> Option<LaunchOp> {
        if self.stopped == Some(false) {
            Some(LaunchOp::Stop)
        } else if self.started == Some(false) {
            Some(LaunchOp::Start)
        } else {
            None
        }
    }
}

/// Result of an accepted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    /// Applied with no external work to report.
    Ok,
    /// Applied; launch requests were made.
    Launch(LaunchReport),
    /// A component command ran and exited with this code.
    ExitCode(i32),
}

impl ActionResult {
    /// Whether the external side effects, if any, succeeded too.
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Ok => true,
            Self::Launch(report) => report.succeeded(),
            Self::ExitCode(code) => *code == 0,
        }
    }
}
