// ── External collaborators ──
//
// The engine never spawns processes or talks to a message bus itself.
// Side effects are delegated through these traits; implementations live
// with the process backend and the transport.

use std::path::Path;

use strum::Display;
use thiserror::Error;

use crate::config::ComponentKind;
use crate::model::{ChassisState, ComponentStatusUpdate, ControlCommand, DriveEvent};

/// Failure reported by a collaborator.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("{0}")]
    Publish(String),

    #[error("{0}")]
    Subscribe(String),

    #[error("{0}")]
    Spawn(String),
}

/// Direction of a launch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LaunchOp {
    Start,
    Stop,
}

/// Process backend: runs component commands and starts/stops launches.
///
/// Calls block for the duration of the command. The engine imposes no
/// timeout.
pub trait CommandRunner: Send + Sync {
    /// Run `command` for the named component, returning its exit code.
    ///
    /// `Err` means the command could not be run at all; a command that ran
    /// and failed reports a non-zero code instead.
    fn run_command(
        &self,
        kind: ComponentKind,
        name: &str,
        command: &str,
    ) -> Result<i32, CollaboratorError>;

    /// Start or stop a launch file. Returns whether the request succeeded.
    fn run_launch(&self, op: LaunchOp, launch_name: &str, launch_file: &Path) -> bool;
}

/// Callback invoked for every chassis telemetry sample.
pub type ChassisCallback = Box<dyn Fn(ChassisState) + Send + Sync>;

/// Callback invoked for every monitoring report.
pub type MonitorCallback = Box<dyn Fn(ComponentStatusUpdate) + Send + Sync>;

/// Publish/subscribe transport.
pub trait Transport: Send + Sync {
    fn publish_control_command(&self, command: &ControlCommand) -> Result<(), CollaboratorError>;

    fn publish_drive_event(&self, event: &DriveEvent) -> Result<(), CollaboratorError>;

    /// Register the sole source of observed chassis state.
    fn subscribe_chassis(&self, callback: ChassisCallback) -> Result<(), CollaboratorError>;

    /// Register for periodic component health reports.
    fn subscribe_monitor(&self, callback: MonitorCallback) -> Result<(), CollaboratorError>;
}
