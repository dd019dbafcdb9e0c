//! Dry-run collaborators.
//!
//! Nothing is spawned or published: launches and component commands are
//! resolved against the catalog and logged. The transport loops control
//! commands back as chassis telemetry, as if the vehicle honoured every
//! request, so the driving-mode guard behaves as it would on a car.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use hmiview_core::{
    ChassisCallback, ChassisState, CollaboratorError, CommandRunner, ComponentKind,
    ControlCommand, DriveEvent, HmiConfig, LaunchOp, MonitorCallback, Transport,
};

/// Exit code reported for a command the component does not declare.
pub const UNSUPPORTED_COMMAND_EXIT: i32 = 127;

// ── Command runner ──────────────────────────────────────────────────

pub struct DryRunRunner {
    catalog: Arc<HmiConfig>,
}

impl DryRunRunner {
    pub fn new(catalog: Arc<HmiConfig>) -> Self {
        Self { catalog }
    }
}

impl CommandRunner for DryRunRunner {
    fn run_command(
        &self,
        kind: ComponentKind,
        name: &str,
        command: &str,
    ) -> Result<i32, CollaboratorError> {
        let template = self
            .catalog
            .components(kind)
            .get(name)
            .and_then(|c| c.supported_commands.get(command));

        if let Some(template) = template {
            info!(%kind, name, command, shell = %template, "dry run: would execute");
            Ok(0)
        } else {
            warn!(%kind, name, command, "dry run: command not declared for component");
            Ok(UNSUPPORTED_COMMAND_EXIT)
        }
    }

    fn run_launch(&self, op: LaunchOp, launch_name: &str, launch_file: &Path) -> bool {
        if launch_file.is_file() {
            info!(%op, launch = launch_name, file = %launch_file.display(), "dry run: launch");
            true
        } else {
            warn!(%op, launch = launch_name, file = %launch_file.display(), "launch file missing");
            false
        }
    }
}

// ── Transport ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct LoopbackTransport {
    chassis: Mutex<Vec<ChassisCallback>>,
    monitor: Mutex<Vec<MonitorCallback>>,
}

impl Transport for LoopbackTransport {
    fn publish_control_command(&self, command: &ControlCommand) -> Result<(), CollaboratorError> {
        info!(action = %command.action, mode = %command.requested_mode, "dry run: pad message");
        let sample = ChassisState::new(command.requested_mode);
        for callback in self
            .chassis
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            callback(sample.clone());
        }
        Ok(())
    }

    fn publish_drive_event(&self, event: &DriveEvent) -> Result<(), CollaboratorError> {
        info!(
            timestamp_ms = event.timestamp_ms,
            message = %event.message,
            tags = ?event.tags,
            "dry run: drive event"
        );
        Ok(())
    }

    fn subscribe_chassis(&self, callback: ChassisCallback) -> Result<(), CollaboratorError> {
        self.chassis
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
        Ok(())
    }

    fn subscribe_monitor(&self, callback: MonitorCallback) -> Result<(), CollaboratorError> {
        // No monitoring feed in a dry run; keep the callback so the
        // subscription stays valid for the worker's lifetime.
        self.monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
        Ok(())
    }
}
