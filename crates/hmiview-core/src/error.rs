// ── Core error types ──
//
// Every failure in the engine is a returned value. Validation errors are
// produced strictly before any status mutation; external errors may be
// produced after one (see `LaunchFailurePolicy`).

use std::path::PathBuf;

use thiserror::Error;

use crate::collaborator::{CollaboratorError, LaunchOp};
use crate::config::ComponentKind;
use crate::model::DrivingMode;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum HmiError {
    // ── Validation errors ────────────────────────────────────────────
    #[error("Unknown mode: {name}")]
    UnknownMode { name: String },

    #[error("Unknown launch '{name}' in mode '{mode}'")]
    UnknownLaunch { mode: String, name: String },

    #[error("No mode is active")]
    NoActiveMode,

    #[error("No launch is selected in mode '{mode}'")]
    NoActiveLaunch { mode: String },

    #[error("Unknown map: {name}")]
    UnknownMap { name: String },

    #[error("Unknown vehicle: {name}")]
    UnknownVehicle { name: String },

    #[error("Unknown {kind}: {name}")]
    UnknownComponent { kind: ComponentKind, name: String },

    #[error("Driving mode change to {requested} rejected (chassis reports {observed})")]
    DrivingModeRejected {
        observed: DrivingMode,
        requested: DrivingMode,
    },

    // ── External collaborator errors ─────────────────────────────────
    #[error("Failed to {op} launch '{launch}'")]
    LaunchFailed { launch: String, op: LaunchOp },

    #[error("Publish failed: {message}")]
    Publish { message: String },

    #[error("Subscription failed: {message}")]
    Subscribe { message: String },

    #[error("Command runner failed: {message}")]
    Runner { message: String },

    #[error("Mode changed to {current:?} while selecting launch '{launch}'")]
    Superseded {
        launch: String,
        current: Option<String>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Invalid configuration at {}: {reason}", path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HmiError {
    /// Whether this error was raised by validation, before anything changed.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownMode { .. }
                | Self::UnknownLaunch { .. }
                | Self::NoActiveMode
                | Self::NoActiveLaunch { .. }
                | Self::UnknownMap { .. }
                | Self::UnknownVehicle { .. }
                | Self::UnknownComponent { .. }
                | Self::DrivingModeRejected { .. }
        )
    }

    /// Whether the error names something absent from the catalog.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownMode { .. }
                | Self::UnknownLaunch { .. }
                | Self::UnknownMap { .. }
                | Self::UnknownVehicle { .. }
                | Self::UnknownComponent { .. }
        )
    }

    pub(crate) fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// ── Conversion from collaborator errors ──────────────────────────────

impl From<CollaboratorError> for HmiError {
    fn from(err: CollaboratorError) -> Self {
        match err {
            CollaboratorError::Publish(message) => HmiError::Publish { message },
            CollaboratorError::Subscribe(message) => HmiError::Subscribe { message },
            CollaboratorError::Spawn(message) => HmiError::Runner { message },
        }
    }
}
