//! CLI error types with miette diagnostics.
//!
//! Maps `HmiError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use hmiview_config::ConfigError;
use hmiview_core::{ComponentKind, HmiError};

/// Process exit codes. Argument errors exit with 2 from clap itself.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const EXTERNAL: i32 = 6;
    pub const CONFIG: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Catalog lookups ──────────────────────────────────────────────
    #[error("{resource_type} '{name}' not found{scope}")]
    #[diagnostic(
        code(hmiview::not_found),
        help("Run: hmiview catalog to see what the catalog defines")
    )]
    NotFound {
        resource_type: String,
        name: String,
        /// Empty, or ` in mode '...'` for launches.
        scope: String,
    },

    // ── State machine ────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(hmiview::rejected), help("{help}"))]
    Rejected { message: String, help: String },

    #[error("{message}")]
    #[diagnostic(code(hmiview::external))]
    External { message: String },

    #[error("{count} action(s) completed with failed side effects")]
    #[diagnostic(
        code(hmiview::side_effects_failed),
        help("Status was updated; see the log above for the failed launch or command.")
    )]
    SideEffectsFailed { count: usize },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Catalog at {path} is invalid: {reason}")]
    #[diagnostic(
        code(hmiview::catalog),
        help(
            "A catalog needs a modes/ directory with one subdirectory per mode\n\
             holding *.launch files. Point at it with --catalog or catalog_root."
        )
    )]
    Catalog { path: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(hmiview::settings))]
    Settings(#[from] ConfigError),

    #[error("Settings file already exists at {path}")]
    #[diagnostic(
        code(hmiview::settings_exist),
        help("Use --force to overwrite it.")
    )]
    SettingsExist { path: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(hmiview::json))]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization failed: {0}")]
    #[diagnostic(code(hmiview::toml))]
    Toml(#[from] toml::ser::Error),

    #[error("{0}")]
    #[diagnostic(code(hmiview::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::External { .. } | Self::SideEffectsFailed { .. } => exit_code::EXTERNAL,
            Self::Catalog { .. } | Self::Settings(_) | Self::SettingsExist { .. } => {
                exit_code::CONFIG
            }
            Self::Io(_) | Self::Json(_) | Self::Toml(_) | Self::Internal(_) => exit_code::GENERAL,
        }
    }
}

// ── HmiError → CliError mapping ──────────────────────────────────────

impl From<HmiError> for CliError {
    fn from(err: HmiError) -> Self {
        match err {
            HmiError::UnknownMode { name } => not_found("mode", name),
            HmiError::UnknownLaunch { mode, name } => CliError::NotFound {
                resource_type: "launch".into(),
                name,
                scope: format!(" in mode '{mode}'"),
            },
            HmiError::UnknownMap { name } => not_found("map", name),
            HmiError::UnknownVehicle { name } => not_found("vehicle", name),
            HmiError::UnknownComponent { kind, name } => not_found(component_noun(kind), name),

            e @ HmiError::NoActiveMode => rejected(&e, "Select a mode first: change-mode=NAME"),
            e @ HmiError::NoActiveLaunch { .. } => {
                rejected(&e, "Select a launch first: change-launch=NAME")
            }
            e @ HmiError::DrivingModeRejected { .. } => rejected(
                &e,
                "MANUAL is accepted unless the chassis already reports it.\n\
                 COMPLETE_AUTO_DRIVE is accepted only while the chassis reports MANUAL.",
            ),
            e @ HmiError::Superseded { .. } => {
                rejected(&e, "Another action changed the mode; retry the launch.")
            }

            e @ (HmiError::LaunchFailed { .. }
            | HmiError::Publish { .. }
            | HmiError::Subscribe { .. }
            | HmiError::Runner { .. }) => CliError::External {
                message: e.to_string(),
            },

            HmiError::ConfigInvalid { path, reason } => CliError::Catalog {
                path: path.display().to_string(),
                reason,
            },

            HmiError::Internal(message) => CliError::Internal(message),
        }
    }
}

fn not_found(resource_type: &str, name: String) -> CliError {
    CliError::NotFound {
        resource_type: resource_type.into(),
        name,
        scope: String::new(),
    }
}

fn rejected(err: &HmiError, help: &str) -> CliError {
    CliError::Rejected {
        message: err.to_string(),
        help: help.into(),
    }
}

fn component_noun(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Module => "module",
        ComponentKind::Hardware => "hardware device",
        ComponentKind::Tool => "tool",
    }
}
