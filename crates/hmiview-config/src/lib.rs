//! Runtime settings for hmiview.
//!
//! Where the catalog lives, how the worker treats failed launches, and the
//! default log filter. Loaded from a TOML file plus `HMIVIEW_*` environment
//! variables and translated into `hmiview_core::WorkerOptions`. The catalog
//! itself is read by `hmiview_core::load_from_dir`, never here.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hmiview_core::{LaunchFailurePolicy, WorkerOptions};

const SETTINGS_FILE: &str = "hmiview.toml";
const ENV_PREFIX: &str = "HMIVIEW_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize settings: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("settings loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Top-level settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Catalog directory (`modes/`, `maps/`, `vehicles/`, `hmi.toml`).
    #[serde(default = "default_catalog_root")]
    pub catalog_root: PathBuf,

    /// What status records when a launch fails to start.
    #[serde(default)]
    pub launch_failure_policy: LaunchFailurePolicy,

    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_root: default_catalog_root(),
            launch_failure_policy: LaunchFailurePolicy::default(),
            log_filter: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog_root.as_os_str().is_empty() {
            return Err(ConfigError::Validation {
                field: "catalog_root".into(),
                reason: "must not be empty".into(),
            });
        }
        if self
            .log_filter
            .as_deref()
            .is_some_and(|f| f.trim().is_empty())
        {
            return Err(ConfigError::Validation {
                field: "log_filter".into(),
                reason: "must not be blank; omit it instead".into(),
            });
        }
        Ok(())
    }

    pub fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            launch_failure_policy: self.launch_failure_policy,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "hmiview", "hmiview")
}

/// Platform data directory's `catalog/`, or `./catalog` when no home
/// directory can be determined.
pub fn default_catalog_root() -> PathBuf {
    project_dirs().map_or_else(
        || PathBuf::from("catalog"),
        |dirs| dirs.data_dir().join("catalog"),
    )
}

// ── Settings file path ──────────────────────────────────────────────

/// Resolve the settings file path via XDG / platform conventions.
pub fn settings_path() -> PathBuf {
    project_dirs().map_or_else(
        || PathBuf::from(SETTINGS_FILE),
        |dirs| dirs.config_dir().join(SETTINGS_FILE),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load settings from the platform settings file and the environment.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&settings_path())
}

/// Load settings from `path` and the environment. A missing file is not an
/// error; defaults apply.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let settings: Settings = figment_for(path).extract()?;
    settings.validate()?;
    Ok(settings)
}

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

// ── Saving ──────────────────────────────────────────────────────────

/// Write settings to the platform settings file. Returns the path written.
pub fn save_settings(settings: &Settings) -> Result<PathBuf, ConfigError> {
    let path = settings_path();
    save_settings_to(settings, &path)?;
    Ok(path)
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    settings.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(settings)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
