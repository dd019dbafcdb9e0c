//! Clap derive structures for the `hmiview` CLI.
//!
//! Defines the command tree, global flags, and the action syntax accepted
//! by `exec`.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};

use hmiview_core::{Action, DriveEvent, DrivingMode, LaunchFailurePolicy};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hmiview -- drive the HMI mode/launch state machine from a shell
#[derive(Debug, Parser)]
#[command(
    name = "hmiview",
    version,
    about = "Inspect and drive the HMI operating-mode state machine",
    long_about = "Loads an HMI catalog (modes, launches, maps, vehicles, components)\n\
        and applies operator actions to it.\n\n\
        Process launches and vehicle commands are simulated: they are logged,\n\
        never executed.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, env = "HMIVIEW_SETTINGS_FILE", global = true)]
    pub settings: Option<PathBuf>,

    /// Catalog directory (overrides settings)
    #[arg(long, short = 'C', global = true)]
    pub catalog: Option<PathBuf>,

    /// Launch failure policy (overrides settings)
    #[arg(long, global = true)]
    pub launch_failure_policy: Option<PolicyArg>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Policy Enums ────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Status records the requested launch even if it failed to start
    RecordRequested,
    /// A launch that fails to start leaves status unchanged
    RequireSuccess,
}

impl From<PolicyArg> for LaunchFailurePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::RecordRequested => Self::RecordRequested,
            PolicyArg::RequireSuccess => Self::RequireSuccess,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the loaded catalog
    #[command(alias = "cat")]
    Catalog,

    /// Show the initial status record
    Status,

    /// Apply actions in order and print the resulting status
    #[command(alias = "x")]
    Exec(ExecArgs),

    /// Manage runtime settings
    Settings(SettingsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Exec ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Actions, applied left to right.
    ///
    /// change-mode=NAME, change-launch=NAME, change-map=NAME,
    /// change-vehicle=NAME, driving-mode=MODE, setup, reset, auto,
    /// disengage, module=NAME:CMD, hardware=NAME:CMD, tool=NAME:CMD,
    /// event=MESSAGE[#TAG,TAG]
    #[arg(required = true, value_parser = parse_action, value_name = "ACTION")]
    pub actions: Vec<Action>,

    /// Keep going after a rejected or failed action
    #[arg(long, short = 'k')]
    pub keep_going: bool,
}

/// Parse one `exec` action argument.
pub fn parse_action(raw: &str) -> Result<Action, String> {
    let (verb, value) = match raw.split_once('=') {
        Some((verb, value)) => (verb.trim(), Some(value)),
        None => (raw.trim(), None),
    };

    let required = || {
        value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("'{verb}' needs a value: {verb}=..."))
    };

    match verb {
        "change-mode" | "mode" => Ok(Action::ChangeMode(required()?.into())),
        "change-launch" | "launch" => Ok(Action::ChangeLaunch(required()?.into())),
        "change-map" | "map" => Ok(Action::ChangeMap(required()?.into())),
        "change-vehicle" | "vehicle" => Ok(Action::ChangeVehicle(required()?.into())),
        "driving-mode" => {
            let mode: DrivingMode = required()?
                .parse()
                .map_err(|_| format!("unknown driving mode '{}'", value.unwrap_or_default()))?;
            Ok(Action::ChangeDrivingMode(mode))
        }
        "setup" => no_value(verb, value, Action::SetupMode),
        "reset" => no_value(verb, value, Action::ResetMode),
        "auto" => no_value(verb, value, Action::EnterAutoMode),
        "disengage" => no_value(verb, value, Action::Disengage),
        "module" => component_command(required()?).map(|(n, c)| Action::run_module(n, c)),
        "hardware" => component_command(required()?).map(|(n, c)| Action::run_hardware(n, c)),
        "tool" => component_command(required()?).map(|(n, c)| Action::run_tool(n, c)),
        "event" => Ok(drive_event(required()?)),
        other => Err(format!("unknown action '{other}'")),
    }
}

fn no_value(verb: &str, value: Option<&str>, action: Action) -> Result<Action, String> {
    match value {
        None => Ok(action),
        Some(_) => Err(format!("'{verb}' takes no value")),
    }
}

fn component_command(value: &str) -> Result<(&str, &str), String> {
    match value.split_once(':') {
        Some((name, command)) if !name.is_empty() && !command.is_empty() => Ok((name, command)),
        _ => Err(format!("expected NAME:COMMAND, got '{value}'")),
    }
}

/// `message#tag,tag`. The timestamp is taken when the argument is parsed.
fn drive_event(value: &str) -> Action {
    let (message, tags) = match value.rsplit_once('#') {
        Some((message, tags)) => (
            message,
            tags.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect(),
        ),
        None => (value, Vec::new()),
    };
    let timestamp_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    Action::SubmitDriveEvent(DriveEvent::new(timestamp_ms, message, tags))
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Display resolved settings (file + environment + flags)
    Show,

    /// Print the settings file path
    Path,

    /// Write the resolved settings to the settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
