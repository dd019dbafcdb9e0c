mod backend;
mod cli;
mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hmiview_config::Settings;
use hmiview_core::{HmiWorker, load_from_dir};

use crate::backend::{DryRunRunner, LoopbackTransport};
use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::{CliError, exit_code};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Dispatch and handle errors with proper exit codes
    let code = match run(cli) {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbosity: u8, configured: Option<&str>) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| configured.map_or_else(|| Ok(EnvFilter::new(fallback)), EnvFilter::try_new))
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Shell completions need nothing else
    if let Command::Completions(args) = &cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        generate(args.shell, &mut cmd, "hmiview", &mut std::io::stdout());
        return Ok(());
    }

    let (settings, settings_path) = resolve_settings(&cli.global)?;
    init_tracing(cli.global.verbose, settings.log_filter.as_deref());

    match cli.command {
        // Settings commands don't need a catalog
        Command::Settings(args) => {
            commands::settings::handle(args, &settings, &settings_path, &cli.global)
        }

        cmd => {
            let worker = build_worker(&settings)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &worker, &cli.global)
        }
    }
}

/// Load settings from file + environment, then apply flag overrides.
fn resolve_settings(global: &GlobalOpts) -> Result<(Settings, PathBuf), CliError> {
    let path = global
        .settings
        .clone()
        .unwrap_or_else(hmiview_config::settings_path);
    let mut settings = hmiview_config::load_settings_from(&path)?;

    if let Some(ref catalog) = global.catalog {
        settings.catalog_root.clone_from(catalog);
    }
    if let Some(policy) = global.launch_failure_policy {
        settings.launch_failure_policy = policy.into();
    }
    settings.validate()?;
    Ok((settings, path))
}

/// Read the catalog and wire a worker to the dry-run collaborators.
fn build_worker(settings: &Settings) -> Result<HmiWorker, CliError> {
    let catalog = Arc::new(load_from_dir(&settings.catalog_root)?);
    tracing::info!(
        root = %settings.catalog_root.display(),
        modes = catalog.modes.len(),
        maps = catalog.maps.len(),
        vehicles = catalog.vehicles.len(),
        "catalog loaded"
    );

    let worker = HmiWorker::new(
        catalog.as_ref().clone(),
        Arc::new(DryRunRunner::new(Arc::clone(&catalog))),
        Arc::new(LoopbackTransport::default()),
        settings.worker_options(),
    );
    worker.attach()?;
    Ok(worker)
}
