//! Catalog command handler.

use tabled::Tabled;

use hmiview_core::{ComponentKind, HmiConfig, HmiWorker};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Details")]
    details: String,
}

fn rows(config: &HmiConfig) -> Vec<CatalogRow> {
    let mut rows = Vec::new();
    for (name, mode) in &config.modes {
        let launches = mode
            .launches
            .keys()
            .map(|launch| {
                if mode.default_launch.as_deref() == Some(launch.as_str()) {
                    format!("{launch} (default)")
                } else {
                    launch.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        rows.push(CatalogRow {
            kind: "mode",
            name: name.clone(),
            details: launches,
        });
    }
    for (name, path) in &config.maps {
        rows.push(CatalogRow {
            kind: "map",
            name: name.clone(),
            details: path.display().to_string(),
        });
    }
    for (name, path) in &config.vehicles {
        rows.push(CatalogRow {
            kind: "vehicle",
            name: name.clone(),
            details: path.display().to_string(),
        });
    }
    for (kind, label) in [
        (ComponentKind::Module, "module"),
        (ComponentKind::Hardware, "hardware"),
        (ComponentKind::Tool, "tool"),
    ] {
        for (name, component) in config.components(kind) {
            rows.push(CatalogRow {
                kind: label,
                name: name.clone(),
                details: component
                    .supported_commands
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
    }
    rows
}

fn plain(config: &HmiConfig) -> String {
    let mut lines = Vec::new();
    for (name, mode) in &config.modes {
        lines.push(format!("mode\t{name}"));
        for launch in mode.launches.keys() {
            lines.push(format!("launch\t{name}\t{launch}"));
        }
    }
    lines.extend(config.maps.keys().map(|n| format!("map\t{n}")));
    lines.extend(config.vehicles.keys().map(|n| format!("vehicle\t{n}")));
    for kind in [
        ComponentKind::Module,
        ComponentKind::Hardware,
        ComponentKind::Tool,
    ] {
        lines.extend(config.components(kind).keys().map(|n| format!("{kind}\t{n}")));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(worker: &HmiWorker, global: &GlobalOpts) -> Result<(), CliError> {
    let config = worker.config();
    let out = output::render_single(
        &global.output,
        config.as_ref(),
        |c| output::render_table(&rows(c)),
        plain,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
