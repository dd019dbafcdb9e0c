//! Status rendering, shared by `status` and `exec`.

use tabled::Tabled;

use hmiview_core::{HmiWorker, Status};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn fields(status: &Status) -> Vec<(String, String)> {
    let or_dash = |v: Option<&str>| v.unwrap_or("-").to_owned();
    let mut fields = vec![
        ("mode".to_owned(), or_dash(status.current_mode.as_deref())),
        ("launch".to_owned(), or_dash(status.current_launch.as_deref())),
        ("map".to_owned(), or_dash(status.current_map.as_deref())),
        ("vehicle".to_owned(), or_dash(status.current_vehicle.as_deref())),
        ("driving_mode".to_owned(), status.driving_mode.to_string()),
    ];
    fields.extend(
        status
            .components
            .iter()
            .map(|(name, level)| (format!("component.{name}"), level.to_string())),
    );
    fields
}

fn table(status: &Status) -> String {
    let rows: Vec<FieldRow> = fields(status)
        .into_iter()
        .map(|(field, value)| FieldRow { field, value })
        .collect();
    output::render_table(&rows)
}

fn plain(status: &Status) -> String {
    fields(status)
        .into_iter()
        .map(|(field, value)| format!("{field}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print(status: &Status, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, status, table, plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn handle(worker: &HmiWorker, global: &GlobalOpts) -> Result<(), CliError> {
    print(&worker.status(), global)
}
