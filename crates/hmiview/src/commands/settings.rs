//! Settings subcommand handlers.

use std::path::Path;

use hmiview_config::{Settings, save_settings_to};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand};
use crate::error::CliError;
use crate::output;

pub fn handle(
    args: SettingsArgs,
    settings: &Settings,
    path: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SettingsCommand::Show => {
            let as_toml = toml::to_string_pretty(settings)?;
            let out = output::render_single(
                &global.output,
                settings,
                |_| as_toml.trim_end().to_owned(),
                |s| {
                    format!(
                        "catalog_root={}\nlaunch_failure_policy={}\nlog_filter={}",
                        s.catalog_root.display(),
                        s.launch_failure_policy,
                        s.log_filter.as_deref().unwrap_or_default()
                    )
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SettingsCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        SettingsCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::SettingsExist {
                    path: path.display().to_string(),
                });
            }
            save_settings_to(settings, path)?;
            output::note(
                &format!("Settings written to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}
