//! Config file management handlers.

use std::path::Path;

use relayctl_config::{cache_path, config_path, load_config, sample_config, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let override_path = global.config.as_deref();

    match args.command {
        ConfigCommand::Init { force } => {
            let target = override_path.map_or_else(config_path, Path::to_path_buf);
            if target.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: target.display().to_string(),
                });
            }
            let written = save_config(&sample_config(), Some(&target))?;
            output::print_output(
                &format!("wrote starter config to {}", written.display()),
                global.quiet,
            );
        }

        ConfigCommand::Path => {
            let config = override_path.map_or_else(config_path, Path::to_path_buf);
            output::print_output(
                &format!(
                    "config: {}\ncomponent cache: {}",
                    config.display(),
                    component_cache_path(override_path).display()
                ),
                global.quiet,
            );
        }

        ConfigCommand::Show => {
            let config = load_config(override_path)?;
            let rendered = toml::to_string_pretty(&config)
                .map_err(relayctl_config::ConfigError::Serialization)?;
            output::print_output(rendered.trim_end(), global.quiet);
        }
    }
    Ok(())
}

/// The cache lives next to whichever config file is in effect.
pub(crate) fn component_cache_path(override_path: Option<&Path>) -> std::path::PathBuf {
    override_path.map_or_else(cache_path, |p| p.with_file_name("components.toml"))
}
