//! Command handlers.

pub mod config_cmd;
pub mod devices;
pub mod export;
pub mod status;
pub mod switch_cmd;

use relayctl_config::Config;
use relayctl_core::{Device, Fleet};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(
    command: Command,
    fleet: &Fleet,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        Command::Devices(args) => devices::handle(args, fleet, config, global).await,
        Command::Switch(args) => switch_cmd::handle(args, fleet, config, global).await,
        Command::Status(args) => status::handle(args, fleet, config, global).await,
        Command::Export(args) => export::handle(args, fleet, config, global).await,
        // Handled before a fleet exists; unreachable through main.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Expand a positional device selection against the registry: explicit
/// names in the order given, or every registered device.
pub(crate) fn select_devices(config: &Config, names: &[String]) -> Result<Vec<Device>, CliError> {
    if names.is_empty() {
        return Ok(config.all_devices()?);
    }
    names
        .iter()
        .map(|name| config.device(name).map_err(CliError::from))
        .collect()
}
