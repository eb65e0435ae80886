//! Device registry and identity command handlers.

use serde::Serialize;
use tabled::Tabled;

use relayctl_config::Config;
use relayctl_core::Fleet;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize, Tabled)]
struct DeviceRow {
    name: String,
    addr: String,
    generation: String,
    platform: String,
}

pub async fn handle(
    args: DevicesArgs,
    fleet: &Fleet,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let rows: Vec<DeviceRow> = config
                .all_devices()?
                .into_iter()
                .map(|d| DeviceRow {
                    name: d.name.clone(),
                    addr: d.addr.to_string(),
                    generation: d
                        .generation
                        .map_or_else(|| "?".to_owned(), |g| g.to_string()),
                    platform: d.platform.unwrap_or_default(),
                })
                .collect();

            let out = output::render_list(global.output, &rows, Clone::clone, |r| r.name.clone());
            output::print_output(&out, global.quiet);
        }

        DevicesCommand::Info { name } => {
            let device = config.device(&name)?;
            let info = fleet.device_info(&device).await?;

            let out = output::render_single(
                global.output,
                &info,
                |info| {
                    format!(
                        "name:       {}\n\
                         id:         {}\n\
                         model:      {}\n\
                         generation: {}\n\
                         firmware:   {}\n\
                         auth:       {}",
                        device.name,
                        info.id.as_deref().unwrap_or("-"),
                        info.model.as_deref().unwrap_or("-"),
                        info.generation,
                        info.firmware.as_deref().unwrap_or("-"),
                        if info.auth_required { "required" } else { "open" },
                    )
                },
                |info| info.id.clone().unwrap_or_else(|| device.name.clone()),
            );
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
