//! Switch command handlers.

use relayctl_config::Config;
use relayctl_core::Fleet;

use crate::cli::{GlobalOpts, SwitchArgs, SwitchCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    args: SwitchArgs,
    fleet: &Fleet,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (target, action) = match args.command {
        SwitchCommand::On(target) => (target, "on"),
        SwitchCommand::Off(target) => (target, "off"),
        SwitchCommand::Toggle(target) => (target, "toggle"),
    };

    let device = config.device(&target.device)?;
    match action {
        "toggle" => fleet.toggle_switch(&device, &target.component).await?,
        _ => {
            fleet
                .set_switch(&device, &target.component, action == "on")
                .await?;
        }
    }

    output::print_output(
        &format!("{} switch {} -> {action}", target.device, target.component),
        global.quiet,
    );
    Ok(())
}
