mod cli;
mod commands;
mod encode;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use relayctl_core::{Fleet, FleetOptions};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands never need a fleet.
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "relayctl", &mut std::io::stdout());
            Ok(())
        }

        // Everything else operates on the fleet.
        cmd => {
            let config = relayctl_config::load_config(cli.global.config.as_deref())?;
            let fleet = build_fleet(&config, &cli.global);

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &fleet, &config, &cli.global).await
        }
    }
}

/// Build a `Fleet` from the loaded config plus CLI flag overrides.
fn build_fleet(config: &relayctl_config::Config, global: &cli::GlobalOpts) -> Fleet {
    let mut options: FleetOptions = config.fleet_options();
    if let Some(timeout) = global.timeout {
        options.timeout = std::time::Duration::from_secs(timeout);
    }
    if let Some(concurrency) = global.concurrency {
        options.concurrency = concurrency;
    }
    options.offline = global.offline;

    let cache_path = commands::config_cmd::component_cache_path(global.config.as_deref());
    let cache = relayctl_config::FileComponentCache::new(cache_path);

    Fleet::builder()
        .options(options)
        .cache(Arc::new(cache))
        .build()
}
