//! Export command: telemetry in exporter formats, one-shot or watched.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use relayctl_config::Config;
use relayctl_core::{CollectionResult, Device, Fleet};

use crate::cli::{ExportArgs, ExportCommand, ExportQuery, GlobalOpts};
use crate::commands::select_devices;
use crate::encode;
use crate::error::CliError;
use crate::output;

#[derive(Clone, Copy)]
enum Encoding {
    Prometheus,
    Influx,
}

impl Encoding {
    fn render(self, result: &CollectionResult) -> String {
        let readings: Vec<_> = result.readings().cloned().collect();
        match self {
            Self::Prometheus => encode::prometheus_lines(&readings),
            Self::Influx => encode::influx_lines(&readings, result.collected_at),
        }
    }
}

pub async fn handle(
    args: ExportArgs,
    fleet: &Fleet,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (query, encoding) = match args.command {
        ExportCommand::Prometheus(query) => (query, Encoding::Prometheus),
        ExportCommand::Influx(query) => (query, Encoding::Influx),
    };
    let devices = select_devices(config, &query.devices)?;

    match query.watch {
        None => {
            let cancel = CancellationToken::new();
            let result = fleet.collect_telemetry(&devices, &cancel).await;
            output::print_output(&encoding.render(&result), global.quiet);
        }
        Some(_) => watch(fleet, devices, &query, encoding, global).await,
    }
    Ok(())
}

/// Streamed mode: one encoded block per pass until Ctrl-C.
async fn watch(
    fleet: &Fleet,
    devices: Vec<Device>,
    query: &ExportQuery,
    encoding: Encoding,
    global: &GlobalOpts,
) {
    let interval = query
        .watch
        .map_or(std::time::Duration::from_secs(30), Into::into);

    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel(4);

    let streamer = {
        let fleet = fleet.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            fleet
                .stream_telemetry(&devices, interval, tx, cancel)
                .await;
        })
    };

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    while let Some(result) = rx.recv().await {
        output::print_output(&encoding.render(&result), global.quiet);
    }
    let _ = streamer.await;
}
