//! Status command: one telemetry pass with a dashboard rollup.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use relayctl_config::Config;
use relayctl_core::{CollectionResult, DeviceReport, Fleet};

use crate::cli::{GlobalOpts, OutputFormat, StatusArgs};
use crate::commands::select_devices;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize, Tabled)]
struct StatusRow {
    device: String,
    state: String,
    #[tabled(rename = "power (W)")]
    power_w: String,
    #[tabled(rename = "energy (Wh)")]
    energy_wh: String,
    samples: usize,
    error: String,
}

impl StatusRow {
    fn from_report(report: &DeviceReport) -> Self {
        Self {
            device: report.device.clone(),
            state: if report.online { "online" } else { "offline" }.to_owned(),
            power_w: format!("{:.1}", report.power_w()),
            energy_wh: format!("{:.1}", report.energy_wh()),
            samples: report.readings.len(),
            error: report.error.clone().unwrap_or_default(),
        }
    }
}

pub async fn handle(
    args: StatusArgs,
    fleet: &Fleet,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let devices = select_devices(config, &args.devices)?;

    let cancel = CancellationToken::new();
    spawn_ctrl_c(cancel.clone());

    let result = fleet.collect_telemetry(&devices, &cancel).await;

    match global.output {
        OutputFormat::Table => {
            let rows: Vec<StatusRow> = result.reports.iter().map(StatusRow::from_report).collect();
            output::print_output(&output::render_table(&rows), global.quiet);
            output::print_output(&summary_line(&result), global.quiet);
        }
        OutputFormat::Json => {
            output::print_output(&output::render_json_pretty(&result), global.quiet);
        }
        OutputFormat::JsonCompact => {
            output::print_output(&output::render_json_compact(&result), global.quiet);
        }
        OutputFormat::Yaml => {
            output::print_output(&output::render_yaml(&result), global.quiet);
        }
        OutputFormat::Plain => {
            let lines: Vec<String> = result
                .reports
                .iter()
                .map(|r| format!("{}\t{}", r.device, if r.online { "online" } else { "offline" }))
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
        }
    }
    Ok(())
}

/// Roll-up footer under the device table.
fn summary_line(result: &CollectionResult) -> String {
    let totals = &result.totals;
    let mut line = format!(
        "{} online, {} offline · {:.1} W total · {:.1} Wh metered",
        totals.online.green().bold(),
        totals.offline.red().bold(),
        totals.power_w,
        totals.energy_wh,
    );
    if let (Some(peak), Some(min)) = (totals.peak_power_w, totals.min_power_w) {
        line.push_str(&format!(" · per-device {min:.1}-{peak:.1} W"));
    }
    line
}

/// Cancel the pass on Ctrl-C; completed entries are still reported.
fn spawn_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
}
