//! Clap definitions for the relayctl CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "relayctl",
    version,
    about = "Control and monitor a fleet of networked relay devices",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global options ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Config file path (default: platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Cap on simultaneously open device connections
    #[arg(long, global = true, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Resolve component names from the cache only; never fetch live
    /// configuration
    #[arg(long, global = true)]
    pub offline: bool,

    /// Suppress normal output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Commands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect the device registry and live device identity
    Devices(DevicesArgs),
    /// Drive switch components, addressed by name or id
    Switch(SwitchArgs),
    /// Run one telemetry pass and show the dashboard rollup
    Status(StatusArgs),
    /// Emit telemetry in exporter formats
    Export(ExportArgs),
    /// Manage the configuration file
    Config(ConfigArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── devices ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List registered devices
    List,
    /// Query a device's live identity (probes the generation if unknown)
    Info {
        /// Registered device name
        name: String,
    },
}

// ── switch ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SwitchArgs {
    #[command(subcommand)]
    pub command: SwitchCommand,
}

#[derive(Debug, Subcommand)]
pub enum SwitchCommand {
    /// Turn a switch on
    On(SwitchTarget),
    /// Turn a switch off
    Off(SwitchTarget),
    /// Toggle a switch
    Toggle(SwitchTarget),
}

#[derive(Debug, Args)]
pub struct SwitchTarget {
    /// Registered device name
    pub device: String,

    /// Switch component: a user-assigned name or a numeric id
    #[arg(default_value = "0")]
    pub component: String,
}

// ── status ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Devices to query (default: every registered device)
    pub devices: Vec<String>,
}

// ── export ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub command: ExportCommand,
}

#[derive(Debug, Subcommand)]
pub enum ExportCommand {
    /// Prometheus text exposition format
    Prometheus(ExportQuery),
    /// InfluxDB line protocol
    Influx(ExportQuery),
}

#[derive(Debug, Args)]
pub struct ExportQuery {
    /// Devices to query (default: every registered device)
    pub devices: Vec<String>,

    /// Keep collecting on an interval (e.g. "30s") until interrupted
    #[arg(long, value_name = "DURATION")]
    pub watch: Option<humantime::Duration>,
}

// ── config ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config and cache file paths
    Path,
    /// Print the effective configuration
    Show,
}

// ── completions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
