//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use relayctl_config::ConfigError;
use relayctl_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Devices ──────────────────────────────────────────────────────
    #[error("Device '{name}' is not in the registry")]
    #[diagnostic(
        code(relayctl::unknown_device),
        help("Run: relayctl devices list\nAdd devices under [devices.{name}] in the config file.")
    )]
    UnknownDevice { name: String },

    #[error("Could not reach device '{device}'")]
    #[diagnostic(
        code(relayctl::unreachable),
        help("Check the device address and network.\nReason: {reason}")
    )]
    Unreachable { device: String, reason: String },

    #[error("Device '{device}' requires a password or rejected the configured one")]
    #[diagnostic(
        code(relayctl::auth),
        help("Set password or password_env for this device in the config file.")
    )]
    AuthFailed { device: String },

    #[error("Could not determine the protocol generation of '{device}'")]
    #[diagnostic(
        code(relayctl::generation_unknown),
        help(
            "Both dialect probes failed: {reason}\n\
             If the device is reachable, pin its generation in the config file."
        )
    )]
    GenerationUnknown { device: String, reason: String },

    // ── Components ───────────────────────────────────────────────────
    #[error("No {component_type} named '{name}' on device '{device}'")]
    #[diagnostic(
        code(relayctl::component_not_found),
        help("Component names are matched case-insensitively; a numeric id always works.")
    )]
    ComponentNotFound {
        device: String,
        component_type: String,
        name: String,
    },

    #[error("Cannot resolve '{device}' by name while offline with an empty cache")]
    #[diagnostic(
        code(relayctl::no_fetcher),
        help("Run once without --offline to populate the component cache.")
    )]
    OfflineCacheMiss { device: String },

    // ── Validation / config ──────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(relayctl::validation))]
    Validation { field: String, reason: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(code(relayctl::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(relayctl::config))]
    Config(ConfigError),

    // ── Fallthrough ──────────────────────────────────────────────────
    #[error("Device operation failed: {message}")]
    #[diagnostic(code(relayctl::device_error))]
    Device { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } | Self::GenerationUnknown { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::UnknownDevice { .. } | Self::ComponentNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownDevice { name } => Self::UnknownDevice { name },
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ComponentNotFound {
                device,
                component_type,
                name,
            } => Self::ComponentNotFound {
                device,
                component_type: component_type.to_string(),
                name,
            },

            CoreError::NoFetcher { device } => Self::OfflineCacheMiss { device },

            CoreError::GenerationResolutionFailed { device, reason } => {
                Self::GenerationUnknown { device, reason }
            }

            CoreError::DeviceUnreachable { device, reason } => {
                Self::Unreachable { device, reason }
            }

            CoreError::AuthRequired { device } => Self::AuthFailed { device },

            CoreError::DeviceError { message, .. } => Self::Device { message },

            CoreError::Cancelled => Self::Device {
                message: "operation cancelled".into(),
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::Device { message },
        }
    }
}
