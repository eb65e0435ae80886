// ── Core error types ──
//
// User-facing errors from relayctl-core. These are NOT transport-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// Collector failures are deliberately absent: per-device errors during a
// collection pass are data on the `DeviceReport`, never a thrown error.

use thiserror::Error;

use crate::model::ComponentType;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Resolution errors ────────────────────────────────────────────
    #[error("No {component_type} named '{name}' on device '{device}'")]
    ComponentNotFound {
        device: String,
        component_type: ComponentType,
        name: String,
    },

    #[error("Cannot resolve '{device}' by name: no cached components and no live fetch available")]
    NoFetcher { device: String },

    #[error("Could not determine protocol generation for '{device}': {reason}")]
    GenerationResolutionFailed { device: String, reason: String },

    // ── Device errors ────────────────────────────────────────────────
    #[error("Device '{device}' is unreachable: {reason}")]
    DeviceUnreachable { device: String, reason: String },

    #[error("Device '{device}' requires a password or rejected the configured one")]
    AuthRequired { device: String },

    #[error("Device '{device}' answered with an error: {message}")]
    DeviceError { device: String, message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Operation cancelled")]
    Cancelled,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Translate a transport-layer error into a device-attributed core error.
    ///
    /// There is no blanket `From<relayctl_rpc::Error>` on purpose: every
    /// rpc failure must name the device it happened on.
    pub(crate) fn from_rpc(device: &str, err: relayctl_rpc::Error) -> Self {
        if err.is_unreachable() {
            return Self::DeviceUnreachable {
                device: device.to_owned(),
                reason: err.to_string(),
            };
        }
        if err.is_auth() {
            return Self::AuthRequired {
                device: device.to_owned(),
            };
        }
        Self::DeviceError {
            device: device.to_owned(),
            message: err.to_string(),
        }
    }
}
