// Shared transport configuration for building reqwest::Client instances.
//
// Both generation clients share timeout and credential settings through
// this module. Devices speak plain HTTP on the LAN; the only credential
// is an optional per-device password sent as basic auth (Gen1 uses the
// fixed "admin" username, Gen2 accepts it too).

use std::time::Duration;

use secrecy::SecretString;

/// Username both device generations accept for password-protected access.
pub const DEVICE_USERNAME: &str = "admin";

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    /// Per-device password, if the device has one set.
    pub password: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            password: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("relayctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(crate::error::Error::Transport)
    }
}
