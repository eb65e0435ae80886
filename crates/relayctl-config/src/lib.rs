//! Shared configuration for the relayctl CLI.
//!
//! TOML device registry, global defaults, credential resolution
//! (env + plaintext), and translation to `relayctl_core` types. The
//! persisted component-name cache lives in [`cache`].

pub mod cache;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use relayctl_core::{DEFAULT_CONCURRENCY, Device, FleetOptions, Generation};

pub use cache::FileComponentCache;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no device named '{name}' in the registry")]
    UnknownDevice { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device registry.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Global cap on simultaneously open device connections.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout: default_timeout(),
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}
fn default_timeout() -> u64 {
    10
}

/// One registered device.
#[derive(Debug, Deserialize, Serialize)]
pub struct DeviceProfile {
    /// Device base URL or bare host (e.g. "http://192.168.1.40" or
    /// "192.168.1.40").
    pub addr: String,

    /// Protocol generation, if known. Absent means "probe it".
    pub generation: Option<u8>,

    /// Free-form platform tag (model family, room, ...).
    pub platform: Option<String>,

    /// Device password (plaintext — prefer password_env).
    pub password: Option<String>,

    /// Environment variable name containing the device password.
    pub password_env: Option<String>,
}

impl DeviceProfile {
    /// Translate a registry entry into a core `Device`.
    pub fn to_device(&self, name: &str) -> Result<Device, ConfigError> {
        let addr_str = if self.addr.contains("://") {
            self.addr.clone()
        } else {
            format!("http://{}", self.addr)
        };
        let addr: url::Url = addr_str.parse().map_err(|_| ConfigError::Validation {
            field: format!("devices.{name}.addr"),
            reason: format!("invalid address '{}'", self.addr),
        })?;

        Ok(Device {
            name: name.to_owned(),
            addr,
            generation: self.generation.map(Generation::from_number),
            platform: self.platform.clone(),
            password: self.resolve_password(),
        })
    }

    /// Resolve the device password: env var first, plaintext second.
    fn resolve_password(&self) -> Option<SecretString> {
        if let Some(ref env_name) = self.password_env {
            if let Ok(value) = std::env::var(env_name) {
                return Some(SecretString::from(value));
            }
        }
        self.password.clone().map(SecretString::from)
    }
}

impl Config {
    /// Look up one registered device by name.
    pub fn device(&self, name: &str) -> Result<Device, ConfigError> {
        self.devices
            .get(name)
            .ok_or_else(|| ConfigError::UnknownDevice {
                name: name.to_owned(),
            })?
            .to_device(name)
    }

    /// All registered devices, in registry (name) order.
    pub fn all_devices(&self) -> Result<Vec<Device>, ConfigError> {
        self.devices
            .iter()
            .map(|(name, profile)| profile.to_device(name))
            .collect()
    }

    /// Translate defaults into core fleet options.
    pub fn fleet_options(&self) -> FleetOptions {
        FleetOptions {
            timeout: Duration::from_secs(self.defaults.timeout),
            concurrency: self.defaults.concurrency,
            ..FleetOptions::default()
        }
    }
}

// ── Config file paths ───────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "relayctl", "relayctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Path of the persisted component-name cache, next to the config file.
pub fn cache_path() -> PathBuf {
    config_path().with_file_name("components.toml")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("relayctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// `path` overrides the canonical location (the CLI's `--config` flag).
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("RELAYCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning defaults if the file doesn't exist.
pub fn load_config_or_default(path: Option<&Path>) -> Config {
    load_config(path).unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path` (or the canonical
/// location).
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(path)
}

/// A starter config with one example device, for `config init`.
pub fn sample_config() -> Config {
    let mut devices = BTreeMap::new();
    devices.insert(
        "living-room-plug".to_owned(),
        DeviceProfile {
            addr: "192.168.1.40".to_owned(),
            generation: Some(2),
            platform: None,
            password: None,
            password_env: None,
        },
    );
    Config {
        defaults: Defaults::default(),
        devices,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bare_host_gets_http_scheme() {
        let profile = DeviceProfile {
            addr: "192.168.1.40".into(),
            generation: Some(1),
            platform: None,
            password: None,
            password_env: None,
        };
        let device = profile.to_device("plug").unwrap();
        assert_eq!(device.addr.as_str(), "http://192.168.1.40/");
        assert_eq!(device.generation, Some(Generation::Gen1));
    }

    #[test]
    fn generation_two_and_above_collapse() {
        let profile = DeviceProfile {
            addr: "http://10.0.0.2".into(),
            generation: Some(3),
            platform: None,
            password: None,
            password_env: None,
        };
        let device = profile.to_device("pro").unwrap();
        assert_eq!(device.generation, Some(Generation::Gen2));
    }

    #[test]
    fn missing_generation_stays_unknown() {
        let profile = DeviceProfile {
            addr: "http://10.0.0.3".into(),
            generation: None,
            platform: None,
            password: None,
            password_env: None,
        };
        assert_eq!(profile.to_device("mystery").unwrap().generation, None);
    }

    #[test]
    fn invalid_addr_is_a_validation_error() {
        let profile = DeviceProfile {
            addr: "http://".into(),
            generation: None,
            platform: None,
            password: None,
            password_env: None,
        };
        let err = profile.to_device("broken").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }), "got: {err}");
    }

    #[test]
    fn registry_round_trips_through_toml() {
        let toml_str = r#"
            [defaults]
            concurrency = 8

            [devices.plug]
            addr = "192.168.1.40"
            generation = 2

            [devices.heater]
            addr = "192.168.1.41"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();

        assert_eq!(config.defaults.concurrency, 8);
        assert_eq!(config.defaults.timeout, 10);
        assert_eq!(config.devices.len(), 2);

        let devices = config.all_devices().unwrap();
        // BTreeMap keeps registry order deterministic (by name).
        assert_eq!(devices[0].name, "heater");
        assert_eq!(devices[1].name, "plug");
    }

    #[test]
    fn unknown_device_lookup_fails() {
        let config = Config::default();
        let err = config.device("nope").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDevice { .. }));
    }
}
