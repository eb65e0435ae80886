// ── Device identity and connection metadata ──
//
// A `Device` is how a caller addresses one fleet member for the duration
// of an operation: it is immutable while an operation runs and may be
// rebuilt between operations. The generation is optional on purpose --
// an unknown generation is resolved by probing, never guessed silently.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use relayctl_rpc::{Gen1DeviceIdent, Gen2DeviceInfo};

// ── Generation ──────────────────────────────────────────────────────

/// Protocol generation of a device.
///
/// Generation 1 is the older REST/array-indexed dialect; everything at
/// 2 and above speaks the same JSON-RPC dialect and is treated uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    Gen1,
    Gen2,
}

impl Generation {
    /// Collapse a numeric generation as reported by firmware.
    pub fn from_number(n: u8) -> Self {
        if n <= 1 { Self::Gen1 } else { Self::Gen2 }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gen1 => write!(f, "1"),
            Self::Gen2 => write!(f, "2+"),
        }
    }
}

// ── Device ──────────────────────────────────────────────────────────

/// One addressable fleet member.
#[derive(Debug, Clone)]
pub struct Device {
    /// Display name; the key callers use everywhere.
    pub name: String,
    /// Device base URL (e.g. `http://192.168.1.40`).
    pub addr: Url,
    /// Persisted generation, if known. `None` means "probe it".
    pub generation: Option<Generation>,
    /// Free-form platform tag from the registry (e.g. a model family).
    pub platform: Option<String>,
    /// Device password, if the device is protected.
    pub password: Option<SecretString>,
}

impl Device {
    /// Build a device with just a name and address; generation unknown.
    pub fn new(name: impl Into<String>, addr: Url) -> Self {
        Self {
            name: name.into(),
            addr,
            generation: None,
            platform: None,
            password: None,
        }
    }

    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = Some(generation);
        self
    }
}

// ── DeviceInfo ──────────────────────────────────────────────────────

/// Result of the discovery operation (`device_info`), also used as the
/// reachability probe during collection.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub id: Option<String>,
    pub model: Option<String>,
    pub generation: Generation,
    pub firmware: Option<String>,
    pub auth_required: bool,
}

impl From<Gen2DeviceInfo> for DeviceInfo {
    fn from(info: Gen2DeviceInfo) -> Self {
        Self {
            id: info.id,
            model: info.model,
            generation: Generation::from_number(info.generation),
            firmware: info.fw_id,
            auth_required: info.auth_en,
        }
    }
}

impl From<Gen1DeviceIdent> for DeviceInfo {
    fn from(ident: Gen1DeviceIdent) -> Self {
        Self {
            id: ident.mac,
            model: ident.device_type,
            // Absence of the field means generation 1 firmware.
            generation: Generation::from_number(ident.generation.unwrap_or(1)),
            firmware: ident.fw,
            auth_required: ident.auth,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn generation_collapses_two_and_above() {
        assert_eq!(Generation::from_number(1), Generation::Gen1);
        assert_eq!(Generation::from_number(2), Generation::Gen2);
        assert_eq!(Generation::from_number(3), Generation::Gen2);
        assert_eq!(Generation::from_number(0), Generation::Gen1);
    }

    #[test]
    fn gen1_ident_without_gen_field_is_gen1() {
        let ident = Gen1DeviceIdent {
            device_type: Some("SHSW-1".into()),
            mac: Some("A4CF12F45ABC".into()),
            fw: None,
            auth: false,
            generation: None,
        };
        let info = DeviceInfo::from(ident);
        assert_eq!(info.generation, Generation::Gen1);
    }

    #[test]
    fn gen1_ident_reporting_gen2_is_gen2() {
        // Gen2 devices answer the Gen1 identity endpoint too, with an
        // explicit generation field. The probe must believe the field.
        let ident = Gen1DeviceIdent {
            device_type: None,
            mac: None,
            fw: None,
            auth: false,
            generation: Some(2),
        };
        let info = DeviceInfo::from(ident);
        assert_eq!(info.generation, Generation::Gen2);
    }
}
