// ── Telemetry normalizer ──
//
// Five source meter shapes fold into the single `Reading` model:
// multi-phase energy meters, single-phase energy meters, power meters
// (Gen2 pm1 and the Gen1 basic meter), and power embedded in a switch
// component. A field the source does not report stays `None`; zero in a
// Reading always means the source said zero.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::model::{ComponentType, Reading};
use crate::resolver::{ConfigDialect, classify_config};

/// Id offset for readings taken indirectly from a switch component.
///
/// Keeps switch-embedded power samples from colliding with native meter
/// component ids in the same reading list. The offset is part of the
/// output contract, not an implementation detail.
pub const SWITCH_POWER_ID_BASE: u32 = 100;

// ── Source shapes ───────────────────────────────────────────────────

/// Gen2 multi-phase energy meter (`em:{id}`). Reports phase powers and
/// totals; voltage is per-phase only, so the normalized sample carries
/// none.
#[derive(Debug, Clone, Deserialize)]
pub struct EmStatus {
    #[serde(default)]
    pub id: u32,
    pub a_act_power: Option<f64>,
    pub b_act_power: Option<f64>,
    pub c_act_power: Option<f64>,
    pub total_act_power: f64,
    pub total_current: Option<f64>,
    pub total_act_energy: Option<f64>,
}

/// Single-phase energy meter: Gen2 `em1:{id}`, or a Gen1 `emeters`
/// entry (the field aliases absorb the older spelling).
#[derive(Debug, Clone, Deserialize)]
pub struct Em1Status {
    #[serde(default)]
    pub id: u32,
    #[serde(alias = "power")]
    pub act_power: f64,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    #[serde(alias = "total")]
    pub total_act_energy: Option<f64>,
}

/// Gen2 power meter (`pm1:{id}`).
#[derive(Debug, Clone, Deserialize)]
pub struct PmStatus {
    #[serde(default)]
    pub id: u32,
    pub apower: f64,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub aenergy: Option<EnergyCounter>,
}

/// Gen1 basic meter (`meters` array entry): power plus an optional
/// cumulative counter; no voltage or current.
#[derive(Debug, Clone, Deserialize)]
pub struct BasicMeterStatus {
    pub power: f64,
    /// Cumulative counter in watt-minutes (a Gen1 firmware quirk).
    pub total: Option<f64>,
}

/// Power sensor embedded in a Gen2 switch component (`switch:{id}`).
/// Only present on models with metering hardware.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchPowerStatus {
    #[serde(default)]
    pub id: u32,
    pub apower: Option<f64>,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub aenergy: Option<EnergyCounter>,
}

/// Gen2 cumulative energy sub-object.
#[derive(Debug, Clone, Deserialize)]
pub struct EnergyCounter {
    pub total: f64,
}

// ── Normalization ───────────────────────────────────────────────────

/// One raw meter sample, tagged by source shape.
#[derive(Debug, Clone)]
pub enum MeterStatus {
    MultiPhase(EmStatus),
    SinglePhase(Em1Status),
    PowerMeter(PmStatus),
    BasicMeter { id: u32, status: BasicMeterStatus },
    SwitchPower(SwitchPowerStatus),
}

impl MeterStatus {
    /// Fold this sample into the uniform reading shape.
    pub fn into_reading(self, device: &str) -> Reading {
        match self {
            Self::MultiPhase(em) => Reading {
                power_w: Some(em.total_act_power),
                current_a: em.total_current,
                energy_wh: em.total_act_energy,
                ..Reading::new(device, ComponentType::Em, em.id)
            },
            Self::SinglePhase(em1) => Reading {
                power_w: Some(em1.act_power),
                voltage_v: em1.voltage,
                current_a: em1.current,
                energy_wh: em1.total_act_energy,
                ..Reading::new(device, ComponentType::Em1, em1.id)
            },
            Self::PowerMeter(pm) => Reading {
                power_w: Some(pm.apower),
                voltage_v: pm.voltage,
                current_a: pm.current,
                energy_wh: pm.aenergy.map(|e| e.total),
                ..Reading::new(device, ComponentType::Pm1, pm.id)
            },
            Self::BasicMeter { id, status } => Reading {
                power_w: Some(status.power),
                // Gen1 counts watt-minutes; normalize to watt-hours.
                energy_wh: status.total.map(|wm| wm / 60.0),
                ..Reading::new(device, ComponentType::Pm1, id)
            },
            Self::SwitchPower(sw) => Reading {
                power_w: sw.apower,
                voltage_v: sw.voltage,
                current_a: sw.current,
                energy_wh: sw.aenergy.map(|e| e.total),
                ..Reading::new(device, ComponentType::Switch, sw.id + SWITCH_POWER_ID_BASE)
            },
        }
    }
}

/// Extract and normalize every meter sample from a raw status document.
///
/// The document's dialect is classified the same way configuration is;
/// malformed component entries are skipped with a debug log rather than
/// failing the whole device.
pub fn readings_from_status(device: &str, raw: &Value) -> Vec<Reading> {
    match classify_config(raw) {
        ConfigDialect::Gen1 => gen1_readings(device, raw),
        ConfigDialect::Gen2 => gen2_readings(device, raw),
    }
}

fn gen2_readings(device: &str, raw: &Value) -> Vec<Reading> {
    let mut readings = Vec::new();
    let Some(map) = raw.as_object() else {
        return readings;
    };
    for (key, value) in map {
        let Some((type_part, id_part)) = key.split_once(':') else {
            continue;
        };
        let Ok(id) = id_part.parse::<u32>() else {
            continue;
        };
        let status = match type_part {
            "em" => deserialize_meter(device, key, value, MeterStatus::MultiPhase),
            "em1" => deserialize_meter(device, key, value, MeterStatus::SinglePhase),
            "pm1" => deserialize_meter(device, key, value, MeterStatus::PowerMeter),
            "switch" => {
                deserialize_meter(device, key, value, MeterStatus::SwitchPower).filter(|s| {
                    // A switch without metering hardware reports no
                    // apower; it contributes no reading at all.
                    matches!(s, MeterStatus::SwitchPower(sw) if sw.apower.is_some())
                })
            }
            _ => None,
        };
        if let Some(mut status) = status {
            normalize_id(&mut status, id);
            readings.push(status.into_reading(device));
        }
    }
    readings
}

fn gen1_readings(device: &str, raw: &Value) -> Vec<Reading> {
    let mut readings = Vec::new();
    for section in ["meters", "emeters"] {
        let Some(entries) = raw.get(section).and_then(Value::as_array) else {
            continue;
        };
        for (position, entry) in entries.iter().enumerate() {
            let Ok(id) = u32::try_from(position) else {
                continue;
            };
            let parsed = match section {
                "meters" => serde_json::from_value::<BasicMeterStatus>(entry.clone())
                    .map(|status| MeterStatus::BasicMeter { id, status }),
                _ => serde_json::from_value::<Em1Status>(entry.clone()).map(|mut em1| {
                    em1.id = id;
                    MeterStatus::SinglePhase(em1)
                }),
            };
            match parsed {
                Ok(status) => readings.push(status.into_reading(device)),
                Err(e) => {
                    debug!(device, section, position, error = %e, "skipping malformed meter entry");
                }
            }
        }
    }
    readings
}

/// Deserialize one Gen2 component status, logging and skipping on shape
/// mismatch.
fn deserialize_meter<T: serde::de::DeserializeOwned>(
    device: &str,
    key: &str,
    value: &Value,
    wrap: impl FnOnce(T) -> MeterStatus,
) -> Option<MeterStatus> {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(status) => Some(wrap(status)),
        Err(e) => {
            debug!(device, key, error = %e, "skipping malformed component status");
            None
        }
    }
}

/// The map key's id is authoritative; some firmware omits the embedded
/// `id` field entirely.
fn normalize_id(status: &mut MeterStatus, id: u32) {
    match status {
        MeterStatus::MultiPhase(em) => em.id = id,
        MeterStatus::SinglePhase(em1) => em1.id = id,
        MeterStatus::PowerMeter(pm) => pm.id = id,
        MeterStatus::SwitchPower(sw) => sw.id = id,
        MeterStatus::BasicMeter { id: meter_id, .. } => *meter_id = id,
    }
}
