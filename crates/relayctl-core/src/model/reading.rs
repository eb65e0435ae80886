// ── Normalized telemetry sample ──

use serde::Serialize;

use super::ComponentType;

/// One normalized telemetry sample.
///
/// Every scalar field is optional: a `None` means the source meter type
/// does not report that quantity. A `Some(0.0)` always means the source
/// reported exactly zero -- absent is never defaulted to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// Device display name.
    pub device: String,
    /// Source component family.
    pub component: ComponentType,
    /// Component id within (device, type). Readings derived from a
    /// switch's embedded power sensor are offset by
    /// [`SWITCH_POWER_ID_BASE`](crate::normalize::SWITCH_POWER_ID_BASE).
    pub id: u32,
    /// Instantaneous active power, watts.
    pub power_w: Option<f64>,
    /// Voltage, volts.
    pub voltage_v: Option<f64>,
    /// Current, amperes.
    pub current_a: Option<f64>,
    /// Cumulative active energy, watt-hours.
    pub energy_wh: Option<f64>,
}

impl Reading {
    pub fn new(device: impl Into<String>, component: ComponentType, id: u32) -> Self {
        Self {
            device: device.into(),
            component,
            id,
            power_w: None,
            voltage_v: None,
            current_a: None,
            energy_wh: None,
        }
    }

    /// `"{type}:{id}"` display handle for this sample's source.
    pub fn component_key(&self) -> String {
        self.component.key(self.id)
    }
}
