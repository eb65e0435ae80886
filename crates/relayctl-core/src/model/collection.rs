// ── Collection pass results ──
//
// A `CollectionResult` is built once per pass: populated by the
// collector's workers, summarized after the last worker reports, and
// never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Reading;

// ── DeviceReport ────────────────────────────────────────────────────

/// Outcome of one device's work within a collection pass.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub device: String,
    /// `false` only when the device produced nothing AND the
    /// reachability probe failed (or the pass was cancelled first).
    pub online: bool,
    /// Per-device failure, surfaced as data -- never thrown.
    pub error: Option<String>,
    pub readings: Vec<Reading>,
}

impl DeviceReport {
    /// Sum of reported power over this device's readings, watts.
    pub fn power_w(&self) -> f64 {
        self.readings.iter().filter_map(|r| r.power_w).sum()
    }

    /// Sum of reported cumulative energy over this device's readings,
    /// watt-hours.
    pub fn energy_wh(&self) -> f64 {
        self.readings.iter().filter_map(|r| r.energy_wh).sum()
    }
}

// ── Totals ──────────────────────────────────────────────────────────

/// Roll-up aggregates over one pass, computed strictly over devices
/// flagged online. Offline devices contribute zero to sums and are
/// excluded from the peak/min candidate sets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Totals {
    pub power_w: f64,
    pub energy_wh: f64,
    /// Highest per-device power among online devices.
    pub peak_power_w: Option<f64>,
    /// Lowest per-device power among online devices.
    pub min_power_w: Option<f64>,
    pub online: usize,
    pub offline: usize,
}

impl Totals {
    pub(crate) fn from_reports(reports: &[DeviceReport]) -> Self {
        let mut totals = Self::default();
        for report in reports {
            if !report.online {
                totals.offline += 1;
                continue;
            }
            totals.online += 1;
            let power = report.power_w();
            totals.power_w += power;
            totals.energy_wh += report.energy_wh();
            totals.peak_power_w = Some(totals.peak_power_w.map_or(power, |p| p.max(power)));
            totals.min_power_w = Some(totals.min_power_w.map_or(power, |p| p.min(power)));
        }
        totals
    }
}

// ── CollectionResult ────────────────────────────────────────────────

/// Aggregate result of one collection pass over a device set.
///
/// `reports` preserves the input device order regardless of worker
/// completion order.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionResult {
    pub reports: Vec<DeviceReport>,
    pub totals: Totals,
    pub collected_at: DateTime<Utc>,
}

impl CollectionResult {
    pub(crate) fn new(reports: Vec<DeviceReport>) -> Self {
        let totals = Totals::from_reports(&reports);
        Self {
            reports,
            totals,
            collected_at: Utc::now(),
        }
    }

    /// All readings across online devices, in report order.
    pub fn readings(&self) -> impl Iterator<Item = &Reading> {
        self.reports.iter().flat_map(|r| r.readings.iter())
    }
}
