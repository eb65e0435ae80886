// ── Unified domain model ──
//
// Every type in this module is the canonical representation the rest of
// the workspace depends on. Per-generation wire shapes from relayctl-rpc
// are converted into these before any consumer (CLI, exporter) sees them.

pub mod collection;
pub mod component;
pub mod device;
pub mod reading;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use relayctl_core::model::*` gives you everything.

pub use collection::{CollectionResult, DeviceReport, Totals};
pub use component::{ComponentTable, ComponentType};
pub use device::{Device, DeviceInfo, Generation};
pub use reading::Reading;
