// relayctl-core: device abstraction and concurrent telemetry layer
// between relayctl-rpc and consumers (CLI, exporters).

pub mod cache;
pub mod collect;
pub mod dispatch;
pub mod error;
pub mod fleet;
pub mod model;
pub mod normalize;
pub mod resolver;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{ComponentCache, MemoryComponentCache};
pub use collect::ConcurrencyGate;
pub use error::CoreError;
pub use fleet::{DEFAULT_CONCURRENCY, Fleet, FleetBuilder, FleetOptions};
pub use normalize::SWITCH_POWER_ID_BASE;
pub use resolver::{ComponentResolver, ConfigDialect, ConfigFetcher};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    CollectionResult, ComponentTable, ComponentType, Device, DeviceInfo, DeviceReport, Generation,
    Reading, Totals,
};
