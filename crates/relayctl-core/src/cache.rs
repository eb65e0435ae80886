// ── Component name cache seam ──
//
// The persisted cache store is owned by the config layer; the core only
// sees this trait. Writes are whole-table replacements -- a writer never
// patches an existing id→name map, which makes last-writer-wins the
// explicit conflict policy between concurrent resolves of one device.

use dashmap::DashMap;

use crate::error::CoreError;
use crate::model::ComponentTable;

/// Read/write access to the per-device component-name cache.
///
/// The contract is best-effort on both sides: reads may be stale and a
/// failed write must never fail the operation that triggered it (the
/// resolver logs and moves on).
pub trait ComponentCache: Send + Sync {
    /// The cached name table for a device, if one exists.
    fn components(&self, device: &str) -> Option<ComponentTable>;

    /// Replace the device's cached table wholesale.
    fn store_components(&self, device: &str, table: &ComponentTable) -> Result<(), CoreError>;
}

/// In-memory cache, used when no persisted store is wired in and as the
/// workhorse of resolver tests.
#[derive(Debug, Default)]
pub struct MemoryComponentCache {
    tables: DashMap<String, ComponentTable>,
}

impl MemoryComponentCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComponentCache for MemoryComponentCache {
    fn components(&self, device: &str) -> Option<ComponentTable> {
        self.tables.get(device).map(|entry| entry.clone())
    }

    fn store_components(&self, device: &str, table: &ComponentTable) -> Result<(), CoreError> {
        self.tables.insert(device.to_owned(), table.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ComponentType;

    #[test]
    fn store_replaces_wholesale() {
        let cache = MemoryComponentCache::new();

        let mut first = ComponentTable::new();
        first.insert(ComponentType::Switch, 0, "Old");
        first.insert(ComponentType::Cover, 0, "Blind");
        cache.store_components("plug", &first).unwrap();

        // Second snapshot no longer has the cover -- it must vanish,
        // not linger from the previous write.
        let mut second = ComponentTable::new();
        second.insert(ComponentType::Switch, 0, "New");
        cache.store_components("plug", &second).unwrap();

        let cached = cache.components("plug").unwrap();
        assert_eq!(cached.lookup(ComponentType::Switch, "new"), Some(0));
        assert_eq!(cached.lookup(ComponentType::Cover, "blind"), None);
    }

    #[test]
    fn unknown_device_reads_none() {
        let cache = MemoryComponentCache::new();
        assert!(cache.components("ghost").is_none());
    }
}
