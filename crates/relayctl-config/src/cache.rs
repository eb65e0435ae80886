//! Persisted component-name cache.
//!
//! A small TOML document next to the config file, holding each device's
//! last-fetched `type → { id → name }` snapshot. The store is
//! best-effort on both sides: a missing or corrupt file reads as empty,
//! and write failures are reported but never block a resolve.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use relayctl_core::{ComponentCache, ComponentTable, ComponentType, CoreError};

/// On-disk document shape. TOML wants string keys, so ids are stored as
/// decimal strings and converted at the boundary.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheDocument {
    #[serde(default)]
    devices: BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>,
}

/// File-backed [`ComponentCache`] implementation.
#[derive(Debug, Clone)]
pub struct FileComponentCache {
    path: PathBuf,
}

impl FileComponentCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_document(&self) -> CacheDocument {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return CacheDocument::default();
        };
        match toml::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "component cache unreadable, treating as empty");
                CacheDocument::default()
            }
        }
    }

    fn write_document(&self, doc: &CacheDocument) -> Result<(), CoreError> {
        let rendered = toml::to_string_pretty(doc).map_err(|e| CoreError::Internal(format!(
            "component cache serialization failed: {e}"
        )))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(&self.path, rendered).map_err(io_error)
    }
}

fn io_error(e: std::io::Error) -> CoreError {
    CoreError::Internal(format!("component cache write failed: {e}"))
}

fn decode(entries: &BTreeMap<String, BTreeMap<String, String>>) -> ComponentTable {
    let mut table = ComponentTable::new();
    for (type_key, names) in entries {
        let Ok(component_type) = ComponentType::from_str(type_key) else {
            continue;
        };
        for (id_key, name) in names {
            if let Ok(id) = id_key.parse::<u32>() {
                table.insert(component_type, id, name.clone());
            }
        }
    }
    table
}

fn encode(table: &ComponentTable) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut entries: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for (component_type, names) in table.iter() {
        let slot = entries.entry(component_type.to_string()).or_default();
        for (id, name) in names {
            slot.insert(id.to_string(), name.clone());
        }
    }
    entries
}

impl ComponentCache for FileComponentCache {
    fn components(&self, device: &str) -> Option<ComponentTable> {
        let doc = self.read_document();
        doc.devices.get(device).map(decode)
    }

    fn store_components(&self, device: &str, table: &ComponentTable) -> Result<(), CoreError> {
        // Whole-snapshot replacement per device: the resolver always
        // hands over the complete extracted table, so stale names for
        // components that no longer exist cannot linger.
        let mut doc = self.read_document();
        doc.devices.insert(device.to_owned(), encode(table));
        self.write_document(&doc)
    }
}
