// ── Component resolver ──
//
// Translates (device, type, name-or-id) into a numeric component id.
// Cache first, live fetch second. The dialect of a fetched configuration
// is classified from its key shape, never from the device's stored
// generation -- the stored value may be stale or absent, the document in
// hand cannot be.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::ComponentCache;
use crate::error::CoreError;
use crate::model::{ComponentTable, ComponentType, Device};

// ── Live-fetch seam ─────────────────────────────────────────────────

/// Fetches a device's full component configuration as raw JSON.
///
/// Implemented by [`Fleet`](crate::Fleet) over the real clients; tests
/// substitute fakes. Absence of a fetcher (offline operation) turns
/// cache misses into [`CoreError::NoFetcher`].
#[async_trait]
pub trait ConfigFetcher: Send + Sync {
    async fn fetch_config(&self, device: &Device) -> Result<Value, CoreError>;
}

// ── Dialect classification ──────────────────────────────────────────

/// Which dialect a raw configuration document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigDialect {
    /// Per-type arrays (`relays`, `lights`, ...); position is the id.
    Gen1,
    /// Map entries keyed `"{type}:{id}"`.
    Gen2,
}

/// Classify a configuration document by key shape.
///
/// The presence of any Gen1 section array is authoritative: Gen2
/// documents never carry those keys.
pub fn classify_config(raw: &Value) -> ConfigDialect {
    let Some(map) = raw.as_object() else {
        return ConfigDialect::Gen2;
    };
    let has_gen1_section = map
        .iter()
        .any(|(key, value)| ComponentType::from_gen1_section(key).is_some() && value.is_array());
    if has_gen1_section {
        ConfigDialect::Gen1
    } else {
        ConfigDialect::Gen2
    }
}

/// Extract every named component from a raw configuration document,
/// whichever dialect it is written in.
pub fn parse_components(raw: &Value) -> ComponentTable {
    match classify_config(raw) {
        ConfigDialect::Gen1 => parse_gen1(raw),
        ConfigDialect::Gen2 => parse_gen2(raw),
    }
}

fn parse_gen2(raw: &Value) -> ComponentTable {
    let mut table = ComponentTable::new();
    let Some(map) = raw.as_object() else {
        return table;
    };
    for (key, value) in map {
        let Some((type_part, id_part)) = key.split_once(':') else {
            continue;
        };
        let (Ok(component_type), Ok(id)) =
            (type_part.parse::<ComponentType>(), id_part.parse::<u32>())
        else {
            continue;
        };
        if let Some(name) = value.get("name").and_then(Value::as_str) {
            table.insert(component_type, id, name);
        }
    }
    table
}

fn parse_gen1(raw: &Value) -> ComponentTable {
    let mut table = ComponentTable::new();
    let Some(map) = raw.as_object() else {
        return table;
    };
    for (section, value) in map {
        let Some(component_type) = ComponentType::from_gen1_section(section) else {
            continue;
        };
        let Some(entries) = value.as_array() else {
            continue;
        };
        for (position, entry) in entries.iter().enumerate() {
            let Ok(id) = u32::try_from(position) else {
                continue;
            };
            if let Some(name) = entry.get("name").and_then(Value::as_str) {
                table.insert(component_type, id, name);
            }
        }
    }
    table
}

// ── Resolver ────────────────────────────────────────────────────────

/// Name/id resolver with offline caching.
#[derive(Default)]
pub struct ComponentResolver {
    cache: Option<Arc<dyn ComponentCache>>,
    fetcher: Option<Arc<dyn ConfigFetcher>>,
}

impl ComponentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(mut self, cache: Arc<dyn ComponentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn ConfigFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Resolve a component selector to its numeric id.
    ///
    /// A numeric selector is returned unchanged without touching the
    /// device -- callers wanting validation must inspect the device
    /// configuration themselves. A name goes through the cache, then a
    /// live fetch; a successful fetch writes every named component back
    /// to the cache (best-effort) so later lookups stay local.
    pub async fn resolve(
        &self,
        device: &Device,
        component_type: ComponentType,
        selector: &str,
    ) -> Result<u32, CoreError> {
        if let Ok(id) = selector.trim().parse::<u32>() {
            return Ok(id);
        }
        let name = selector;

        let mut had_cached_names = false;
        if let Some(ref cache) = self.cache {
            if let Some(table) = cache.components(&device.name) {
                if let Some(id) = table.lookup(component_type, name) {
                    debug!(device = %device.name, %component_type, name, id, "cache hit");
                    return Ok(id);
                }
                had_cached_names = table.names(component_type).is_some_and(|n| !n.is_empty());
            }
        }

        let Some(ref fetcher) = self.fetcher else {
            // Cached names existed but none matched: that is a genuine
            // not-found, not a missing-fetcher condition.
            if had_cached_names {
                return Err(CoreError::ComponentNotFound {
                    device: device.name.clone(),
                    component_type,
                    name: name.to_owned(),
                });
            }
            return Err(CoreError::NoFetcher {
                device: device.name.clone(),
            });
        };

        let raw = fetcher.fetch_config(device).await?;
        let table = parse_components(&raw);

        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.store_components(&device.name, &table) {
                warn!(device = %device.name, error = %e, "component cache write failed (non-fatal)");
            }
        }

        table
            .lookup(component_type, name)
            .ok_or_else(|| CoreError::ComponentNotFound {
                device: device.name.clone(),
                component_type,
                name: name.to_owned(),
            })
    }

    /// Best-effort variant: resolve by name, fall back to the supplied
    /// id on any failure. For call sites that prefer degraded UX over a
    /// hard error.
    pub async fn resolve_or(
        &self,
        device: &Device,
        component_type: ComponentType,
        name: &str,
        fallback: u32,
    ) -> u32 {
        match self.resolve(device, component_type, name).await {
            Ok(id) => id,
            Err(e) => {
                debug!(device = %device.name, %component_type, name, fallback, error = %e,
                    "quiet resolve falling back to supplied id");
                fallback
            }
        }
    }
}
