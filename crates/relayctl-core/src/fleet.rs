// ── Fleet facade ──
//
// The main entry point for consumers. Cheaply cloneable via an inner
// Arc. A Fleet owns no device list -- callers pass `Device` records per
// operation -- but it carries everything an operation needs: transport
// settings, the optional component-name cache, generations learned by
// probing, and the global connection gate.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use relayctl_rpc::{Gen1Client, Gen2Client, TransportConfig};

use crate::cache::ComponentCache;
use crate::collect::ConcurrencyGate;
use crate::error::CoreError;
use crate::model::{ComponentType, Device, Generation};
use crate::resolver::{ComponentResolver, ConfigFetcher};

/// Default cap on simultaneously open device connections.
pub const DEFAULT_CONCURRENCY: usize = 5;

// ── Options ─────────────────────────────────────────────────────────

/// Tuning for a [`Fleet`]. Built by the CLI from config + flags --
/// the core never reads config files.
#[derive(Debug, Clone)]
pub struct FleetOptions {
    /// Per-request timeout for device connections.
    pub timeout: std::time::Duration,
    /// Global cap on outstanding device connections.
    pub concurrency: usize,
    /// Skip all live fetches in the resolver (cache-only operation).
    pub offline: bool,
}

impl Default for FleetOptions {
    fn default() -> Self {
        Self {
            timeout: std::time::Duration::from_secs(10),
            concurrency: DEFAULT_CONCURRENCY,
            offline: false,
        }
    }
}

// ── Fleet ───────────────────────────────────────────────────────────

/// Handle over a heterogeneous device fleet.
#[derive(Clone)]
pub struct Fleet {
    pub(crate) inner: Arc<FleetInner>,
}

pub(crate) struct FleetInner {
    pub(crate) options: FleetOptions,
    pub(crate) cache: Option<Arc<dyn ComponentCache>>,
    /// Generations discovered by probing, keyed by device name.
    /// A persisted generation on the `Device` record always wins.
    pub(crate) learned: DashMap<String, Generation>,
    pub(crate) gate: ConcurrencyGate,
}

/// Builder for [`Fleet`].
#[derive(Default)]
pub struct FleetBuilder {
    options: FleetOptions,
    cache: Option<Arc<dyn ComponentCache>>,
    gate: Option<ConcurrencyGate>,
}

impl FleetBuilder {
    pub fn options(mut self, options: FleetOptions) -> Self {
        self.options = options;
        self
    }

    /// Wire in a persisted component-name cache.
    pub fn cache(mut self, cache: Arc<dyn ComponentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the process-wide connection gate. Intended for tests and
    /// embedders that need a private budget.
    pub fn gate(mut self, gate: ConcurrencyGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn build(self) -> Fleet {
        let gate = self
            .gate
            .unwrap_or_else(|| ConcurrencyGate::global(self.options.concurrency));
        Fleet {
            inner: Arc::new(FleetInner {
                options: self.options,
                cache: self.cache,
                learned: DashMap::new(),
                gate,
            }),
        }
    }
}

impl Fleet {
    /// Create a Fleet with default collaborators and the process-wide
    /// connection gate.
    pub fn new(options: FleetOptions) -> Self {
        Self::builder().options(options).build()
    }

    pub fn builder() -> FleetBuilder {
        FleetBuilder::default()
    }

    pub fn options(&self) -> &FleetOptions {
        &self.inner.options
    }

    pub(crate) fn gate(&self) -> &ConcurrencyGate {
        &self.inner.gate
    }

    // ── Client construction ──────────────────────────────────────────

    fn transport_for(&self, device: &Device) -> TransportConfig {
        TransportConfig {
            timeout: self.inner.options.timeout,
            password: device.password.clone(),
        }
    }

    pub(crate) fn gen1_client(&self, device: &Device) -> Result<Gen1Client, CoreError> {
        Gen1Client::new(device.addr.clone(), &self.transport_for(device))
            .map_err(|e| CoreError::from_rpc(&device.name, e))
    }

    pub(crate) fn gen2_client(&self, device: &Device) -> Result<Gen2Client, CoreError> {
        Gen2Client::new(device.addr.clone(), &self.transport_for(device))
            .map_err(|e| CoreError::from_rpc(&device.name, e))
    }

    // ── Component resolution ─────────────────────────────────────────

    /// A resolver wired to this fleet's cache and (unless offline) to a
    /// live config fetch through the dispatcher.
    pub fn resolver(&self) -> ComponentResolver {
        let mut resolver = ComponentResolver::new();
        if let Some(ref cache) = self.inner.cache {
            resolver = resolver.with_cache(Arc::clone(cache));
        }
        if !self.inner.options.offline {
            resolver = resolver.with_fetcher(Arc::new(self.clone()));
        }
        resolver
    }

    /// Resolve a component selector (name or numeric id) to its id.
    pub async fn resolve_component(
        &self,
        device: &Device,
        component_type: ComponentType,
        selector: &str,
    ) -> Result<u32, CoreError> {
        self.resolver()
            .resolve(device, component_type, selector)
            .await
    }

    /// Best-effort resolve: any failure falls back to the supplied id.
    pub async fn resolve_component_or(
        &self,
        device: &Device,
        component_type: ComponentType,
        name: &str,
        fallback: u32,
    ) -> u32 {
        self.resolver()
            .resolve_or(device, component_type, name, fallback)
            .await
    }

    // ── Named-component operations ───────────────────────────────────

    /// Drive a switch on or off, addressing it by name or id.
    pub async fn set_switch(
        &self,
        device: &Device,
        selector: &str,
        on: bool,
    ) -> Result<(), CoreError> {
        let id = self
            .resolve_component(device, ComponentType::Switch, selector)
            .await?;
        let turn = if on { "on" } else { "off" };
        self.dispatch(
            device,
            move |client| async move { client.set_relay(id, turn).await.map(|_| ()) },
            move |client| async move { client.set_switch(id, on).await.map(|_| ()) },
        )
        .await
    }

    /// Toggle a switch, addressing it by name or id.
    pub async fn toggle_switch(&self, device: &Device, selector: &str) -> Result<(), CoreError> {
        let id = self
            .resolve_component(device, ComponentType::Switch, selector)
            .await?;
        self.dispatch(
            device,
            move |client| async move { client.set_relay(id, "toggle").await.map(|_| ()) },
            move |client| async move { client.toggle_switch(id).await.map(|_| ()) },
        )
        .await
    }
}

// The fleet itself is the resolver's live-fetch collaborator: a config
// fetch is just another dispatched operation.
#[async_trait]
impl ConfigFetcher for Fleet {
    async fn fetch_config(&self, device: &Device) -> Result<Value, CoreError> {
        self.fetch_raw_config(device).await
    }
}
