// ── Generation-aware dispatch ──
//
// Routes one logical operation, expressed as a function per dialect, to
// the dialect the device actually speaks. A known generation dispatches
// directly; an unknown one is resolved exactly once per call by the
// discovery probe, then remembered. Probing order is an explicit policy
// function, not inline branching -- it encodes a product decision.

use std::future::Future;

use serde_json::Value;
use tracing::debug;

use relayctl_rpc::{Gen1Client, Gen2Client};

use crate::error::CoreError;
use crate::fleet::Fleet;
use crate::model::{Device, DeviceInfo, Generation};

/// Probe ordering for a device whose generation is not committed.
///
/// A stored-but-possibly-stale hint is tried first (saves a round trip
/// when it is right, the fallback still covers it being wrong). With no
/// hint at all, Gen2 goes first: it is the majority of the deployed
/// population.
pub(crate) fn probe_order(hint: Option<Generation>) -> [Generation; 2] {
    match hint {
        Some(Generation::Gen1) => [Generation::Gen1, Generation::Gen2],
        _ => [Generation::Gen2, Generation::Gen1],
    }
}

impl Fleet {
    /// Best current knowledge of a device's generation: the persisted
    /// value if any, else whatever a previous probe learned.
    pub(crate) fn generation_hint(&self, device: &Device) -> Option<Generation> {
        device
            .generation
            .or_else(|| self.inner.learned.get(&device.name).map(|g| *g))
    }

    /// Execute one operation against a device, choosing the dialect.
    ///
    /// With a known generation the matching function is invoked
    /// directly; the other dialect's function is never called. With an
    /// unknown generation the discovery probe resolves it first -- if
    /// that resolution fails, the error surfaces without attempting
    /// either operation (fail fast rather than guess).
    pub async fn dispatch<T, F1, Fut1, F2, Fut2>(
        &self,
        device: &Device,
        gen1_op: F1,
        gen2_op: F2,
    ) -> Result<T, CoreError>
    where
        F1: FnOnce(Gen1Client) -> Fut1,
        Fut1: Future<Output = Result<T, relayctl_rpc::Error>>,
        F2: FnOnce(Gen2Client) -> Fut2,
        Fut2: Future<Output = Result<T, relayctl_rpc::Error>>,
    {
        let generation = match self.generation_hint(device) {
            Some(generation) => generation,
            None => self.resolve_generation(device).await?,
        };

        match generation {
            Generation::Gen1 => {
                let client = self.gen1_client(device)?;
                gen1_op(client)
                    .await
                    .map_err(|e| CoreError::from_rpc(&device.name, e))
            }
            Generation::Gen2 => {
                let client = self.gen2_client(device)?;
                gen2_op(client)
                    .await
                    .map_err(|e| CoreError::from_rpc(&device.name, e))
            }
        }
    }

    /// Resolve an unknown generation before a generation-committed
    /// operation.
    async fn resolve_generation(&self, device: &Device) -> Result<Generation, CoreError> {
        match self.device_info(device).await {
            Ok(info) => Ok(info.generation),
            Err(e) => Err(CoreError::GenerationResolutionFailed {
                device: device.name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Discovery operation: fetch device identity, tolerating an
    /// unknown generation by probing both dialects in policy order.
    ///
    /// On success the learned generation is remembered for subsequent
    /// dispatches. When both probes fail, the FIRST-tried dialect's
    /// error is returned -- callers want to know why the expected path
    /// failed, not why the fallback did.
    pub async fn device_info(&self, device: &Device) -> Result<DeviceInfo, CoreError> {
        let order = probe_order(self.generation_hint(device));
        let mut first_error: Option<CoreError> = None;

        for generation in order {
            match self.try_device_info(device, generation).await {
                Ok(info) => {
                    self.inner
                        .learned
                        .insert(device.name.clone(), info.generation);
                    return Ok(info);
                }
                Err(e) => {
                    debug!(device = %device.name, %generation, error = %e, "device info probe failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        Err(first_error.unwrap_or_else(|| CoreError::DeviceUnreachable {
            device: device.name.clone(),
            reason: "no probe attempted".into(),
        }))
    }

    async fn try_device_info(
        &self,
        device: &Device,
        generation: Generation,
    ) -> Result<DeviceInfo, CoreError> {
        match generation {
            Generation::Gen1 => self
                .gen1_client(device)?
                .shelly()
                .await
                .map(DeviceInfo::from)
                .map_err(|e| CoreError::from_rpc(&device.name, e)),
            Generation::Gen2 => self
                .gen2_client(device)?
                .get_device_info()
                .await
                .map(DeviceInfo::from)
                .map_err(|e| CoreError::from_rpc(&device.name, e)),
        }
    }

    /// Fetch the raw component configuration for the resolver, probing
    /// dialects in policy order. The caller classifies the returned
    /// document by shape -- which endpoint answered is deliberately not
    /// the source of truth.
    pub(crate) async fn fetch_raw_config(&self, device: &Device) -> Result<Value, CoreError> {
        let order = probe_order(self.generation_hint(device));
        let mut first_error: Option<CoreError> = None;

        for generation in order {
            let attempt = match generation {
                Generation::Gen1 => match self.gen1_client(device) {
                    Ok(client) => client
                        .settings()
                        .await
                        .map_err(|e| CoreError::from_rpc(&device.name, e)),
                    Err(e) => Err(e),
                },
                Generation::Gen2 => match self.gen2_client(device) {
                    Ok(client) => client
                        .get_config()
                        .await
                        .map_err(|e| CoreError::from_rpc(&device.name, e)),
                    Err(e) => Err(e),
                },
            };
            match attempt {
                Ok(raw) => return Ok(raw),
                Err(e) => {
                    debug!(device = %device.name, %generation, error = %e, "config fetch failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        Err(first_error.unwrap_or_else(|| CoreError::DeviceUnreachable {
            device: device.name.clone(),
            reason: "no fetch attempted".into(),
        }))
    }
}
