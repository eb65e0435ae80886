// ── Concurrent telemetry collector ──
//
// Fans one operation out over a device set under the global connection
// cap. Workers write their outcome into a pre-sized, index-addressed
// slot: output order always equals input order, no result-list mutex,
// and one device's failure is that device's data -- never a pass-wide
// error. The rollup step runs strictly after the last worker reports.

use std::sync::{Arc, OnceLock};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::fleet::Fleet;
use crate::model::{CollectionResult, Device, DeviceReport, Reading};
use crate::normalize;

// ── Concurrency gate ────────────────────────────────────────────────

static GLOBAL_GATE: OnceLock<Arc<Semaphore>> = OnceLock::new();

/// Cap on simultaneously outstanding device connections.
///
/// The global gate is one process-wide semaphore: multiple simultaneous
/// collections through any number of [`Fleet`] handles still share one
/// budget. The first initializer's limit wins for the process lifetime.
/// `isolated` exists for tests and embedders that want a private budget.
#[derive(Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyGate {
    /// The process-wide gate. Panics on a zero limit -- that is a
    /// programmer error and must fail before any worker starts.
    pub fn global(limit: usize) -> Self {
        assert!(limit > 0, "connection concurrency limit must be at least 1");
        Self {
            semaphore: Arc::clone(GLOBAL_GATE.get_or_init(|| Arc::new(Semaphore::new(limit)))),
        }
    }

    /// A private gate, not shared with the rest of the process.
    pub fn isolated(limit: usize) -> Self {
        assert!(limit > 0, "connection concurrency limit must be at least 1");
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
        }
    }

    pub(crate) async fn acquire(&self) -> OwnedSemaphorePermit {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("concurrency gate semaphore closed")
    }
}

// ── Collection ──────────────────────────────────────────────────────

impl Fleet {
    /// Run `work` once per device under the concurrency gate and merge
    /// the outcomes into one [`CollectionResult`].
    ///
    /// The pass blocks until every device has reported. Cancellation
    /// stops in-flight workers with a cancellation-flavored per-device
    /// error; entries already completed are preserved.
    pub async fn collect<F, Fut>(
        &self,
        devices: &[Device],
        cancel: &CancellationToken,
        work: F,
    ) -> CollectionResult
    where
        F: Fn(Fleet, Device) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<Vec<Reading>, CoreError>> + Send + 'static,
    {
        let mut slots: Vec<Option<DeviceReport>> = Vec::with_capacity(devices.len());
        slots.resize_with(devices.len(), || None);

        let mut workers = JoinSet::new();
        for (index, device) in devices.iter().cloned().enumerate() {
            let fleet = self.clone();
            let cancel = cancel.clone();
            let work = work.clone();
            workers.spawn(async move { (index, device_pass(fleet, device, cancel, work).await) });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, report)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(report);
                    }
                }
                Err(e) => warn!(error = %e, "collection worker aborted"),
            }
        }

        let reports = devices
            .iter()
            .zip(slots)
            .map(|(device, slot)| {
                slot.unwrap_or_else(|| DeviceReport {
                    device: device.name.clone(),
                    online: false,
                    error: Some("collection worker aborted".into()),
                    readings: Vec::new(),
                })
            })
            .collect();

        CollectionResult::new(reports)
    }

    /// Standard telemetry pass: fetch every device's status, normalize
    /// all meter samples it contains.
    pub async fn collect_telemetry(
        &self,
        devices: &[Device],
        cancel: &CancellationToken,
    ) -> CollectionResult {
        self.collect(devices, cancel, |fleet, device| async move {
            let raw = fleet
                .dispatch(
                    &device,
                    |client| async move { client.status().await },
                    |client| async move { client.get_status().await },
                )
                .await?;
            Ok(normalize::readings_from_status(&device.name, &raw))
        })
        .await
    }
}

// ── Per-device worker ───────────────────────────────────────────────

async fn device_pass<F, Fut>(
    fleet: Fleet,
    device: Device,
    cancel: CancellationToken,
    work: F,
) -> DeviceReport
where
    F: Fn(Fleet, Device) -> Fut,
    Fut: Future<Output = Result<Vec<Reading>, CoreError>>,
{
    // Respect cancellation while queued behind the gate.
    let _permit = tokio::select! {
        biased;
        () = cancel.cancelled() => return cancelled_report(&device.name),
        permit = fleet.gate().acquire() => permit,
    };

    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => return cancelled_report(&device.name),
        outcome = work(fleet.clone(), device.clone()) => outcome,
    };

    match outcome {
        Ok(readings) if !readings.is_empty() => DeviceReport {
            device: device.name,
            online: true,
            error: None,
            readings,
        },
        // Zero readings is not offline by itself: a reachable device
        // may simply have no meters. Only a failed probe flips the flag.
        Ok(_) => probe_then_report(&fleet, &device, &cancel, None).await,
        Err(e) => probe_then_report(&fleet, &device, &cancel, Some(e.to_string())).await,
    }
}

async fn probe_then_report(
    fleet: &Fleet,
    device: &Device,
    cancel: &CancellationToken,
    work_error: Option<String>,
) -> DeviceReport {
    let probed = tokio::select! {
        biased;
        () = cancel.cancelled() => return cancelled_report(&device.name),
        probed = fleet.device_info(device) => probed,
    };

    match probed {
        Ok(_) => DeviceReport {
            device: device.name.clone(),
            online: true,
            error: work_error,
            readings: Vec::new(),
        },
        Err(probe_error) => {
            debug!(device = %device.name, error = %probe_error, "reachability probe failed");
            DeviceReport {
                device: device.name.clone(),
                online: false,
                // Prefer the work error when there was one; the probe
                // failure is only confirmation.
                error: Some(work_error.unwrap_or_else(|| probe_error.to_string())),
                readings: Vec::new(),
            }
        }
    }
}

fn cancelled_report(device: &str) -> DeviceReport {
    DeviceReport {
        device: device.to_owned(),
        online: false,
        error: Some(CoreError::Cancelled.to_string()),
        readings: Vec::new(),
    }
}
