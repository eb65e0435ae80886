// ── Streaming collection ──
//
// Re-runs a full telemetry pass on a fixed timer and forwards each
// pass's result into a caller-supplied sink. Passes never overlap: the
// tick waits for the running pass to finish before re-arming.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::fleet::Fleet;
use crate::model::{CollectionResult, Device};

impl Fleet {
    /// Stream telemetry passes until cancelled or the sink closes.
    ///
    /// The first pass runs immediately; subsequent passes follow the
    /// interval. A pass that overruns the interval delays the next tick
    /// rather than stacking up behind it.
    pub async fn stream_telemetry(
        &self,
        devices: &[Device],
        interval: Duration,
        sink: mpsc::Sender<CollectionResult>,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let result = self.collect_telemetry(devices, &cancel).await;
                    if sink.send(result).await.is_err() {
                        debug!("telemetry sink closed, stopping stream");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::collect::ConcurrencyGate;
    use crate::fleet::FleetOptions;

    fn fleet() -> Fleet {
        Fleet::builder()
            .options(FleetOptions::default())
            .gate(ConcurrencyGate::isolated(2))
            .build()
    }

    #[tokio::test]
    async fn stream_emits_passes_until_cancelled() {
        let fleet = fleet();
        let (tx, mut rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();

        let streamer = {
            let fleet = fleet.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                fleet
                    .stream_telemetry(&[], Duration::from_millis(5), tx, cancel)
                    .await;
            })
        };

        // Two full passes arrive, each a complete (if empty) result.
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(first.reports.is_empty());
        assert!(second.collected_at >= first.collected_at);

        cancel.cancel();
        streamer.await.unwrap();
        // Sender dropped with the streamer.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn stream_stops_when_sink_closes() {
        let fleet = fleet();
        let (tx, rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        drop(rx);
        // With the receiver gone the stream must exit on its own.
        fleet
            .stream_telemetry(&[], Duration::from_millis(5), tx, cancel)
            .await;
    }
}
