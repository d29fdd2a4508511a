//! Periodic latency probing.
//!
//! # Responsibilities
//! - Fire a probe every `PING_INTERVAL`
//! - Time the probe and turn it into a `PingRecord`
//! - Hand the record to the delivery queue

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant};

use crate::delivery::dispatcher::DeliveryQueue;
use crate::delivery::record::{epoch_millis, PingRecord};
use crate::observability::metrics;
use crate::probe::target::LatencyProbe;

pub struct Scheduler<P> {
    probe: Arc<P>,
    queue: DeliveryQueue,
    interval: Duration,
    last_ping_id: Arc<AtomicU64>,
}

impl<P: LatencyProbe + 'static> Scheduler<P> {
    pub fn new(probe: P, queue: DeliveryQueue, interval: Duration) -> Self {
        Self {
            probe: Arc::new(probe),
            queue,
            interval,
            last_ping_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The id handed out by the most recent tick (0 before the first).
    pub fn last_ping_id(&self) -> u64 {
        self.last_ping_id.load(Ordering::SeqCst)
    }

    /// Tick until shutdown. The first probe fires immediately.
    ///
    /// Ticks still measuring at shutdown are cancelled.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            target = self.probe.target(),
            "Probe scheduler starting"
        );

        let mut ticker = time::interval(self.interval);
        let mut ticks = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    ticks.spawn(self.next_tick());
                }
                Some(joined) = ticks.join_next() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Probe tick task failed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!(last_ping_id = self.last_ping_id(), "Probe scheduler received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one tick in its own task, so a slow target never delays the timer.
    pub fn fire(&self) -> JoinHandle<Option<PingRecord>> {
        tokio::spawn(self.next_tick())
    }

    fn next_tick(&self) -> impl Future<Output = Option<PingRecord>> + Send + 'static {
        let ping_id = self.last_ping_id.fetch_add(1, Ordering::SeqCst) + 1;
        let probe = self.probe.clone();
        let queue = self.queue.clone();
        async move { tick(probe.as_ref(), &queue, ping_id).await }
    }
}

async fn tick<P: LatencyProbe>(probe: &P, queue: &DeliveryQueue, ping_id: u64) -> Option<PingRecord> {
    let date = epoch_millis();
    let started = Instant::now();

    if let Err(e) = probe.check().await {
        tracing::warn!(ping_id, target = probe.target(), error = %e, "Ping probe failed, skipping tick");
        metrics::record_probe_failure();
        return None;
    }

    let response_time = started.elapsed().as_millis() as u64;
    metrics::record_probe(response_time);

    let record = PingRecord::new(ping_id, date, response_time);
    tracing::debug!(ping_id, response_time, "Probe measured");

    if !queue.submit(record) {
        tracing::warn!(ping_id, "Delivery queue closed, measurement dropped");
    }
    Some(record)
}
