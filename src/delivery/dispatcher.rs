//! Retry queue and its dispatcher.
//!
//! Every delivery attempt, first or retry, is a queue item tagged with
//! `(pingId, deliveryAttempt, retryAfter)` and a due time. One dispatcher task
//! drains due items and spawns an attempt for each, so sessions progress
//! independently while the backoff policy stays out of the timer mechanics.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Instant};

use crate::delivery::pinger::{Pinger, SessionState};
use crate::delivery::record::PingRecord;
use crate::delivery::transport::Transport;
use crate::resilience::backoff::delay;

/// One pending attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryItem {
    pub record: PingRecord,
    /// Backoff interval this attempt carries into its retry decision.
    pub retry_after: u64,
}

/// A queue item together with the instant it becomes due.
#[derive(Debug, Clone, Copy)]
pub struct Scheduled {
    pub due: Instant,
    pub item: RetryItem,
}

/// Heap entry ordered so the earliest due item (then the earliest enqueued)
/// sits on top.
struct Entry {
    due: Instant,
    seq: u64,
    item: RetryItem,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Producer handle for the retry queue. Cheap to clone.
#[derive(Clone)]
pub struct DeliveryQueue {
    tx: mpsc::UnboundedSender<Scheduled>,
    initial_retry_ms: u64,
}

impl DeliveryQueue {
    /// A queue whose items are read straight off the returned receiver.
    pub fn unbounded(initial_retry_ms: u64) -> (Self, mpsc::UnboundedReceiver<Scheduled>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, initial_retry_ms }, rx)
    }

    /// Start a new session for `record`, due immediately.
    ///
    /// Returns `false` once the dispatcher has stopped.
    pub fn submit(&self, record: PingRecord) -> bool {
        let item = RetryItem {
            record,
            retry_after: self.initial_retry_ms,
        };
        self.schedule(item, Duration::ZERO)
    }

    /// Enqueue `item` to run after `after`.
    pub fn schedule(&self, item: RetryItem, after: Duration) -> bool {
        let scheduled = Scheduled {
            due: Instant::now() + after,
            item,
        };
        self.tx.send(scheduled).is_ok()
    }
}

/// Drains due queue items and runs their attempts.
pub struct Dispatcher<T> {
    pinger: Arc<Pinger<T>>,
    queue: DeliveryQueue,
    rx: mpsc::UnboundedReceiver<Scheduled>,
    heap: BinaryHeap<Entry>,
    seq: u64,
}

/// Create a queue and the dispatcher that serves it.
pub fn channel<T: Transport + 'static>(pinger: Arc<Pinger<T>>) -> (DeliveryQueue, Dispatcher<T>) {
    let (queue, rx) = DeliveryQueue::unbounded(pinger.policy().initial());
    let dispatcher = Dispatcher {
        pinger,
        queue: queue.clone(),
        rx,
        heap: BinaryHeap::new(),
        seq: 0,
    };
    (queue, dispatcher)
}

impl<T: Transport + 'static> Dispatcher<T> {
    /// Run until shutdown. Items still queued at that point are dropped.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Delivery dispatcher starting");

        loop {
            let next_due = self.heap.peek().map(|entry| entry.due);

            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!(pending = self.heap.len(), "Delivery dispatcher received shutdown signal");
                    break;
                }
                msg = self.rx.recv() => match msg {
                    Some(scheduled) => self.push(scheduled),
                    None => break,
                },
                _ = time::sleep_until(next_due.unwrap_or_else(Instant::now)), if next_due.is_some() => {
                    self.release_due();
                }
            }
        }
    }

    fn push(&mut self, scheduled: Scheduled) {
        self.seq += 1;
        self.heap.push(Entry {
            due: scheduled.due,
            seq: self.seq,
            item: scheduled.item,
        });
    }

    fn release_due(&mut self) {
        let now = Instant::now();
        while self.heap.peek().is_some_and(|entry| entry.due <= now) {
            if let Some(entry) = self.heap.pop() {
                self.spawn_attempt(entry.item);
            }
        }
    }

    fn spawn_attempt(&self, item: RetryItem) {
        let pinger = self.pinger.clone();
        let queue = self.queue.clone();

        tokio::spawn(async move {
            let state = pinger.attempt(&item.record, item.retry_after).await;
            if let SessionState::RetryScheduled {
                record,
                retry_after,
            } = state
            {
                let next = RetryItem {
                    record,
                    retry_after,
                };
                if !queue.schedule(next, delay(retry_after)) {
                    tracing::debug!(
                        ping_id = record.ping_id,
                        "Dispatcher stopped, retry dropped"
                    );
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::pinger::tests::{Scripted, ScriptedTransport};
    use crate::delivery::stats::ClientStats;
    use crate::resilience::backoff::BackoffPolicy;

    fn start(
        transport: ScriptedTransport,
        policy: BackoffPolicy,
    ) -> (DeliveryQueue, Arc<Pinger<ScriptedTransport>>, broadcast::Sender<()>) {
        let pinger = Arc::new(Pinger::new(
            transport,
            policy,
            Duration::from_millis(10_000),
            Arc::new(ClientStats::new()),
        ));
        let (queue, dispatcher) = channel(pinger.clone());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        tokio::spawn(dispatcher.run(shutdown_rx));
        (queue, pinger, shutdown_tx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_session_makes_eleven_attempts() {
        let (queue, pinger, shutdown) = start(
            ScriptedTransport::always(Scripted::Reply(500, "")),
            BackoffPolicy::default(),
        );
        let started = Instant::now();
        assert!(queue.submit(PingRecord::new(1, 0, 33)));

        // Total backoff is 200 + 400 + ... + 102400 ms.
        time::sleep(Duration::from_secs(600)).await;

        let seen = pinger_seen(&pinger);
        assert_eq!(seen.len(), 11);

        let attempts: Vec<u32> = seen.iter().map(|(r, _)| r.delivery_attempt).collect();
        assert_eq!(attempts, (1..=11).collect::<Vec<_>>());
        assert!(seen.iter().all(|(r, _)| r.ping_id == 1 && r.response_time == 33));

        let mut offsets = vec![0u64];
        offsets.extend(seen.windows(2).map(|w| (w[1].1 - w[0].1).as_millis() as u64));
        assert_eq!(
            offsets,
            vec![0, 200, 400, 800, 1600, 3200, 6400, 12800, 25600, 51200, 102400]
        );
        assert_eq!(seen[0].1, started);

        let snap = pinger.stats().snapshot();
        assert_eq!(snap.requests, 11);
        assert_eq!(snap.errors, 11);
        assert_eq!(snap.requests, snap.settled());

        let _ = shutdown.send(());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_stops_when_delivered() {
        let (queue, pinger, shutdown) = start(
            ScriptedTransport::new(
                vec![Scripted::Reply(500, ""), Scripted::Refused],
                Scripted::Reply(200, "OK"),
            ),
            BackoffPolicy::default(),
        );
        queue.submit(PingRecord::new(5, 0, 10));

        time::sleep(Duration::from_secs(5)).await;

        let snap = pinger.stats().snapshot();
        assert_eq!(snap.requests, 3);
        assert_eq!((snap.success, snap.errors, snap.timeouts), (1, 1, 1));
        assert_eq!(pinger_seen(&pinger).len(), 3);

        let _ = shutdown.send(());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_run_independently() {
        // Session 1 fails twice while session 2 succeeds straight away.
        let (queue, pinger, shutdown) = start(
            ScriptedTransport::new(
                vec![Scripted::Reply(500, ""), Scripted::Reply(200, "OK")],
                Scripted::Reply(200, "OK"),
            ),
            BackoffPolicy::new(1000, 60_000, 2.0),
        );
        queue.submit(PingRecord::new(1, 0, 10));
        time::sleep(Duration::from_millis(10)).await;
        queue.submit(PingRecord::new(2, 0, 20));

        time::sleep(Duration::from_secs(10)).await;

        let order: Vec<(u64, u32)> = pinger_seen(&pinger)
            .iter()
            .map(|(r, _)| (r.ping_id, r.delivery_attempt))
            .collect();
        assert_eq!(order, vec![(1, 1), (2, 1), (1, 2)]);

        let _ = shutdown.send(());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_retries_dropped_on_shutdown() {
        let (queue, pinger, shutdown) = start(
            ScriptedTransport::always(Scripted::Reply(500, "")),
            BackoffPolicy::default(),
        );
        queue.submit(PingRecord::new(1, 0, 1));
        time::sleep(Duration::from_millis(100)).await;

        let _ = shutdown.send(());
        time::sleep(Duration::from_secs(600)).await;

        assert_eq!(pinger.stats().snapshot().requests, 1);
        assert!(!queue.submit(PingRecord::new(2, 0, 1)));
    }

    fn pinger_seen(pinger: &Pinger<ScriptedTransport>) -> Vec<(PingRecord, Instant)> {
        pinger.transport().seen.lock().unwrap().clone()
    }
}
