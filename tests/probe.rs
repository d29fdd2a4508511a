//! Latency probing against live sockets.

use std::time::Duration;

use uptime_pinger::delivery::DeliveryQueue;
use uptime_pinger::probe::{HttpProbe, LatencyProbe, ProbeError, Scheduler};

mod common;

use common::Reply;

#[tokio::test]
async fn test_any_status_counts_as_reachable() {
    for status in [200, 404, 500] {
        let addr = common::start_programmable_backend(move |_| Reply::Respond(status, String::new())).await;
        let probe = HttpProbe::new(&format!("http://{}/", addr), Duration::from_secs(2)).unwrap();

        assert!(probe.check().await.is_ok(), "status {status}");
    }
}

#[tokio::test]
async fn test_silent_target_times_out() {
    let addr = common::start_programmable_backend(|_| Reply::Hang).await;
    let probe = HttpProbe::new(&format!("http://{}/", addr), Duration::from_millis(100)).unwrap();

    let err = probe.check().await.unwrap_err();
    assert!(matches!(err, ProbeError::Timeout(d) if d == Duration::from_millis(100)));
}

#[tokio::test]
async fn test_unreachable_target_is_request_error() {
    let addr = common::refused_addr().await;
    let probe = HttpProbe::new(&format!("http://{}/", addr), Duration::from_secs(2)).unwrap();

    assert!(matches!(probe.check().await, Err(ProbeError::Request(_))));
}

#[test]
fn test_invalid_url_is_rejected() {
    assert!(matches!(
        HttpProbe::new("not a url", Duration::from_secs(1)),
        Err(ProbeError::Setup(_))
    ));
}

#[tokio::test]
async fn test_tick_submits_measurement() {
    let addr = common::start_programmable_backend(|_| Reply::Respond(200, "hi".into())).await;
    let probe = HttpProbe::new(&format!("http://{}/", addr), Duration::from_secs(2)).unwrap();
    let (queue, mut rx) = DeliveryQueue::unbounded(100);
    let scheduler = Scheduler::new(probe, queue, Duration::from_secs(10));

    let record = scheduler.fire().await.unwrap().expect("probe should succeed");
    assert_eq!(record.ping_id, 1);
    assert_eq!(record.delivery_attempt, 1);
    assert!(record.date > 0);

    let scheduled = rx.recv().await.unwrap();
    assert_eq!(scheduled.item.record, record);
    assert_eq!(scheduled.item.retry_after, 100);
    assert_eq!(scheduler.last_ping_id(), 1);
}

#[tokio::test]
async fn test_failed_probe_submits_nothing() {
    let addr = common::refused_addr().await;
    let probe = HttpProbe::new(&format!("http://{}/", addr), Duration::from_secs(2)).unwrap();
    let (queue, mut rx) = DeliveryQueue::unbounded(100);
    let scheduler = Scheduler::new(probe, queue, Duration::from_secs(10));

    assert!(scheduler.fire().await.unwrap().is_none());
    assert_eq!(scheduler.last_ping_id(), 1);
    assert!(rx.try_recv().is_err());
}
