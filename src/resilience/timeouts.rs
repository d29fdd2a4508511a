//! Timeout enforcement.
//!
//! Every outbound call (probe or delivery) runs under a deadline. An elapsed
//! deadline is reported as its own error variant so callers can tell it apart
//! from a transport failure, and the in-flight future is dropped.

use std::future::Future;
use std::time::Duration;

use tokio::time;

/// Marker error for an elapsed deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no response within {0:?}")]
pub struct Elapsed(pub Duration);

/// Run `fut` with a deadline of `limit`.
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    time::timeout(limit, fut).await.map_err(|_| Elapsed(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses() {
        let result = with_deadline(Duration::from_millis(50), std::future::pending::<()>()).await;
        assert_eq!(result, Err(Elapsed(Duration::from_millis(50))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_future_passes_through() {
        let result = with_deadline(Duration::from_secs(1), async {
            time::sleep(Duration::from_millis(10)).await;
            7
        })
        .await;
        assert_eq!(result, Ok(7));
    }
}
