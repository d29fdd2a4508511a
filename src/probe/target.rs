//! Reachability checks against the external target.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::resilience::timeouts::with_deadline;

/// Why a measurement produced no latency.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("target request failed: {0}")]
    Request(String),

    #[error("target did not answer within {0:?}")]
    Timeout(Duration),

    #[error("invalid probe setup: {0}")]
    Setup(String),
}

pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ProbeError>> + Send + 'a>>;

/// Something whose round trip can be timed. The caller owns the clock.
pub trait LatencyProbe: Send + Sync {
    fn target(&self) -> &str;

    fn check(&self) -> ProbeFuture<'_>;
}

/// GETs a URL and completes when response headers arrive.
///
/// Any HTTP status counts as reachable; only connection failures and
/// timeouts are errors.
pub struct HttpProbe {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(check_url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let url = Url::parse(check_url)
            .map_err(|e| ProbeError::Setup(format!("{}: {}", check_url, e)))?;
        let client = reqwest::Client::builder()
            .user_agent("uptime-pinger")
            .build()
            .map_err(|e| ProbeError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            url,
            timeout,
        })
    }
}

impl LatencyProbe for HttpProbe {
    fn target(&self) -> &str {
        self.url.as_str()
    }

    fn check(&self) -> ProbeFuture<'_> {
        Box::pin(async move {
            let request = self.client.get(self.url.clone()).send();
            match with_deadline(self.timeout, request).await {
                Ok(Ok(response)) => {
                    tracing::debug!(url = %self.url, status = %response.status(), "Target answered");
                    Ok(())
                }
                Ok(Err(e)) => Err(ProbeError::Request(e.to_string())),
                Err(_) => Err(ProbeError::Timeout(self.timeout)),
            }
        })
    }
}
