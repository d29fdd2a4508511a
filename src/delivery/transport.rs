//! Transport seam between the pinger and the collector.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use url::Url;

use crate::config::DeliveryConfig;
use crate::delivery::record::PingRecord;

/// The literal body the collector sends on acceptance.
pub const ACCEPTED_BODY: &str = "OK";

/// A response that made it back from the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorReply {
    pub status: u16,
    pub body: String,
}

impl CollectorReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Only a 2xx reply whose body is exactly `OK` counts as delivered.
    /// `ok`, `OK ` or a JSON string `"OK"` do not.
    pub fn is_accepted(&self) -> bool {
        (200..300).contains(&self.status) && self.body == ACCEPTED_BODY
    }
}

/// Failures that produce no reply at all.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Connection refused, reset, or otherwise broken.
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport could not be constructed.
    #[error("invalid transport setup: {0}")]
    Setup(String),
}

pub type DeliveryFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CollectorReply, DeliveryError>> + Send + 'a>>;

/// Anything that can hand a record to the collector.
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    fn send<'a>(&'a self, record: &'a PingRecord) -> DeliveryFuture<'a>;
}

/// JSON-over-HTTP transport posting to the collector's ingestion route.
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    /// Build a transport for `config.collector_url`.
    ///
    /// Connections are not pooled: every attempt opens its own, so a dropped
    /// request never poisons the next one.
    pub fn from_config(config: &DeliveryConfig) -> Result<Self, DeliveryError> {
        let url = Url::parse(&config.collector_url)
            .map_err(|e| DeliveryError::Setup(format!("{}: {}", config.collector_url, e)))?;
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
            .map_err(|e| DeliveryError::Setup(e.to_string()))?;
        Ok(Self::new(client, url))
    }
}

impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    fn send<'a>(&'a self, record: &'a PingRecord) -> DeliveryFuture<'a> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.url.clone())
                .json(record)
                .send()
                .await
                .map_err(|e| DeliveryError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            // Once the status line is in, the collector has answered. A body
            // cut short still yields a reply, just never an accepted one.
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(status, error = %e, "Collector reply body truncated");
                    String::new()
                }
            };

            Ok(CollectorReply { status, body })
        })
    }
}
