//! Collector HTTP server.
//!
//! # Responsibilities
//! - Create the Axum router with the ingestion handler
//! - Wire up middleware (request ID, tracing)
//! - Emulate accept / reject / drop per request
//! - Serve until shutdown, then release parked (dropped) requests

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::collector::outcome::{FailureInjector, Outcome};
use crate::collector::samples::SampleSet;
use crate::config::CollectorConfig;
use crate::delivery::transport::ACCEPTED_BODY;
use crate::http::request::{request_id, response_time};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// State injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub samples: Arc<SampleSet>,
    pub injector: Arc<FailureInjector>,
    pub shutdown: Shutdown,
}

/// The ingestion endpoint.
pub struct CollectorServer {
    router: Router,
    samples: Arc<SampleSet>,
    shutdown: Shutdown,
}

impl CollectorServer {
    /// Create a collector with a fresh sample set.
    pub fn new(config: &CollectorConfig, shutdown: Shutdown) -> Self {
        Self::with_injector(FailureInjector::from_config(config), shutdown)
    }

    pub fn with_injector(injector: FailureInjector, shutdown: Shutdown) -> Self {
        let samples = Arc::new(SampleSet::new());
        let state = AppState {
            samples: samples.clone(),
            injector: Arc::new(injector),
            shutdown: shutdown.clone(),
        };

        Self {
            router: Self::build_router(state),
            samples,
            shutdown,
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/data", post(ingest_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Handle to the samples; keep it to aggregate after [`run`](Self::run).
    pub fn samples(&self) -> Arc<SampleSet> {
        self.samples.clone()
    }

    /// Serve on `listener` until the shutdown coordinator fires.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Collector listening");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!(samples = self.samples.len(), "Collector stopped");
        Ok(())
    }
}

/// `POST /data`.
async fn ingest_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let outcome = state.injector.draw();
    metrics::record_collector_outcome(outcome.as_str());
    let request_id = request_id(&headers);

    match outcome {
        Outcome::Accept => {
            let payload = String::from_utf8_lossy(&body);
            let recorded = response_time(&body)
                .map(|ms| state.samples.record(ms))
                .unwrap_or(false);
            tracing::info!(request_id = %request_id, payload = %payload, recorded, "Request accepted");
            (StatusCode::OK, ACCEPTED_BODY).into_response()
        }
        Outcome::Reject => {
            tracing::debug!(request_id = %request_id, "Request rejected");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Outcome::Drop => {
            tracing::debug!(request_id = %request_id, "Request dropped");
            // Never answer; the caller's deadline detects this. Parked handlers
            // are released at shutdown so the server can drain.
            state.shutdown.wait().await;
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
