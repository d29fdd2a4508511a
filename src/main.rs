//! Uptime pinger client.
//!
//! ```text
//!   ┌───────────┐  tick   ┌─────────────┐  due item  ┌──────────┐  POST /data  ┌───────────┐
//!   │ scheduler │───────▶│ retry queue │──────────▶│  pinger  │────────────▶│ collector │
//!   └───────────┘         └─────────────┘            └────┬─────┘             └───────────┘
//!         │ GET CHECK_URL        ▲                        │
//!         ▼                      └── backoff (retry) ─────┘
//!      target
//! ```
//!
//! Prints the final delivery counters on SIGINT/SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use uptime_pinger::delivery::{dispatcher, ClientStats, HttpTransport, Pinger};
use uptime_pinger::lifecycle::{signals, startup, Shutdown};
use uptime_pinger::observability::{logging, metrics};
use uptime_pinger::probe::{HttpProbe, Scheduler};
use uptime_pinger::resilience::BackoffPolicy;

#[derive(Parser)]
#[command(name = "uptime-pinger")]
#[command(about = "Measure target latency and report it to the collector", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL whose latency is measured (overrides CHECK_URL).
    #[arg(long)]
    check_url: Option<String>,

    /// Collector ingestion URL (overrides COLLECTOR_URL).
    #[arg(long)]
    collector_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = startup::prepare(cli.config.as_deref(), |config| {
        if let Some(url) = cli.check_url {
            config.probe.check_url = url;
        }
        if let Some(url) = cli.collector_url {
            config.delivery.collector_url = url;
        }
    })?;

    logging::init(&config.observability.log_level);
    tracing::info!("uptime-pinger v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        check_url = %config.probe.check_url,
        collector_url = %config.delivery.collector_url,
        interval_ms = config.probe.interval_ms,
        server_timeout_ms = config.delivery.server_timeout_ms,
        min_retry_ms = config.delivery.min_retry_ms,
        max_retry_ms = config.delivery.max_retry_ms,
        retry_exp = config.delivery.retry_exp,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let shutdown = Shutdown::new();
    signals::install(&shutdown);

    let stats = Arc::new(ClientStats::new());
    let pinger = Arc::new(Pinger::new(
        HttpTransport::from_config(&config.delivery)?,
        BackoffPolicy::from(&config.delivery),
        config.delivery.server_timeout(),
        stats.clone(),
    ));
    let (queue, dispatcher) = dispatcher::channel(pinger);

    let probe_timeout = config
        .probe
        .timeout_ms
        .unwrap_or(config.delivery.server_timeout_ms);
    let probe = HttpProbe::new(&config.probe.check_url, Duration::from_millis(probe_timeout))?;
    let scheduler = Scheduler::new(probe, queue, Duration::from_millis(config.probe.interval_ms));

    let dispatcher_task = tokio::spawn(dispatcher.run(shutdown.subscribe()));
    scheduler.run(shutdown.subscribe()).await;
    dispatcher_task.await?;

    let snapshot = stats.snapshot();
    tracing::info!(
        success = snapshot.success,
        errors = snapshot.errors,
        timeouts = snapshot.timeouts,
        requests = snapshot.requests,
        in_flight = snapshot.in_flight(),
        "Shutdown complete"
    );
    println!("stat: {}", serde_json::to_string(&snapshot)?);

    Ok(())
}
