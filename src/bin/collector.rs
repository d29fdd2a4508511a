//! Collector: ingestion endpoint with failure injection.
//!
//! Prints the mean and median of accepted latencies (or `No time data`) on
//! SIGINT/SIGTERM.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use uptime_pinger::collector::aggregate;
use uptime_pinger::http::CollectorServer;
use uptime_pinger::lifecycle::{signals, startup, Shutdown};
use uptime_pinger::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "collector")]
#[command(about = "Ingest ping reports, emulating accept / reject / drop", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides COLLECTOR_ADDR).
    #[arg(short, long)]
    bind: Option<String>,

    /// Fixed RNG seed for reproducible outcome sequences.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = startup::prepare(cli.config.as_deref(), |config| {
        if let Some(bind) = cli.bind {
            config.collector.bind_address = bind;
        }
        if cli.seed.is_some() {
            config.collector.seed = cli.seed;
        }
    })?;

    logging::init(&config.observability.log_level);
    tracing::info!(
        bind_address = %config.collector.bind_address,
        drop_percent = config.collector.drop_percent,
        reject_percent = config.collector.reject_percent,
        median = ?config.collector.median,
        "Collector configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let shutdown = Shutdown::new();
    signals::install(&shutdown);

    let listener = TcpListener::bind(&config.collector.bind_address).await?;
    let server = CollectorServer::new(&config.collector, shutdown);
    let samples = server.samples();
    server.run(listener).await?;

    let summary = aggregate(samples.take().unwrap_or_default(), config.collector.median);
    tracing::info!(summary = ?summary, "Final statistics");
    println!("{}", summary);

    Ok(())
}
