//! CLI entry point for the GTFS-RT event forwarder.
//!
//! Provides subcommands for running the poll loop, firing a single
//! fetch-and-forward cycle, and inspecting a feed without publishing.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gtfs_rt_forwarder::{
    config::Config,
    event::format_event,
    feed::{extract_updates, parse_feed},
    fetch::{BasicClient, auth::ApiKey, fetch_bytes},
    pipeline::{run_cycle, run_loop},
    publish::Publisher,
    reduce::latest_per_vehicle,
};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gtfs_rt_forwarder")]
#[command(about = "Forwards GTFS-RT vehicle positions to an event ingestion API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed on a fixed interval and forward events
    Run,
    /// Run one fetch-and-forward cycle, then exit
    Once,
    /// Decode a feed from a file or URL and print its events without publishing
    Inspect {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/gtfs_rt_forwarder.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gtfs_rt_forwarder.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let (cfg, feed_client, publisher) = build_forwarder()?;
            run_loop(&cfg, &feed_client, &publisher).await?;
        }
        Commands::Once => {
            let (cfg, feed_client, publisher) = build_forwarder()?;
            run_cycle(&feed_client, &publisher, &cfg.feed_url).await?;
        }
        Commands::Inspect { source } => {
            inspect(&source).await?;
        }
    }

    Ok(())
}

/// Wires the configured feed client and publisher from the environment.
fn build_forwarder() -> Result<(Config, ApiKey<BasicClient>, Arc<Publisher<ApiKey<BasicClient>>>)> {
    let cfg = Config::from_env()?;

    let feed_client = ApiKey::apikey(BasicClient::new()?, &cfg.transport_api_key)?;

    let event_client = ApiKey::new(BasicClient::new()?, "X-Authorization", &cfg.event_api_key)?;
    let publisher = Arc::new(Publisher::new(event_client, &cfg.event_endpoint)?);

    Ok((cfg, feed_client, publisher))
}

/// Loads feed data from a local file path or fetches it over HTTP.
///
/// URL fetches use `TRANSPORT_API_KEY` when set; local files need no key.
#[tracing::instrument(fields(source = %source))]
async fn fetcher(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        match std::env::var("TRANSPORT_API_KEY") {
            Ok(key) => {
                let client = ApiKey::apikey(BasicClient::new()?, &key)?;
                fetch_bytes(&client, source).await?
            }
            Err(_) => {
                let client = BasicClient::new()?;
                fetch_bytes(&client, source).await?
            }
        }
    } else {
        std::fs::read(source).with_context(|| format!("reading feed file '{source}'"))?
    };
    Ok(bytes)
}

/// Decodes, reduces, and prints a feed as the events that would be posted.
async fn inspect(source: &str) -> Result<()> {
    let bytes = fetcher(source).await?;
    let feed = parse_feed(&bytes)?;

    let reduced = latest_per_vehicle(extract_updates(&feed));
    info!(
        entities = feed.entity.len(),
        vehicles = reduced.len(),
        "Feed decoded"
    );

    for update in &reduced {
        let seen = chrono::DateTime::from_timestamp(update.timestamp as i64, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| update.timestamp.to_string());
        info!(
            vehicle_id = %update.vehicle_id,
            label = %update.label,
            seen = %seen,
            "Vehicle"
        );
    }

    let events: Vec<_> = reduced.iter().map(format_event).collect();
    println!("{}", serde_json::to_string_pretty(&events)?);

    Ok(())
}
