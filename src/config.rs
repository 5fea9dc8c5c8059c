//! Runtime configuration, read once from the environment and passed in
//! explicitly. No module holds config state of its own.

use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_FEED_URL: &str = "https://api.transport.nsw.gov.au/v1/gtfs/vehiclepos/ferries";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 300_000;

#[derive(Debug, Clone)]
pub struct Config {
    /// GTFS-RT vehicle-position endpoint to poll.
    pub feed_url: String,
    /// Key for the feed's `Authorization: apikey <key>` scheme.
    pub transport_api_key: String,
    /// Ingestion API endpoint events are posted to.
    pub event_endpoint: String,
    /// Key for the ingestion API's `X-Authorization` header.
    pub event_api_key: String,
    /// Delay between poll cycles; the first cycle runs immediately.
    pub poll_interval: Duration,
}

impl Config {
    /// Reads configuration from the environment (after `dotenvy` has loaded
    /// any `.env` file). Missing required variables are hard errors naming
    /// the variable.
    pub fn from_env() -> Result<Self> {
        let interval_ms = match std::env::var("POLL_INTERVAL_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("POLL_INTERVAL_MS is not a valid duration: '{raw}'"))?,
            Err(_) => DEFAULT_POLL_INTERVAL_MS,
        };

        Ok(Self {
            feed_url: std::env::var("FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string()),
            transport_api_key: required("TRANSPORT_API_KEY")?,
            event_endpoint: required("EVENT_ENDPOINT")?,
            event_api_key: required("EVENT_API_KEY")?,
            poll_interval: Duration::from_millis(interval_ms),
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}
