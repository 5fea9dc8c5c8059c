//! One poll cycle, and the interval loop that drives it.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::event::{OutboundEvent, format_event};
use crate::feed::{extract_updates, parse_feed};
use crate::fetch::{HttpClient, fetch_bytes};
use crate::gtfs_rt::FeedMessage;
use crate::publish::{BatchOutcome, Publisher};

/// The pure middle of the pipeline: decoded feed in, formatted events out.
pub fn process(feed: &FeedMessage) -> Vec<OutboundEvent> {
    let updates = extract_updates(feed);
    debug!(
        entities = feed.entity.len(),
        updates = updates.len(),
        "Feed entities projected"
    );

    crate::reduce::latest_per_vehicle(updates)
        .iter()
        .map(format_event)
        .collect()
}

/// Runs one fetch → decode → reduce → format → publish cycle.
///
/// A fetch or decode failure aborts the whole cycle with no partial
/// publishing; per-event publish failures are absorbed into the outcome.
pub async fn run_cycle<F, P>(
    feed_client: &F,
    publisher: &Arc<Publisher<P>>,
    feed_url: &str,
) -> Result<BatchOutcome>
where
    F: HttpClient,
    P: HttpClient + 'static,
{
    let bytes = fetch_bytes(feed_client, feed_url)
        .await
        .context("feed fetch failed")?;
    debug!(bytes = bytes.len(), "Feed bytes received, decoding");

    let feed = parse_feed(&bytes).context("feed decode failed")?;
    if let Some(ts) = feed.header.timestamp
        && let Some(t) = chrono::DateTime::from_timestamp(ts as i64, 0)
    {
        debug!(feed_time = %t, "Feed header timestamp");
    }

    let events = process(&feed);
    let vehicles = events.len();

    let outcome = publisher.publish_batch(events).await;
    info!(
        vehicles,
        accepted = outcome.accepted,
        failed = outcome.failed,
        "Poll cycle complete"
    );
    Ok(outcome)
}

/// Polls forever: one cycle immediately, then one per configured interval.
///
/// Cycles are serialized; a cycle slower than the interval delays the next
/// tick rather than overlapping it. A failed cycle is logged and the loop
/// carries on.
pub async fn run_loop<F, P>(
    cfg: &Config,
    feed_client: &F,
    publisher: &Arc<Publisher<P>>,
) -> Result<()>
where
    F: HttpClient,
    P: HttpClient + 'static,
{
    let mut ticker = tokio::time::interval(cfg.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(
        feed_url = %cfg.feed_url,
        interval_ms = cfg.poll_interval.as_millis() as u64,
        "Starting poll loop"
    );

    loop {
        ticker.tick().await;
        if let Err(e) = run_cycle(feed_client, publisher, &cfg.feed_url).await {
            error!(error = %e, "Poll cycle aborted");
        }
    }
}
