mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};

/// Fetches a URL and returns the raw response body.
///
/// A non-success status is an error: a GTFS-RT body only means anything
/// alongside a 200, so the caller aborts the cycle instead of decoding it.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("feed fetch returned status {status}");
    }

    Ok(resp
        .bytes()
        .await
        .context("reading feed response body")?
        .to_vec())
}
