//! Delivery of formatted events to the ingestion API.

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, StatusCode, Url};
use tracing::{debug, error};

use crate::event::OutboundEvent;
use crate::fetch::HttpClient;

/// Per-cycle tally of independent publish results.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub accepted: usize,
    pub failed: usize,
}

/// POSTs events to a fixed endpoint through an [`HttpClient`].
///
/// Authentication is not this type's concern; the client it is built over is
/// expected to carry the `X-Authorization` key (see [`crate::fetch::auth`]).
pub struct Publisher<C> {
    client: C,
    endpoint: Url,
}

impl<C: HttpClient> Publisher<C> {
    pub fn new(client: C, endpoint: &str) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: endpoint.parse().context("invalid event endpoint URL")?,
        })
    }

    /// POSTs one event. Success is exactly 202 Accepted; any other status or
    /// a transport error is a failure local to this event.
    pub async fn publish(&self, event: &OutboundEvent) -> Result<()> {
        let mut req = Request::new(Method::POST, self.endpoint.clone());
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *req.body_mut() = Some(serde_json::to_vec(event)?.into());

        let resp = self.client.execute(req).await.context("event POST failed")?;
        let status = resp.status();
        if status != StatusCode::ACCEPTED {
            anyhow::bail!("event rejected with status {status}");
        }
        Ok(())
    }
}

impl<C: HttpClient + 'static> Publisher<C> {
    /// Fires one independent task per event and waits for all of them.
    ///
    /// Failures are logged per vehicle and tallied; they never abort the
    /// batch or each other. No retry, no concurrency cap.
    pub async fn publish_batch(self: &Arc<Self>, events: Vec<OutboundEvent>) -> BatchOutcome {
        let mut tasks = Vec::with_capacity(events.len());
        for event in events {
            let publisher = Arc::clone(self);
            tasks.push(tokio::spawn(async move {
                let vehicle_id = event.dynamic_attributes.id.clone();
                (vehicle_id, publisher.publish(&event).await)
            }));
        }

        let mut outcome = BatchOutcome::default();
        for task in tasks {
            match task.await {
                Ok((vehicle_id, Ok(()))) => {
                    debug!(%vehicle_id, "Event accepted");
                    outcome.accepted += 1;
                }
                Ok((vehicle_id, Err(e))) => {
                    error!(%vehicle_id, error = %e, "Failed to post event");
                    outcome.failed += 1;
                }
                Err(e) => {
                    error!(error = %e, "Publish task panicked");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }
}
