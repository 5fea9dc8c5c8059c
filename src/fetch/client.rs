use async_trait::async_trait;
use reqwest::{Request, Response};

/// The single seam between this crate and the network.
///
/// Both the inbound feed fetch and the outbound event publish go through an
/// implementation of this trait, which is what lets tests substitute a
/// canned-response client for the real one.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
