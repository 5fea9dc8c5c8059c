use crate::fetch::client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] decorator that stamps an API key onto every request as
/// an HTTP header.
///
/// The two schemes this tool talks to are both header-based: the transit feed
/// wants `Authorization: apikey <key>` and the event ingestion API wants the
/// raw key in `X-Authorization`. Header name and value are validated once at
/// construction so the request path stays infallible.
pub struct ApiKey<C> {
    inner: C,
    name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Wraps `inner` so every request carries `header_name: key`.
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(header_name.as_bytes())
            .with_context(|| format!("invalid auth header name '{header_name}'"))?;
        let mut value: HeaderValue = key
            .parse()
            .with_context(|| format!("API key is not a valid value for header '{header_name}'"))?;
        value.set_sensitive(true);
        Ok(Self { inner, name, value })
    }

    /// `Authorization: apikey <key>`, the Transport Open Data convention.
    pub fn apikey(inner: C, key: &str) -> Result<Self> {
        Self::new(inner, "Authorization", &format!("apikey {key}"))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut().insert(self.name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
