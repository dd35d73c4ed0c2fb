//! HTTP plumbing for the places API boundary.
//!
//! [`HttpClient`] is the seam that keeps network access out of tests.
//! [`QueryKey`] decorates any client with an API key injected as a URL query
//! parameter, which is how the Google Maps endpoints authenticate.

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::{Request, Response};
use std::time::Duration;

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Plain reqwest-backed client.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }

    /// Client with request and connect timeouts, for talking to external
    /// APIs that may hang.
    pub fn with_timeouts(request: Duration, connect: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request)
            .connect_timeout(connect)
            .build()?;
        Ok(Self(client))
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.0.execute(req).await
    }
}

/// An [`HttpClient`] wrapper that appends an API key as a URL query
/// parameter on every request. `param_name` is `"key"` for the Google Maps
/// endpoints.
pub struct QueryKey<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

impl<C> QueryKey<C> {
    /// Convenience constructor for the Google Maps `key` parameter.
    pub fn google(inner: C, key: String) -> Self {
        Self {
            inner,
            param_name: "key".to_string(),
            key,
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for QueryKey<C> {
    async fn execute(&self, mut req: Request) -> reqwest::Result<Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req).await
    }
}

/// GETs `url` and decodes the response body as JSON.
///
/// # Errors
///
/// Fails on transport errors, non-success status codes, or bodies that are
/// not valid JSON.
pub async fn fetch_json<C: HttpClient>(client: &C, url: &str) -> Result<serde_json::Value> {
    let req = Request::new(reqwest::Method::GET, url.parse()?);
    let resp = client.execute(req).await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("request failed with status {status}: {body}");
    }

    Ok(resp.json().await?)
}
