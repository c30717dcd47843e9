//! reqwest-backed DashScope client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Endpoint, Upstream, UpstreamError};

/// Authenticated client for the DashScope REST API.
///
/// The API key is fixed at construction. Idle connections are not kept:
/// each call opens its own connection and releases it once the response has
/// been consumed or dropped, on success and error paths alike.
#[derive(Debug, Clone)]
pub struct DashScopeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl DashScopeClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("qwenflow-server/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Upstream for DashScopeClient {
    async fn call(
        &self,
        endpoint: Endpoint,
        payload: Option<Value>,
        timeout: Duration,
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let started = Instant::now();

        let mut request = self
            .http
            .request(endpoint.method(), &url)
            .timeout(timeout);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if endpoint.is_async_submission() {
            request = request.header("X-DashScope-Async", "enable");
        }
        if let Some(body) = &payload {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%endpoint, error = %e, "provider unreachable");
            UpstreamError::transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(UpstreamError::transport)?;
            let err = UpstreamError::from_response(status.as_u16(), &body);
            warn!(%endpoint, status = status.as_u16(), detail = %err.detail, "provider returned an error");
            return Err(err);
        }

        let data = response.json::<Value>().await.map_err(|e| {
            warn!(%endpoint, error = %e, "provider response is not valid JSON");
            UpstreamError::transport(e)
        })?;

        debug!(
            %endpoint,
            status = status.as_u16(),
            latency_ms = started.elapsed().as_millis(),
            "provider call finished"
        );
        Ok(data)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
