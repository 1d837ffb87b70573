//! Typed request client for the GeoAI backend.
//!
//! # Design
//! `ApiClient` holds the base endpoint, the default timeout and a pooled
//! `reqwest::Client`; it carries no other state between calls. Every call
//! goes through `request`, which races the whole exchange (send and body
//! read) against `tokio::time::timeout`. Dropping the losing future both
//! cancels the in-flight request and releases the timer, so no exit path
//! leaves a deadline behind.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::http::{decode_body, join_url, HttpMethod};

/// Asynchronous JSON client bound to one base endpoint.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_config(&ClientConfig::new(base_url))
    }

    pub fn with_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `path` against the base endpoint.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Perform one exchange and decode the payload as `T`.
    ///
    /// A non-2xx status or a missed deadline yields `ClientError::Api`;
    /// failures before any response are returned as
    /// `ClientError::Transport` unchanged. `timeout` falls back to the
    /// client's default when `None`.
    pub async fn request<T, B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        timeout: Option<Duration>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let timeout = timeout.unwrap_or(self.timeout);

        let mut builder = self.http.request(method.into(), &url);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(ClientError::Serialize)?;
            builder = builder.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        let (status, text) = match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(%method, %url, ?timeout, "request timed out");
                return Err(ApiError::timeout(method, path, &url, timeout).into());
            }
        };

        debug!(%method, %url, status = status.as_u16(), "response received");

        let payload = decode_body(&text);
        if !status.is_success() {
            return Err(
                ApiError::http_failure(method, path, &url, status.as_u16(), payload).into(),
            );
        }

        serde_json::from_value(payload).map_err(ClientError::Decode)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        timeout: Option<Duration>,
    ) -> Result<T, ClientError> {
        self.request::<T, ()>(HttpMethod::Get, path, None, timeout)
            .await
    }

    pub async fn post<T, B>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Post, path, Some(body), timeout)
            .await
    }

    pub async fn put<T, B>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Put, path, Some(body), timeout)
            .await
    }

    pub async fn patch<T, B>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(HttpMethod::Patch, path, Some(body), timeout)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        timeout: Option<Duration>,
    ) -> Result<T, ClientError> {
        self.request::<T, ()>(HttpMethod::Delete, path, None, timeout)
            .await
    }
}
