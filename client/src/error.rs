//! Error types for the GeoAI API client.
//!
//! # Design
//! `ApiError` is the structured record for the two failures the client
//! classifies itself: a non-2xx response and a missed deadline (status 408).
//! Transport failures that happen before any response are passed through
//! as `ClientError::Transport` without being folded into `ApiError`, so
//! callers can still tell "server said no" from "server never answered"
//! from "no connection at all".

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::http::HttpMethod;

/// Structured error for HTTP failures and client-side timeouts.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub message: String,
    /// HTTP status, or [`ApiError::TIMEOUT_STATUS`] when the deadline fired.
    pub status: u16,
    pub url: String,
    /// Decoded response body, if the server sent one.
    pub detail: Option<Value>,
    /// Set when the client gave up waiting; a server-sent 408 leaves it false.
    pub timed_out: bool,
}

impl ApiError {
    pub const TIMEOUT_STATUS: u16 = 408;

    pub fn http_failure(
        method: HttpMethod,
        path: &str,
        url: &str,
        status: u16,
        detail: Value,
    ) -> Self {
        Self {
            message: format!("{method} {path} failed"),
            status,
            url: url.to_string(),
            detail: (!detail.is_null()).then_some(detail),
            timed_out: false,
        }
    }

    pub fn timeout(method: HttpMethod, path: &str, url: &str, timeout: Duration) -> Self {
        Self {
            message: format!("{method} {path} timed out after {}ms", timeout.as_millis()),
            status: Self::TIMEOUT_STATUS,
            url: url.to_string(),
            detail: None,
            timed_out: true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

/// Errors returned by `ApiClient` calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response or timeout.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request never produced a response (DNS, refused connection, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request body could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A 2xx payload did not match the requested type.
    #[error("deserialization failed: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// Status carried by a structured error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(e) => Some(e.status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Api(e) if e.is_timeout())
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(e) => Some(e),
            _ => None,
        }
    }
}
