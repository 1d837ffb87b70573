//! Asynchronous typed client for the GeoAI platform API.
//!
//! # Overview
//! `ApiClient` performs one HTTP exchange per call against a configured
//! base endpoint and returns either the decoded payload as a caller-chosen
//! type or a `ClientError`. Every exchange is bounded by a timeout.
//!
//! # Design
//! - Configuration is resolved once (`ClientConfig::from_env`) and passed
//!   into the client; the client never reads the environment itself.
//! - Non-2xx responses and timeouts become a structured `ApiError`;
//!   transport failures pass through unclassified.
//! - Bodies are decoded best-effort: JSON, then text, then `null`.
//! - No retries. Concurrent calls share only the connection pool.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod types;

pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ClientError};
pub use http::{decode_body, join_url, HttpMethod};
pub use types::{CreateDataset, Dataset, HealthResponse, PluginsResponse, UpdateDataset};
