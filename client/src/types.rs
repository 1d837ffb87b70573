//! Response and request records for the GeoAI backend.
//!
//! # Design
//! These mirror the mock-server's schema but are defined independently.
//! The client performs no validation beyond what serde needs to build
//! each type; integration tests catch drift between the two crates.

use serde::{Deserialize, Serialize};

/// `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub core_loaded: bool,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// `GET /plugins`. Plugins are listed by name only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginsResponse {
    pub plugins: Vec<String>,
}

/// A dataset as returned by the `/datasets` endpoints.
///
/// `created_at` is kept as the server's RFC 3339 string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

/// Payload for `POST /datasets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDataset {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload for `PATCH /datasets/{id}`. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
