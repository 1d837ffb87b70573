//! Typed calls for the backend endpoints the platform consumes.
//!
//! Every call takes an optional timeout; `None` uses the client default.

use std::time::Duration;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::types::{CreateDataset, Dataset, HealthResponse, PluginsResponse, UpdateDataset};

/// Path of a single dataset; `id` is percent-encoded as one segment.
fn dataset_path(id: &str) -> String {
    format!("/datasets/{}", urlencoding::encode(id))
}

impl ApiClient {
    pub async fn health(&self, timeout: Option<Duration>) -> Result<HealthResponse, ClientError> {
        self.get("/health", timeout).await
    }

    pub async fn plugins(&self, timeout: Option<Duration>) -> Result<PluginsResponse, ClientError> {
        self.get("/plugins", timeout).await
    }

    pub async fn datasets(&self, timeout: Option<Duration>) -> Result<Vec<Dataset>, ClientError> {
        self.get("/datasets", timeout).await
    }

    pub async fn dataset(
        &self,
        id: &str,
        timeout: Option<Duration>,
    ) -> Result<Dataset, ClientError> {
        self.get(&dataset_path(id), timeout).await
    }

    pub async fn create_dataset(
        &self,
        input: &CreateDataset,
        timeout: Option<Duration>,
    ) -> Result<Dataset, ClientError> {
        self.post("/datasets", input, timeout).await
    }

    pub async fn update_dataset(
        &self,
        id: &str,
        input: &UpdateDataset,
        timeout: Option<Duration>,
    ) -> Result<Dataset, ClientError> {
        self.patch(&dataset_path(id), input, timeout).await
    }

    /// The server answers 204 with an empty body, which decodes to `()`.
    pub async fn delete_dataset(
        &self,
        id: &str,
        timeout: Option<Duration>,
    ) -> Result<(), ClientError> {
        self.delete(&dataset_path(id), timeout).await
    }
}
