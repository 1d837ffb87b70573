use std::{sync::Arc, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_PLUGINS: &[&str] = &["ndvi", "change_detection", "cloud_mask"];

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_LIST_LIMIT: i64 = 500;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub core_loaded: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Plugins {
    pub plugins: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDataset {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDataset {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Error body in the backend's `{"detail": ...}` shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<Detail>)>;

fn reject(status: StatusCode, detail: &str) -> (StatusCode, Json<Detail>) {
    (
        status,
        Json(Detail {
            detail: detail.to_string(),
        }),
    )
}

/// Every body rejection (syntax, missing content type, wrong fields) is a 422.
fn invalid_body(rejection: JsonRejection) -> (StatusCode, Json<Detail>) {
    reject(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text())
}

/// Parse a `MOCK_LATENCY_MS` value; unset or empty means no latency.
pub fn parse_latency(raw: Option<&str>) -> Result<Option<Duration>, std::num::ParseIntError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(ms) => Ok(Some(Duration::from_millis(ms.parse::<u64>()?))),
        None => Ok(None),
    }
}

#[derive(Clone)]
pub struct AppState {
    plugins: Arc<Vec<String>>,
    datasets: Arc<RwLock<Vec<Dataset>>>,
}

impl AppState {
    pub fn new(plugins: Vec<String>) -> Self {
        Self {
            plugins: Arc::new(plugins),
            datasets: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PLUGINS.iter().map(|p| p.to_string()).collect())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plugins", get(list_plugins))
        .route("/datasets", get(list_datasets).post(create_dataset))
        .route(
            "/datasets/{id}",
            get(get_dataset).patch(update_dataset).delete(delete_dataset),
        )
        .with_state(state)
}

pub fn app() -> Router {
    router(AppState::default())
}

/// Same routes, but every response is held back by `latency`.
pub fn app_with_latency(latency: Duration) -> Router {
    app().layer(middleware::from_fn_with_state(latency, delay))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_latency(listener: TcpListener, latency: Duration) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_latency(latency)).await
}

async fn delay(State(latency): State<Duration>, request: Request, next: Next) -> Response {
    tokio::time::sleep(latency).await;
    next.run(request).await
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        core_loaded: true,
    })
}

async fn list_plugins(State(state): State<AppState>) -> Json<Plugins> {
    Json(Plugins {
        plugins: state.plugins.as_ref().clone(),
    })
}

fn validate_name(name: &str) -> ApiResult<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            "name must be between 1 and 200 characters.",
        ));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> ApiResult<()> {
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN) {
        return Err(reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            "description must be at most 2000 characters.",
        ));
    }
    Ok(())
}

async fn list_datasets(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Dataset>> {
    let limit = params.limit.unwrap_or(100).clamp(1, MAX_LIST_LIMIT) as usize;
    let offset = params.offset.unwrap_or(0).max(0) as usize;
    let datasets = state.datasets.read().await;
    Json(datasets.iter().skip(offset).take(limit).cloned().collect())
}

async fn create_dataset(
    State(state): State<AppState>,
    payload: Result<Json<CreateDataset>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Dataset>)> {
    let Json(input) = payload.map_err(invalid_body)?;
    validate_name(&input.name)?;
    validate_description(input.description.as_deref())?;

    let mut datasets = state.datasets.write().await;
    if datasets.iter().any(|d| d.name == input.name) {
        return Err(reject(
            StatusCode::CONFLICT,
            "Dataset with this name already exists.",
        ));
    }
    let dataset = Dataset {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        description: input.description,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    tracing::debug!(id = %dataset.id, name = %dataset.name, "dataset created");
    datasets.push(dataset.clone());
    Ok((StatusCode::CREATED, Json(dataset)))
}

async fn get_dataset(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Dataset>> {
    let datasets = state.datasets.read().await;
    datasets
        .iter()
        .find(|d| d.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Dataset not found."))
}

async fn update_dataset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDataset>, JsonRejection>,
) -> ApiResult<Json<Dataset>> {
    let Json(input) = payload.map_err(invalid_body)?;
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    validate_description(input.description.as_deref())?;

    let mut datasets = state.datasets.write().await;
    let dataset = datasets
        .iter_mut()
        .find(|d| d.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Dataset not found."))?;
    if let Some(name) = input.name {
        dataset.name = name;
    }
    if let Some(description) = input.description {
        dataset.description = Some(description);
    }
    Ok(Json(dataset.clone()))
}

async fn delete_dataset(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut datasets = state.datasets.write().await;
    let index = datasets
        .iter()
        .position(|d| d.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Dataset not found."))?;
    let removed = datasets.remove(index);
    tracing::debug!(id = %removed.id, "dataset deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_serializes_to_backend_shape() {
        let json = serde_json::to_value(Health {
            status: "ok".to_string(),
            core_loaded: true,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "core_loaded": true}));
    }

    #[test]
    fn create_dataset_description_defaults_to_none() {
        let input: CreateDataset = serde_json::from_str(r#"{"name":"sentinel-2"}"#).unwrap();
        assert_eq!(input.name, "sentinel-2");
        assert!(input.description.is_none());
    }

    #[test]
    fn create_dataset_rejects_unknown_fields() {
        let result: Result<CreateDataset, _> =
            serde_json::from_str(r#"{"name":"x","owner":"someone"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn create_dataset_rejects_missing_name() {
        let result: Result<CreateDataset, _> = serde_json::from_str(r#"{"description":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_dataset_all_fields_optional() {
        let input: UpdateDataset = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.name.is_none());
        assert!(input.description.is_none());
    }

    #[test]
    fn latency_unset_or_empty_is_none() {
        assert_eq!(parse_latency(None).unwrap(), None);
        assert_eq!(parse_latency(Some("")).unwrap(), None);
    }

    #[test]
    fn latency_parses_milliseconds() {
        assert_eq!(
            parse_latency(Some("250")).unwrap(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn malformed_latency_is_an_error() {
        assert!(parse_latency(Some("fast")).is_err());
        assert!(parse_latency(Some("-5")).is_err());
    }

    #[test]
    fn name_length_is_bounded() {
        assert!(validate_name("").is_err());
        assert!(validate_name(&"a".repeat(201)).is_err());
        assert!(validate_name(&"a".repeat(200)).is_ok());
    }

    #[test]
    fn description_length_is_bounded() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some(&"d".repeat(2001))).is_err());
    }
}
