// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use stockroom_import::{ImportError, ImportOutcome, SearchRequest, SearchResponse};
use stockroom_plugin::PluginDescriptor;
use tokio_util::sync::CancellationToken;

use crate::auth::Organization;
use crate::error::ApiError;
use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Response body for GET /v1/plugins.
#[derive(Debug, Serialize)]
pub struct PluginListResponse {
    pub plugins: Vec<PluginDescriptor>,
}

/// Response body for GET /v1/plugins/{id}.
#[derive(Debug, Serialize)]
pub struct PluginDetailResponse {
    #[serde(flatten)]
    pub plugin: PluginDescriptor,
    /// Category provisioned for the caller's organization, once anything was imported.
    pub category_id: Option<String>,
}

/// Query string for GET /v1/plugins/{id}/search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    /// Kept as text so a malformed value falls back to the default limit.
    #[serde(default)]
    pub limit: Option<String>,
}

impl SearchParams {
    fn into_request(self) -> SearchRequest {
        SearchRequest {
            query: self.q.unwrap_or_default(),
            field: self.field.filter(|f| !f.trim().is_empty()),
            limit: self.limit.and_then(|l| l.trim().parse().ok()),
        }
    }
}

/// Request body for POST /v1/plugins/{id}/import.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub external_id: String,
}

/// Token cancelled when the returned guard drops with the request future.
fn request_token() -> (CancellationToken, tokio_util::sync::DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /v1/plugins
pub async fn list_plugins(
    State(state): State<GatewayState>,
    _org: Organization,
) -> Json<PluginListResponse> {
    let plugins = state
        .registry
        .list_all()
        .into_iter()
        .map(PluginDescriptor::from)
        .collect();
    Json(PluginListResponse { plugins })
}

/// GET /v1/plugins/{id}
pub async fn get_plugin(
    State(state): State<GatewayState>,
    Organization(org): Organization,
    Path(plugin_id): Path<String>,
) -> Result<Json<PluginDetailResponse>, ApiError> {
    let entry = state
        .registry
        .get(&plugin_id)
        .ok_or_else(|| ImportError::PluginNotFound(plugin_id.clone()))?;

    let category = state.categories.get_by_plugin_id(&org, &plugin_id).await?;

    Ok(Json(PluginDetailResponse {
        plugin: PluginDescriptor::from(entry),
        category_id: category.map(|c| c.id),
    }))
}

/// GET /v1/plugins/{id}/search
pub async fn search(
    State(state): State<GatewayState>,
    _org: Organization,
    Path(plugin_id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let (cancel, _guard) = request_token();
    let request = params.into_request();
    let response = state.search.search(&cancel, &plugin_id, &request).await?;
    Ok(Json(response))
}

/// POST /v1/plugins/{id}/import
///
/// The body is parsed by hand so an empty body is reported as such rather
/// than as a content-type or JSON error.
pub async fn import(
    State(state): State<GatewayState>,
    Organization(org): Organization,
    Path(plugin_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportOutcome>), ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ImportError::EmptyBody.into());
    }
    let request: ImportRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;

    let (cancel, _guard) = request_token();
    let outcome = state
        .orchestrator
        .import(&cancel, &org, &plugin_id, &request.external_id)
        .await?;

    tracing::info!(
        plugin = %plugin_id,
        asset_id = %outcome.asset.id,
        degraded = outcome.is_degraded(),
        "import completed"
    );
    Ok((StatusCode::CREATED, Json(outcome)))
}
