// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use stockroom_core::{CategoryStore, StockroomError};
use stockroom_import::{ImportOrchestrator, SearchCoordinator};
use stockroom_plugin::PluginRegistry;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<PluginRegistry>,
    pub search: Arc<SearchCoordinator>,
    pub orchestrator: Arc<ImportOrchestrator>,
    /// Used to report the category provisioned for a plugin.
    pub categories: Arc<dyn CategoryStore>,
    pub auth: AuthConfig,
}

/// Gateway server configuration (mirrors `GatewayConfig` from stockroom-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the application router.
///
/// - GET /health (public)
/// - GET /v1/plugins
/// - GET /v1/plugins/{id}
/// - GET /v1/plugins/{id}/search
/// - POST /v1/plugins/{id}/import
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new().route("/health", get(handlers::get_health));

    let api_routes = Router::new()
        .route("/v1/plugins", get(handlers::list_plugins))
        .route("/v1/plugins/{id}", get(handlers::get_plugin))
        .route("/v1/plugins/{id}/search", get(handlers::search))
        .route("/v1/plugins/{id}/import", post(handlers::import))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds `host:port` and serves until `shutdown` resolves.
pub async fn start_server<F>(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: F,
) -> Result<(), StockroomError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StockroomError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| StockroomError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
