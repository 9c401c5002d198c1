// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search coordinator: validates a query, then asks the plugin.
//!
//! Every check runs before the plugin is invoked so malformed queries never
//! cost an outbound call.

use std::sync::Arc;

use serde::Serialize;
use stockroom_core::{SearchField, SearchResult};
use stockroom_plugin::PluginRegistry;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cancel::cancellable;
use crate::error::ImportError;
use crate::resolve_enabled_plugin;

/// Queries shorter than this never reach the plugin.
pub const MIN_QUERY_LEN: usize = 2;

/// Result count used when the caller omits a limit or gives one out of range.
pub const DEFAULT_LIMIT: usize = 10;

/// Largest result count a caller may request.
pub const MAX_LIMIT: usize = 20;

/// A caller's search request before validation.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub field: Option<String>,
    pub limit: Option<i64>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Normalized search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub plugin_id: String,
    /// The field the plugin was queried on.
    pub field: String,
    pub results: Vec<SearchResult>,
}

/// Validates search requests and dispatches them to plugins.
pub struct SearchCoordinator {
    registry: Arc<PluginRegistry>,
}

impl SearchCoordinator {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Runs a search through `plugin_id`.
    ///
    /// Validation order: plugin exists, plugin enabled, query length,
    /// search field, limit.
    pub async fn search(
        &self,
        cancel: &CancellationToken,
        plugin_id: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, ImportError> {
        let plugin = resolve_enabled_plugin(&self.registry, plugin_id)?;

        let query = request.query.trim();
        if query.is_empty() {
            return Err(ImportError::MissingQuery);
        }
        if query.chars().count() < MIN_QUERY_LEN {
            return Err(ImportError::QueryTooShort { min: MIN_QUERY_LEN });
        }

        let field = resolve_field(plugin.search_fields(), request.field.as_deref())?;
        let limit = normalize_limit(request.limit);

        debug!(plugin = %plugin_id, field = %field, limit, "dispatching plugin search");

        match cancellable(cancel, plugin.search(cancel, &field, query, limit)).await? {
            Ok(results) => {
                debug!(plugin = %plugin_id, count = results.len(), "plugin search complete");
                Ok(SearchResponse {
                    plugin_id: plugin_id.to_string(),
                    field,
                    results,
                })
            }
            Err(e) if e.is_cancelled() || cancel.is_cancelled() => Err(ImportError::Cancelled),
            Err(e) => {
                warn!(plugin = %plugin_id, error = %e, "plugin search failed");
                Err(ImportError::UpstreamSearch { source: e })
            }
        }
    }
}

/// Picks the search field: the requested one if declared, else the first declared.
fn resolve_field(declared: &[SearchField], requested: Option<&str>) -> Result<String, ImportError> {
    let requested = requested.map(str::trim).filter(|f| !f.is_empty());

    match requested {
        Some(field) => declared
            .iter()
            .find(|f| f.key == field)
            .map(|f| f.key.clone())
            .ok_or_else(|| ImportError::InvalidSearchField {
                field: field.to_string(),
                allowed: declared
                    .iter()
                    .map(|f| f.key.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        None => declared
            .first()
            .map(|f| f.key.clone())
            .ok_or_else(|| ImportError::InvalidSearchField {
                field: String::new(),
                allowed: "(plugin declares no search fields)".to_string(),
            }),
    }
}

/// Keeps a limit inside `[1, MAX_LIMIT]`, substituting the default otherwise.
pub fn normalize_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(n) if (1..=MAX_LIMIT as i64).contains(&n) => n as usize,
        _ => DEFAULT_LIMIT,
    }
}
