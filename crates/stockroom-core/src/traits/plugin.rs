// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait implemented by every external import source.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::StockroomError;
use crate::types::{ImportData, PluginAttribute, SearchField, SearchResult};

/// A capability object that searches and fetches records from one external source.
///
/// Implementations are stateless from the pipeline's point of view. Whether a
/// plugin is enabled and which fields it exposes are data on the implementation,
/// never branches in the orchestrator.
#[async_trait]
pub trait ImportPlugin: Send + Sync + 'static {
    /// Stable identifier stamped onto provisioned records. Never reused.
    fn id(&self) -> &str;

    /// Human-readable plugin name.
    fn name(&self) -> &str;

    /// Short description of the external source.
    fn description(&self) -> &str;

    /// Whether the plugin can currently serve requests (e.g. API key present).
    fn enabled(&self) -> bool {
        true
    }

    /// Why the plugin is disabled, when [`enabled`](Self::enabled) is false.
    fn disabled_reason(&self) -> Option<&str> {
        None
    }

    /// Name of the category provisioned for imported records.
    fn category_name(&self) -> &str;

    /// Description of the category provisioned for imported records.
    fn category_description(&self) -> &str;

    /// Ordered, non-empty list of queryable fields. The first is the default.
    fn search_fields(&self) -> &[SearchField];

    /// Schema fields that fetched records populate, in display order.
    fn attributes(&self) -> &[PluginAttribute];

    /// Searches the external source.
    async fn search(
        &self,
        cancel: &CancellationToken,
        field: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, StockroomError>;

    /// Fetches the canonical record for an external id.
    async fn fetch(
        &self,
        cancel: &CancellationToken,
        external_id: &str,
    ) -> Result<ImportData, StockroomError>;
}
