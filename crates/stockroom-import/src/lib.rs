// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External import pipeline for Stockroom.
//!
//! A caller searches an external source through [`SearchCoordinator`], picks a
//! result, and hands its external id to [`ImportOrchestrator`]. The
//! orchestrator fetches the full record, lazily provisions the plugin's
//! category and attributes through [`SchemaProvisioner`], creates the asset,
//! and optionally attaches a cover image through [`ImageIngestor`].
//!
//! Every entry point takes a [`CancellationToken`](tokio_util::sync::CancellationToken);
//! cancelling it aborts the remaining steps and yields [`ImportError::Cancelled`].

pub mod error;
pub mod image;
pub mod orchestrator;
pub mod provision;
pub mod search;

mod cancel;

use std::sync::Arc;

use stockroom_core::ImportPlugin;
use stockroom_plugin::PluginRegistry;

pub use error::{ErrorKind, ImportError};
pub use image::{ImageError, ImageIngestor, IngestorConfig};
pub use orchestrator::{CoverImage, ImportOrchestrator, ImportOutcome};
pub use provision::SchemaProvisioner;
pub use search::{SearchCoordinator, SearchRequest, SearchResponse};

/// Looks up a plugin and confirms it may serve requests.
pub(crate) fn resolve_enabled_plugin(
    registry: &PluginRegistry,
    plugin_id: &str,
) -> Result<Arc<dyn ImportPlugin>, ImportError> {
    let entry = registry
        .get(plugin_id)
        .ok_or_else(|| ImportError::PluginNotFound(plugin_id.to_string()))?;

    if let Some(reason) = entry.disabled_reason() {
        return Err(ImportError::PluginDisabled {
            plugin_id: plugin_id.to_string(),
            reason,
        });
    }

    Ok(entry.plugin().clone())
}
