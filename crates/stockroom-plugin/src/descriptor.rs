// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serializable plugin descriptors for listings (HTTP and CLI).

use serde::Serialize;
use stockroom_core::{PluginAttribute, SearchField};

use crate::registry::PluginEntry;

/// Public description of a registered plugin and its effective status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_reason: Option<String>,
    pub category_name: String,
    pub search_fields: Vec<SearchField>,
    pub attributes: Vec<PluginAttribute>,
}

impl From<&PluginEntry> for PluginDescriptor {
    fn from(entry: &PluginEntry) -> Self {
        let plugin = entry.plugin();
        Self {
            id: plugin.id().to_string(),
            name: plugin.name().to_string(),
            description: plugin.description().to_string(),
            enabled: entry.is_enabled(),
            disabled_reason: entry.disabled_reason(),
            category_name: plugin.category_name().to_string(),
            search_fields: plugin.search_fields().to_vec(),
            attributes: plugin.attributes().to_vec(),
        }
    }
}
