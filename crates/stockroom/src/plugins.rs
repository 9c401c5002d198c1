// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry assembly from compiled-in plugins and config overrides.

use std::fmt::Write as _;
use std::sync::Arc;

use stockroom_config::StockroomConfig;
use stockroom_core::ImportPlugin;
use stockroom_plugin::{PluginRegistry, PluginStatus};
use tracing::{info, warn};

/// Import plugins compiled into this binary.
///
/// Source integrations live outside this workspace and are added here.
pub fn compiled_plugins() -> Vec<Arc<dyn ImportPlugin>> {
    Vec::new()
}

/// Registers `plugins`, applying `[plugins.<id>]` overrides from config.
///
/// Plugins default to enabled. Overrides naming an unknown plugin are
/// reported and otherwise ignored.
pub fn build_registry(
    plugins: Vec<Arc<dyn ImportPlugin>>,
    config: &StockroomConfig,
) -> PluginRegistry {
    let mut registry = PluginRegistry::new();

    for plugin in plugins {
        let status = match config.plugins.get(plugin.id()) {
            Some(over) if !over.enabled => PluginStatus::Disabled {
                reason: over
                    .disabled_reason
                    .clone()
                    .unwrap_or_else(|| "disabled by configuration".to_string()),
            },
            _ => PluginStatus::Enabled,
        };
        registry.register_with_status(plugin, status);
    }

    for id in config.plugins.keys() {
        if !registry.contains(id) {
            warn!(plugin = %id, "configuration names a plugin that is not compiled in");
        }
    }

    if registry.is_empty() {
        warn!("no import plugins are registered; search and import will return not found");
    }

    info!(count = registry.len(), "plugin registry initialized");
    registry
}

/// Human-readable listing for `stockroom plugins`.
pub fn render_listing(registry: &PluginRegistry) -> String {
    let mut out = String::new();
    if registry.is_empty() {
        out.push_str("no import plugins compiled in\n");
        return out;
    }

    for entry in registry.list_all() {
        let plugin = entry.plugin();
        let status = match entry.disabled_reason() {
            None => "enabled".to_string(),
            Some(reason) => format!("disabled ({reason})"),
        };
        let _ = writeln!(out, "{:<16} {:<24} {}", plugin.id(), plugin.name(), status);
        let fields: Vec<&str> = plugin.search_fields().iter().map(|f| f.key.as_str()).collect();
        let _ = writeln!(out, "{:<16} search: {}", "", fields.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_config::PluginConfig;
    use stockroom_test_utils::MockPlugin;

    fn plugins() -> Vec<Arc<dyn ImportPlugin>> {
        vec![Arc::new(MockPlugin::books()), Arc::new(MockPlugin::new("films"))]
    }

    #[test]
    fn plugins_default_to_enabled() {
        let registry = build_registry(plugins(), &StockroomConfig::default());
        assert_eq!(registry.len(), 2);
        assert!(registry.get("books").unwrap().is_enabled());
        assert!(registry.get("films").unwrap().is_enabled());
    }

    #[test]
    fn config_override_disables_plugin_with_reason() {
        let mut config = StockroomConfig::default();
        config.plugins.insert(
            "books".to_string(),
            PluginConfig {
                enabled: false,
                disabled_reason: Some("rate limited".to_string()),
            },
        );
        let registry = build_registry(plugins(), &config);
        let books = registry.get("books").unwrap();
        assert!(!books.is_enabled());
        assert_eq!(books.disabled_reason().as_deref(), Some("rate limited"));
    }

    #[test]
    fn override_for_unknown_plugin_is_ignored() {
        let mut config = StockroomConfig::default();
        config.plugins.insert(
            "ghost".to_string(),
            PluginConfig {
                enabled: false,
                disabled_reason: Some("gone".to_string()),
            },
        );
        let registry = build_registry(plugins(), &config);
        assert_eq!(registry.len(), 2);
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn listing_shows_status_and_fields() {
        let mut config = StockroomConfig::default();
        config.plugins.insert(
            "films".to_string(),
            PluginConfig {
                enabled: false,
                disabled_reason: Some("maintenance".to_string()),
            },
        );
        let listing = render_listing(&build_registry(plugins(), &config));
        assert!(listing.contains("books"));
        assert!(listing.contains("title, isbn, author"));
        assert!(listing.contains("disabled (maintenance)"));
    }

    #[test]
    fn empty_registry_listing() {
        let listing = render_listing(&PluginRegistry::new());
        assert_eq!(listing, "no import plugins compiled in\n");
    }
}
