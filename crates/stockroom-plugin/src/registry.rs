// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry for import sources.
//!
//! The `PluginRegistry` stores `PluginEntry` records keyed by plugin id. It is
//! populated once at startup and then shared read-only (`Arc<PluginRegistry>`)
//! by every request; nothing mutates it while requests are in flight.

use std::collections::HashMap;
use std::sync::Arc;

use stockroom_core::ImportPlugin;
use tracing::warn;

/// Fallback reason reported when a plugin is disabled without explanation.
const DEFAULT_DISABLED_REASON: &str = "plugin is disabled";

/// Administrative status of a plugin, set from configuration at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginStatus {
    /// Plugin may serve requests (subject to its own `enabled()`).
    Enabled,
    /// Plugin was disabled by an administrator.
    Disabled { reason: String },
}

impl std::fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginStatus::Enabled => write!(f, "enabled"),
            PluginStatus::Disabled { .. } => write!(f, "disabled"),
        }
    }
}

/// A single entry in the plugin registry.
pub struct PluginEntry {
    plugin: Arc<dyn ImportPlugin>,
    status: PluginStatus,
}

impl PluginEntry {
    /// The plugin capability object.
    pub fn plugin(&self) -> &Arc<dyn ImportPlugin> {
        &self.plugin
    }

    pub fn id(&self) -> &str {
        self.plugin.id()
    }

    /// Administrative status assigned at registration.
    pub fn status(&self) -> &PluginStatus {
        &self.status
    }

    /// True when both the administrator and the plugin itself allow requests.
    pub fn is_enabled(&self) -> bool {
        self.status == PluginStatus::Enabled && self.plugin.enabled()
    }

    /// Reason the plugin cannot serve requests, or `None` when enabled.
    ///
    /// The administrator's reason wins over the plugin's own.
    pub fn disabled_reason(&self) -> Option<String> {
        if let PluginStatus::Disabled { reason } = &self.status {
            return Some(non_empty_reason(Some(reason)));
        }
        if self.plugin.enabled() {
            return None;
        }
        Some(non_empty_reason(self.plugin.disabled_reason()))
    }
}

fn non_empty_reason(reason: Option<&str>) -> String {
    match reason.map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => DEFAULT_DISABLED_REASON.to_string(),
    }
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("id", &self.plugin.id())
            .field("status", &self.status)
            .field("plugin_enabled", &self.plugin.enabled())
            .finish()
    }
}

/// Registry of import plugins keyed by plugin id.
pub struct PluginRegistry {
    entries: HashMap<String, PluginEntry>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a plugin with status `Enabled`.
    pub fn register(&mut self, plugin: Arc<dyn ImportPlugin>) {
        self.register_with_status(plugin, PluginStatus::Enabled);
    }

    /// Register a plugin with an explicit administrative status.
    ///
    /// Registering an id twice replaces the earlier entry.
    pub fn register_with_status(&mut self, plugin: Arc<dyn ImportPlugin>, status: PluginStatus) {
        let id = plugin.id().to_string();
        if self.entries.contains_key(&id) {
            warn!(plugin = %id, "plugin registered twice, replacing earlier entry");
        }
        self.entries.insert(id, PluginEntry { plugin, status });
    }

    /// Get a plugin entry by id.
    pub fn get(&self, id: &str) -> Option<&PluginEntry> {
        self.entries.get(id)
    }

    /// Returns true if a plugin with this id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// List all plugin entries, sorted by id.
    pub fn list_all(&self) -> Vec<&PluginEntry> {
        let mut entries: Vec<&PluginEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.id().cmp(b.id()));
        entries
    }

    /// Returns the number of registered plugins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_test_utils::MockPlugin;

    #[test]
    fn register_and_get_roundtrip() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MockPlugin::books()));

        let entry = registry.get("books").unwrap();
        assert_eq!(entry.id(), "books");
        assert_eq!(entry.status(), &PluginStatus::Enabled);
        assert!(entry.is_enabled());
        assert!(entry.disabled_reason().is_none());
        assert!(registry.contains("books"));
        assert!(registry.get("movies").is_none());
    }

    #[test]
    fn admin_disabled_reason_wins() {
        let mut registry = PluginRegistry::new();
        registry.register_with_status(
            Arc::new(MockPlugin::books().disabled("missing API key")),
            PluginStatus::Disabled {
                reason: "maintenance window".into(),
            },
        );

        let entry = registry.get("books").unwrap();
        assert!(!entry.is_enabled());
        assert_eq!(entry.disabled_reason().as_deref(), Some("maintenance window"));
    }

    #[test]
    fn plugin_self_disabled_reports_its_reason() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MockPlugin::books().disabled("missing API key")));

        let entry = registry.get("books").unwrap();
        assert!(!entry.is_enabled());
        assert_eq!(entry.disabled_reason().as_deref(), Some("missing API key"));
    }

    #[test]
    fn blank_reason_falls_back_to_default() {
        let mut registry = PluginRegistry::new();
        registry.register_with_status(
            Arc::new(MockPlugin::books()),
            PluginStatus::Disabled { reason: "  ".into() },
        );

        let entry = registry.get("books").unwrap();
        assert_eq!(entry.disabled_reason().as_deref(), Some(DEFAULT_DISABLED_REASON));
    }

    #[test]
    fn duplicate_registration_replaces_entry() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MockPlugin::books()));
        registry.register_with_status(
            Arc::new(MockPlugin::books()),
            PluginStatus::Disabled {
                reason: "replaced".into(),
            },
        );

        assert_eq!(registry.len(), 1);
        assert!(!registry.get("books").unwrap().is_enabled());
    }

    #[test]
    fn list_all_returns_sorted() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MockPlugin::new("zines")));
        registry.register(Arc::new(MockPlugin::new("albums")));
        registry.register(Arc::new(MockPlugin::new("movies")));

        let ids: Vec<&str> = registry.list_all().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["albums", "movies", "zines"]);
    }

    #[test]
    fn len_and_is_empty() {
        let mut registry = PluginRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);

        registry.register(Arc::new(MockPlugin::books()));
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
    }
}
