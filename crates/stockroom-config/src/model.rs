// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Stockroom.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Stockroom configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StockroomConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database and file storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// External import pipeline settings.
    #[serde(default)]
    pub import: ImportConfig,

    /// Per-plugin administrative overrides, keyed by plugin id.
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginConfig>,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory holding uploaded attachment payloads.
    #[serde(default = "default_files_path")]
    pub files_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            files_path: default_files_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn data_path(name: &str) -> String {
    dirs::data_dir()
        .map(|p| p.join("stockroom").join(name))
        .unwrap_or_else(|| std::path::PathBuf::from(name))
        .to_string_lossy()
        .into_owned()
}

fn default_database_path() -> String {
    data_path("stockroom.db")
}

fn default_files_path() -> String {
    data_path("files")
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind to.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on `/v1` routes. With no token every `/v1`
    /// request is rejected.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

/// Import pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Deadline for one cover image download, in seconds.
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,

    /// Bytes kept from a cover image response; the rest is dropped.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,

    /// User-Agent sent with image downloads.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whether imports download cover images at all.
    #[serde(default = "default_download_images")]
    pub download_images: bool,
}

impl ImportConfig {
    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            image_timeout_secs: default_image_timeout_secs(),
            max_image_bytes: default_max_image_bytes(),
            user_agent: default_user_agent(),
            download_images: default_download_images(),
        }
    }
}

fn default_image_timeout_secs() -> u64 {
    30
}

fn default_max_image_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_user_agent() -> String {
    format!("stockroom/{}", env!("CARGO_PKG_VERSION"))
}

fn default_download_images() -> bool {
    true
}

/// Administrative override for one import plugin.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// Set to `false` to take the plugin out of service.
    #[serde(default = "default_plugin_enabled")]
    pub enabled: bool,

    /// Shown to callers while the plugin is disabled.
    #[serde(default)]
    pub disabled_reason: Option<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: default_plugin_enabled(),
            disabled_reason: None,
        }
    }
}

fn default_plugin_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_sections_deserialize_by_id() {
        let toml_str = r#"
[plugins.books]
enabled = false
disabled_reason = "API quota exhausted"

[plugins.boardgames]
"#;
        let config: StockroomConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.plugins.len(), 2);
        assert!(!config.plugins["books"].enabled);
        assert_eq!(
            config.plugins["books"].disabled_reason.as_deref(),
            Some("API quota exhausted")
        );
        assert!(config.plugins["boardgames"].enabled);
    }

    #[test]
    fn plugin_sections_deny_unknown_fields() {
        let toml_str = r#"
[plugins.books]
enabeld = false
"#;
        assert!(toml::from_str::<StockroomConfig>(toml_str).is_err());
    }

    #[test]
    fn import_defaults() {
        let import = ImportConfig::default();
        assert_eq!(import.image_timeout(), Duration::from_secs(30));
        assert_eq!(import.max_image_bytes, 10 * 1024 * 1024);
        assert!(import.user_agent.starts_with("stockroom/"));
        assert!(import.download_images);
    }
}
