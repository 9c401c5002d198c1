// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::StockroomConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &StockroomConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.server.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "server.log_level `{}` must be one of: {}",
            config.server.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }
    if config.storage.files_path.trim().is_empty() {
        fail("storage.files_path must not be empty".to_string());
    }

    if config.gateway.host.trim().is_empty() {
        fail("gateway.host must not be empty".to_string());
    }
    if config.gateway.port == 0 {
        fail("gateway.port must be between 1 and 65535".to_string());
    }
    if config
        .gateway
        .bearer_token
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        fail("gateway.bearer_token must not be empty when set".to_string());
    }

    if config.import.image_timeout_secs == 0 {
        fail("import.image_timeout_secs must be greater than 0".to_string());
    }
    if config.import.max_image_bytes == 0 {
        fail("import.max_image_bytes must be greater than 0".to_string());
    }
    if config.import.user_agent.trim().is_empty() {
        fail("import.user_agent must not be empty".to_string());
    }

    for (id, plugin) in &config.plugins {
        let has_reason = plugin
            .disabled_reason
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty());
        if !plugin.enabled && !has_reason {
            fail(format!(
                "plugins.{id}.disabled_reason is required when the plugin is disabled"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PluginConfig;

    fn messages(config: &StockroomConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&StockroomConfig::default()).is_ok());
    }

    #[test]
    fn all_failures_are_collected() {
        let mut config = StockroomConfig::default();
        config.storage.database_path = " ".to_string();
        config.gateway.port = 0;
        config.import.max_image_bytes = 0;

        let messages = messages(&config);
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().any(|m| m.contains("database_path")));
        assert!(messages.iter().any(|m| m.contains("gateway.port")));
        assert!(messages.iter().any(|m| m.contains("max_image_bytes")));
    }

    #[test]
    fn disabled_plugin_requires_reason() {
        let mut config = StockroomConfig::default();
        config.plugins.insert(
            "books".to_string(),
            PluginConfig {
                enabled: false,
                disabled_reason: None,
            },
        );
        let messages = messages(&config);
        assert!(messages[0].contains("plugins.books.disabled_reason"));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let mut config = StockroomConfig::default();
        config.server.log_level = "verbose".to_string();
        assert!(messages(&config)[0].contains("server.log_level"));
    }

    #[test]
    fn blank_bearer_token_is_rejected() {
        let mut config = StockroomConfig::default();
        config.gateway.bearer_token = Some("".to_string());
        assert!(messages(&config)[0].contains("bearer_token"));
    }
}
