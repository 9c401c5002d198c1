// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed outcomes of the search and import entry points.
//!
//! `Display` text is safe to show to callers: upstream and internal variants
//! print a generic message and keep the real cause in `source()` for logging.

use stockroom_core::StockroomError;
use thiserror::Error;

/// Coarse classification used by the presentation layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller can correct the request.
    User,
    /// The plugin exists but is disabled.
    Unavailable,
    /// The external source failed or returned bad data.
    Upstream,
    /// The external source reported that the record does not exist.
    UpstreamNotFound,
    /// This system failed.
    Internal,
    /// The caller went away. Never reported.
    Cancelled,
}

/// Errors returned by the search coordinator and the import orchestrator.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("plugin not found: {0}")]
    PluginNotFound(String),

    #[error("plugin {plugin_id} is disabled: {reason}")]
    PluginDisabled { plugin_id: String, reason: String },

    #[error("query is required")]
    MissingQuery,

    #[error("query must be at least {min} characters")]
    QueryTooShort { min: usize },

    #[error("invalid search field `{field}`, expected one of: {allowed}")]
    InvalidSearchField { field: String, allowed: String },

    #[error("external_id is required")]
    MissingExternalId,

    #[error("request body is required")]
    EmptyBody,

    #[error("upstream search unavailable")]
    UpstreamSearch { source: StockroomError },

    #[error("external record not found")]
    UpstreamNotFound { source: StockroomError },

    #[error("upstream fetch failed")]
    UpstreamFetch { source: StockroomError },

    #[error("upstream returned a malformed record: {0}")]
    MalformedRecord(String),

    #[error("failed to provision schema")]
    Provisioning { source: StockroomError },

    #[error("failed to assign attributes to category")]
    AttributeAssignment { source: StockroomError },

    #[error("failed to serialize attributes")]
    Serialization { source: serde_json::Error },

    #[error("failed to create asset")]
    AssetPersistence { source: StockroomError },

    #[error("operation cancelled")]
    Cancelled,
}

impl ImportError {
    /// Classifies the error for presentation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::PluginNotFound(_)
            | ImportError::MissingQuery
            | ImportError::QueryTooShort { .. }
            | ImportError::InvalidSearchField { .. }
            | ImportError::MissingExternalId
            | ImportError::EmptyBody => ErrorKind::User,
            ImportError::PluginDisabled { .. } => ErrorKind::Unavailable,
            ImportError::UpstreamSearch { .. }
            | ImportError::UpstreamFetch { .. }
            | ImportError::MalformedRecord(_) => ErrorKind::Upstream,
            ImportError::UpstreamNotFound { .. } => ErrorKind::UpstreamNotFound,
            ImportError::Provisioning { .. }
            | ImportError::AttributeAssignment { .. }
            | ImportError::Serialization { .. }
            | ImportError::AssetPersistence { .. } => ErrorKind::Internal,
            ImportError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ImportError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn upstream_display_hides_cause() {
        let err = ImportError::UpstreamSearch {
            source: StockroomError::upstream("HTTP 500 from api.example.com: secret-token=abc"),
        };
        assert_eq!(err.to_string(), "upstream search unavailable");
        assert!(err.source().unwrap().to_string().contains("secret-token"));
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[test]
    fn internal_display_is_generic() {
        let err = ImportError::AssetPersistence {
            source: StockroomError::Internal("disk full".into()),
        };
        assert_eq!(err.to_string(), "failed to create asset");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn user_errors_classify_as_user() {
        for err in [
            ImportError::PluginNotFound("x".into()),
            ImportError::MissingQuery,
            ImportError::QueryTooShort { min: 2 },
            ImportError::MissingExternalId,
            ImportError::EmptyBody,
        ] {
            assert_eq!(err.kind(), ErrorKind::User, "{err}");
        }
    }

    #[test]
    fn disabled_carries_reason() {
        let err = ImportError::PluginDisabled {
            plugin_id: "books".into(),
            reason: "quota exhausted".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(err.to_string().contains("quota exhausted"));
    }
}
