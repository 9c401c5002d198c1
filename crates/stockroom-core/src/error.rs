// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by Stockroom collaborators.

use thiserror::Error;

/// The error type returned by plugins and storage collaborators.
#[derive(Debug, Error)]
pub enum StockroomError {
    /// Storage backend errors (database connection, query failure, I/O).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A uniqueness constraint rejected the write because the row already exists.
    #[error("{entity} already exists: {key}")]
    Conflict { entity: String, key: String },

    /// The requested record does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// An external source failed (HTTP error, bad payload, rate limiting).
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StockroomError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StockroomError::Storage {
            source: Box::new(err),
        }
    }

    /// Builds an upstream failure with a message and no source.
    pub fn upstream(message: impl Into<String>) -> Self {
        StockroomError::Upstream {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a not-found error for the given entity and key.
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        StockroomError::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Returns true for uniqueness conflicts.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StockroomError::Conflict { .. })
    }

    /// Returns true when the error represents caller cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StockroomError::Cancelled)
    }
}
