// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from pipeline errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stockroom_core::StockroomError;
use stockroom_import::{ErrorKind, ImportError};

/// Non-standard status recorded when the client went away mid-request.
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Errors surfaced by gateway handlers.
#[derive(Debug)]
pub enum ApiError {
    /// A search or import failed.
    Import(ImportError),
    /// The `X-Organization-Id` header is missing or blank.
    MissingOrganization,
    /// The request body is not valid JSON for the endpoint.
    InvalidBody(String),
    /// A direct storage read failed.
    Storage(StockroomError),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::Import(err)
    }
}

impl From<StockroomError> for ApiError {
    fn from(err: StockroomError) -> Self {
        ApiError::Storage(err)
    }
}

impl ApiError {
    /// Status code and caller-safe message.
    ///
    /// Returns `None` for cancellations, which produce no body.
    fn status_and_message(&self) -> Option<(StatusCode, String)> {
        match self {
            ApiError::Import(err) => {
                let status = match err.kind() {
                    ErrorKind::User => match err {
                        ImportError::PluginNotFound(_) => StatusCode::NOT_FOUND,
                        _ => StatusCode::BAD_REQUEST,
                    },
                    ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                    ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
                    ErrorKind::UpstreamNotFound => StatusCode::NOT_FOUND,
                    ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::Cancelled => return None,
                };
                Some((status, err.to_string()))
            }
            ApiError::MissingOrganization => Some((
                StatusCode::BAD_REQUEST,
                "X-Organization-Id header is required".to_string(),
            )),
            ApiError::InvalidBody(detail) => Some((
                StatusCode::BAD_REQUEST,
                format!("invalid request body: {detail}"),
            )),
            ApiError::Storage(err) if err.is_cancelled() => None,
            ApiError::Storage(_) => Some((
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(err) = &self {
            tracing::error!(error = %err, "storage read failed");
        }

        match self.status_and_message() {
            Some((status, error)) => (status, Json(ErrorResponse { error })).into_response(),
            None => {
                tracing::debug!("request cancelled by client");
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                    .unwrap_or(StatusCode::REQUEST_TIMEOUT)
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn user_errors_map_to_client_statuses() {
        assert_eq!(status(ImportError::PluginNotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(ImportError::QueryTooShort { min: 2 }), StatusCode::BAD_REQUEST);
        assert_eq!(status(ImportError::EmptyBody), StatusCode::BAD_REQUEST);
        assert_eq!(status(ApiError::MissingOrganization), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn disabled_plugin_is_unavailable() {
        let err = ImportError::PluginDisabled {
            plugin_id: "books".into(),
            reason: "maintenance".into(),
        };
        assert_eq!(status(err), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn upstream_errors_map_to_bad_gateway_or_not_found() {
        assert_eq!(
            status(ImportError::UpstreamFetch {
                source: StockroomError::upstream("boom"),
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(ImportError::UpstreamNotFound {
                source: StockroomError::not_found("record", "X9"),
            }),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError::Storage(StockroomError::Internal("db path /secret".into()));
        let (status, message) = err.status_and_message().unwrap();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("/secret"));
    }

    #[test]
    fn cancellation_has_no_body() {
        assert!(ApiError::Import(ImportError::Cancelled)
            .status_and_message()
            .is_none());
        assert_eq!(status(ImportError::Cancelled).as_u16(), 499);
    }
}
