// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the import pipeline.
//!
//! Exposes plugin listing, search, and import over a small REST surface.
//! Every request gets its own cancellation token that fires when the
//! request future is dropped, so a client disconnect aborts in-flight
//! plugin and storage calls.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::{AuthConfig, Organization, ORGANIZATION_HEADER};
pub use error::ApiError;
pub use server::{router, start_server, GatewayState, ServerConfig};
