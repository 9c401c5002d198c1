// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for Stockroom's import pipeline.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`, plus a directory-backed
//! file store for attachment payloads. Unique indexes on
//! `(organization_id, plugin_id)` and `(organization_id, key)` turn concurrent
//! provisioning races into `StockroomError::Conflict`.

pub mod adapter;
pub mod database;
pub mod files;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use files::LocalFileStore;
