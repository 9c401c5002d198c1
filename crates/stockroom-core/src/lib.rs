// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Stockroom.
//!
//! This crate provides the error type, domain types, and collaborator traits
//! shared by the import pipeline, the storage backend, and the HTTP gateway.
//! Import sources implement [`ImportPlugin`]; persistence backends implement
//! the store traits.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StockroomError;
pub use types::{
    Asset, Attachment, Attribute, AttributeAssignment, Category, DataType, ImportData,
    OrganizationId, PluginAttribute, SearchField, SearchResult,
};

pub use traits::{
    AssetStore, AttachmentStore, AttributeStore, CategoryStore, FileStore, ImportPlugin,
};
