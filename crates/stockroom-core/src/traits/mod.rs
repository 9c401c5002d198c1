// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions consumed by the import pipeline.
//!
//! All collaborators use `#[async_trait]` so they can be held as trait
//! objects behind `Arc<dyn ...>`.

pub mod files;
pub mod plugin;
pub mod storage;

pub use files::FileStore;
pub use plugin::ImportPlugin;
pub use storage::{AssetStore, AttachmentStore, AttributeStore, CategoryStore};
