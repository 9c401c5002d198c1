// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Stockroom.
//!
//! Provides deterministic doubles for every collaborator of the import
//! pipeline so tests run without network access or a database.
//!
//! # Components
//!
//! - [`MockPlugin`] - Scripted import plugin with call counters
//! - [`MemoryStore`] - In-memory record stores with failure injection
//! - [`MemoryFileStore`] - In-memory blob store that records deletions

pub mod memory_store;
pub mod mock_plugin;

pub use memory_store::{MemoryFileStore, MemoryStore, StoredObject};
pub use mock_plugin::{book_record, MockPlugin, SearchCall};

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::types::{new_id, now_rfc3339};
    use stockroom_core::{Category, CategoryStore, FileStore, ImportPlugin, OrganizationId};
    use tokio_util::sync::CancellationToken;

    fn category(org: &str, plugin_id: &str) -> Category {
        Category {
            id: new_id(),
            organization_id: OrganizationId::from(org),
            name: "Books".into(),
            description: String::new(),
            plugin_id: Some(plugin_id.into()),
            created_at: now_rfc3339(),
        }
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicate_plugin_category() {
        let store = MemoryStore::new();
        store.create_category(&category("org-1", "books")).await.unwrap();

        let err = store
            .create_category(&category("org-1", "books"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // Another organization may provision the same plugin.
        store.create_category(&category("org-2", "books")).await.unwrap();
        assert_eq!(store.categories().len(), 2);
    }

    #[tokio::test]
    async fn simulated_race_inserts_winner_and_conflicts() {
        let store = MemoryStore::new();
        store.simulate_category_race();

        let err = store
            .create_category(&category("org-1", "books"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.categories().len(), 1);

        let winner = store
            .get_by_plugin_id(&OrganizationId::from("org-1"), "books")
            .await
            .unwrap();
        assert!(winner.is_some());
    }

    #[tokio::test]
    async fn mock_plugin_counts_calls_and_serves_records() {
        let plugin = MockPlugin::books();
        let cancel = CancellationToken::new();

        let record = plugin.fetch(&cancel, "X1").await.unwrap();
        assert_eq!(record.name, "Dune");

        let missing = plugin.fetch(&cancel, "nope").await.unwrap_err();
        assert!(missing.to_string().contains("not found"));
        assert_eq!(plugin.fetch_calls(), 2);
        assert_eq!(plugin.search_calls(), 0);
    }

    #[tokio::test]
    async fn memory_file_store_tracks_deletes() {
        let files = MemoryFileStore::new();
        let key = files
            .upload("cover.jpg", "image/jpeg", vec![1, 2, 3])
            .await
            .unwrap();
        assert!(key.ends_with("/cover.jpg"));
        assert_eq!(files.len(), 1);

        files.delete(&key).await.unwrap();
        assert!(files.is_empty());
        assert_eq!(files.deleted(), vec![key]);
    }
}
