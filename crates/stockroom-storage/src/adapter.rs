// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the record store traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use stockroom_config::StorageConfig;
use stockroom_core::{
    Asset, AssetStore, Attachment, AttachmentStore, Attribute, AttributeAssignment,
    AttributeStore, Category, CategoryStore, OrganizationId, StockroomError,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage for categories, attributes, assets and attachments.
///
/// The database is opened by [`SqliteStorage::initialize`]; every store call
/// before that fails with a storage error.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, StockroomError> {
        self.db.get().ok_or_else(|| StockroomError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Opens the database and applies migrations.
    pub async fn initialize(&self) -> Result<(), StockroomError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| StockroomError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Runs a trivial query to confirm the connection is alive.
    pub async fn health_check(&self) -> Result<(), StockroomError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }

    /// Checkpoints the WAL. Safe to call when never initialized.
    pub async fn close(&self) -> Result<(), StockroomError> {
        match self.db.get() {
            Some(db) => db.close().await,
            None => Ok(()),
        }
    }

    pub async fn get_asset(&self, id: &str) -> Result<Option<Asset>, StockroomError> {
        queries::assets::get_asset(self.db()?, id).await
    }

    pub async fn attachments_for_asset(
        &self,
        asset_id: &str,
    ) -> Result<Vec<Attachment>, StockroomError> {
        queries::attachments::list_for_asset(self.db()?, asset_id).await
    }
}

#[async_trait]
impl CategoryStore for SqliteStorage {
    async fn get_by_plugin_id(
        &self,
        org: &OrganizationId,
        plugin_id: &str,
    ) -> Result<Option<Category>, StockroomError> {
        queries::categories::get_by_plugin_id(self.db()?, org, plugin_id).await
    }

    async fn create_category(&self, category: &Category) -> Result<(), StockroomError> {
        queries::categories::create_category(self.db()?, category).await
    }

    async fn get_attributes(
        &self,
        category_id: &str,
    ) -> Result<Vec<AttributeAssignment>, StockroomError> {
        queries::categories::list_assignments(self.db()?, category_id).await
    }

    async fn set_attributes(
        &self,
        category_id: &str,
        assignments: &[AttributeAssignment],
    ) -> Result<(), StockroomError> {
        queries::categories::set_attributes(self.db()?, category_id, assignments).await
    }
}

#[async_trait]
impl AttributeStore for SqliteStorage {
    async fn get_by_key(
        &self,
        org: &OrganizationId,
        key: &str,
    ) -> Result<Option<Attribute>, StockroomError> {
        queries::attributes::get_by_key(self.db()?, org, key).await
    }

    async fn create_attribute(&self, attribute: &Attribute) -> Result<(), StockroomError> {
        queries::attributes::create_attribute(self.db()?, attribute).await
    }
}

#[async_trait]
impl AssetStore for SqliteStorage {
    async fn create_asset(&self, asset: &Asset) -> Result<(), StockroomError> {
        queries::assets::create_asset(self.db()?, asset).await
    }
}

#[async_trait]
impl AttachmentStore for SqliteStorage {
    async fn create_attachment(&self, attachment: &Attachment) -> Result<(), StockroomError> {
        queries::attachments::create_attachment(self.db()?, attachment).await
    }
}
