// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store traits for categories, attributes, assets, and attachments.
//!
//! Create operations must report uniqueness violations as
//! [`StockroomError::Conflict`] so callers can re-read instead of failing.

use async_trait::async_trait;

use crate::error::StockroomError;
use crate::types::{
    Asset, Attachment, Attribute, AttributeAssignment, Category, OrganizationId,
};

/// Persistence for categories and their attribute assignments.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Returns the category provisioned by `plugin_id` for `org`, if any.
    async fn get_by_plugin_id(
        &self,
        org: &OrganizationId,
        plugin_id: &str,
    ) -> Result<Option<Category>, StockroomError>;

    /// Inserts a category. Fails with `Conflict` if `(org, plugin_id)` is taken.
    async fn create_category(&self, category: &Category) -> Result<(), StockroomError>;

    /// Current attribute assignments of a category, ordered by sort order.
    async fn get_attributes(
        &self,
        category_id: &str,
    ) -> Result<Vec<AttributeAssignment>, StockroomError>;

    /// Replaces the category's full attribute assignment set in one unit.
    async fn set_attributes(
        &self,
        category_id: &str,
        assignments: &[AttributeAssignment],
    ) -> Result<(), StockroomError>;
}

/// Persistence for attribute definitions.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Returns the attribute with `key` owned by `org`, if any.
    async fn get_by_key(
        &self,
        org: &OrganizationId,
        key: &str,
    ) -> Result<Option<Attribute>, StockroomError>;

    /// Inserts an attribute. Fails with `Conflict` if `(org, key)` is taken.
    async fn create_attribute(&self, attribute: &Attribute) -> Result<(), StockroomError>;
}

/// Persistence for assets.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn create_asset(&self, asset: &Asset) -> Result<(), StockroomError>;
}

/// Persistence for attachment records.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn create_attachment(&self, attachment: &Attachment) -> Result<(), StockroomError>;
}
