// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema provisioner: lazily creates the category and attributes a plugin needs.
//!
//! Provisioning is lookup-then-create. The storage layer carries unique
//! indexes on `(organization, plugin_id)` and `(organization, key)`; when a
//! concurrent import wins a create, the store answers `Conflict` and the
//! provisioner re-reads the winner's row instead of failing.

use std::sync::Arc;

use stockroom_core::types::{new_id, now_rfc3339};
use stockroom_core::{
    Attribute, AttributeAssignment, AttributeStore, Category, CategoryStore, ImportPlugin,
    OrganizationId, PluginAttribute, StockroomError,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cancel::cancellable;
use crate::error::ImportError;

/// Ensures a plugin's category and attribute schema exist for an organization.
pub struct SchemaProvisioner {
    categories: Arc<dyn CategoryStore>,
    attributes: Arc<dyn AttributeStore>,
}

impl SchemaProvisioner {
    pub fn new(categories: Arc<dyn CategoryStore>, attributes: Arc<dyn AttributeStore>) -> Self {
        Self {
            categories,
            attributes,
        }
    }

    /// Returns the plugin's category for `org`, provisioning it on first use.
    ///
    /// Every declared attribute is assigned to the returned category in
    /// declaration order, whether the category was created here, reused, or
    /// won by a concurrent import. A category left incomplete by an earlier
    /// failed import is completed here.
    pub async fn ensure_category(
        &self,
        cancel: &CancellationToken,
        org: &OrganizationId,
        plugin: &dyn ImportPlugin,
    ) -> Result<Category, ImportError> {
        let category = match self.find_category(cancel, org, plugin.id()).await? {
            Some(existing) => {
                debug!(plugin = %plugin.id(), category_id = %existing.id, "reusing provisioned category");
                existing
            }
            None => self.create_category(cancel, org, plugin).await?,
        };

        self.ensure_assignments(cancel, org, plugin, &category).await?;
        Ok(category)
    }

    async fn create_category(
        &self,
        cancel: &CancellationToken,
        org: &OrganizationId,
        plugin: &dyn ImportPlugin,
    ) -> Result<Category, ImportError> {
        let category = Category {
            id: new_id(),
            organization_id: org.clone(),
            name: plugin.category_name().to_string(),
            description: plugin.category_description().to_string(),
            plugin_id: Some(plugin.id().to_string()),
            created_at: now_rfc3339(),
        };

        match cancellable(cancel, self.categories.create_category(&category)).await? {
            Ok(()) => {
                info!(
                    plugin = %plugin.id(),
                    org = %org,
                    category_id = %category.id,
                    "provisioned import category"
                );
                Ok(category)
            }
            Err(e) if e.is_conflict() => {
                debug!(plugin = %plugin.id(), "category provisioned concurrently, re-reading");
                self.find_category(cancel, org, plugin.id())
                    .await?
                    .ok_or_else(|| ImportError::Provisioning {
                        source: StockroomError::not_found("category", plugin.id()),
                    })
            }
            Err(e) => Err(ImportError::Provisioning { source: e }),
        }
    }

    /// Makes sure every declared attribute is assigned to `category`.
    ///
    /// The assignment set is replaced only when some declared assignment is
    /// missing or differs; a complete set is left alone.
    async fn ensure_assignments(
        &self,
        cancel: &CancellationToken,
        org: &OrganizationId,
        plugin: &dyn ImportPlugin,
        category: &Category,
    ) -> Result<(), ImportError> {
        let wanted = self.ensure_attributes(cancel, org, plugin).await?;

        let current = cancellable(cancel, self.categories.get_attributes(&category.id))
            .await?
            .map_err(|e| ImportError::AttributeAssignment { source: e })?;
        if wanted.iter().all(|w| current.contains(w)) {
            return Ok(());
        }

        cancellable(cancel, self.categories.set_attributes(&category.id, &wanted))
            .await?
            .map_err(|e| ImportError::AttributeAssignment { source: e })?;

        info!(
            plugin = %plugin.id(),
            category_id = %category.id,
            attributes = wanted.len(),
            previously_assigned = current.len(),
            "assigned category attributes"
        );
        Ok(())
    }

    async fn find_category(
        &self,
        cancel: &CancellationToken,
        org: &OrganizationId,
        plugin_id: &str,
    ) -> Result<Option<Category>, ImportError> {
        cancellable(cancel, self.categories.get_by_plugin_id(org, plugin_id))
            .await?
            .map_err(|e| ImportError::Provisioning { source: e })
    }

    /// Looks up or creates each declared attribute, in declaration order.
    async fn ensure_attributes(
        &self,
        cancel: &CancellationToken,
        org: &OrganizationId,
        plugin: &dyn ImportPlugin,
    ) -> Result<Vec<AttributeAssignment>, ImportError> {
        let mut assignments = Vec::with_capacity(plugin.attributes().len());

        for (position, declared) in plugin.attributes().iter().enumerate() {
            let attribute = self.ensure_attribute(cancel, org, plugin.id(), declared).await?;
            assignments.push(AttributeAssignment {
                attribute_id: attribute.id,
                required: declared.required,
                sort_order: position as i64,
            });
        }

        Ok(assignments)
    }

    async fn ensure_attribute(
        &self,
        cancel: &CancellationToken,
        org: &OrganizationId,
        plugin_id: &str,
        declared: &PluginAttribute,
    ) -> Result<Attribute, ImportError> {
        if let Some(existing) = self.find_attribute(cancel, org, &declared.key).await? {
            return Ok(existing);
        }

        let attribute = Attribute {
            id: new_id(),
            organization_id: org.clone(),
            key: declared.key.clone(),
            name: declared.name.clone(),
            data_type: declared.data_type,
            plugin_id: Some(plugin_id.to_string()),
            created_at: now_rfc3339(),
        };

        match cancellable(cancel, self.attributes.create_attribute(&attribute)).await? {
            Ok(()) => {
                debug!(key = %attribute.key, attribute_id = %attribute.id, "created attribute");
                Ok(attribute)
            }
            Err(e) if e.is_conflict() => self
                .find_attribute(cancel, org, &declared.key)
                .await?
                .ok_or_else(|| ImportError::Provisioning {
                    source: StockroomError::not_found("attribute", &declared.key),
                }),
            Err(e) => Err(ImportError::Provisioning { source: e }),
        }
    }

    async fn find_attribute(
        &self,
        cancel: &CancellationToken,
        org: &OrganizationId,
        key: &str,
    ) -> Result<Option<Attribute>, ImportError> {
        cancellable(cancel, self.attributes.get_by_key(org, key))
            .await?
            .map_err(|e| ImportError::Provisioning { source: e })
    }
}
