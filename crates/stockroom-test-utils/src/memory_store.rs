// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory record and file stores with failure injection.
//!
//! `MemoryStore` enforces the same uniqueness rules as the SQLite backend
//! (`(organization, plugin_id)` for categories, `(organization, key)` for
//! attributes) and can simulate a concurrent provisioner winning the race.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use stockroom_core::types::{new_id, now_rfc3339};
use stockroom_core::{
    Asset, AssetStore, Attachment, AttachmentStore, Attribute, AttributeAssignment,
    AttributeStore, Category, CategoryStore, FileStore, OrganizationId, StockroomError,
};

#[derive(Default)]
struct Records {
    categories: Vec<Category>,
    attributes: Vec<Attribute>,
    assignments: HashMap<String, Vec<AttributeAssignment>>,
    assets: Vec<Asset>,
    attachments: Vec<Attachment>,
    attribute_creates: usize,
    set_attributes_calls: usize,
}

#[derive(Default)]
struct Faults {
    category_create: bool,
    attribute_create_on: Option<usize>,
    set_attributes: bool,
    set_attributes_once: bool,
    asset_create: bool,
    attachment_create: bool,
    category_race: bool,
    attribute_race: bool,
}

fn injected(operation: &str) -> StockroomError {
    StockroomError::Internal(format!("injected failure: {operation}"))
}

/// In-memory implementation of every record store trait.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, Records> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // --- Failure injection ---

    pub fn fail_category_create(&self) {
        self.faults().category_create = true;
    }

    /// Fails the `n`th attribute insert (1-based) and every one after it.
    pub fn fail_attribute_create_on(&self, n: usize) {
        self.faults().attribute_create_on = Some(n);
    }

    pub fn fail_set_attributes(&self) {
        self.faults().set_attributes = true;
    }

    /// Fails only the next assignment replacement.
    pub fn fail_set_attributes_once(&self) {
        self.faults().set_attributes_once = true;
    }

    pub fn fail_asset_create(&self) {
        self.faults().asset_create = true;
    }

    pub fn fail_attachment_create(&self) {
        self.faults().attachment_create = true;
    }

    /// Removes every injected failure.
    pub fn clear_faults(&self) {
        *self.faults() = Faults::default();
    }

    /// The next category insert loses to a concurrently provisioned row.
    pub fn simulate_category_race(&self) {
        self.faults().category_race = true;
    }

    /// The next attribute insert loses to a concurrently provisioned row.
    pub fn simulate_attribute_race(&self) {
        self.faults().attribute_race = true;
    }

    // --- Inspection ---

    pub fn categories(&self) -> Vec<Category> {
        self.records().categories.clone()
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.records().attributes.clone()
    }

    pub fn assets(&self) -> Vec<Asset> {
        self.records().assets.clone()
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.records().attachments.clone()
    }

    /// Current assignment set of a category, ordered as stored.
    pub fn assignments(&self, category_id: &str) -> Vec<AttributeAssignment> {
        self.records()
            .assignments
            .get(category_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of successful assignment replacements.
    pub fn set_attributes_calls(&self) -> usize {
        self.records().set_attributes_calls
    }

    /// Seeds a category directly, bypassing fault injection.
    pub fn insert_category(&self, category: Category) {
        self.records().categories.push(category);
    }

    /// Seeds an attribute directly, bypassing fault injection.
    pub fn insert_attribute(&self, attribute: Attribute) {
        self.records().attributes.push(attribute);
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn get_by_plugin_id(
        &self,
        org: &OrganizationId,
        plugin_id: &str,
    ) -> Result<Option<Category>, StockroomError> {
        Ok(self
            .records()
            .categories
            .iter()
            .find(|c| &c.organization_id == org && c.plugin_id.as_deref() == Some(plugin_id))
            .cloned())
    }

    async fn create_category(&self, category: &Category) -> Result<(), StockroomError> {
        let race = {
            let mut faults = self.faults();
            if faults.category_create {
                return Err(injected("create_category"));
            }
            std::mem::take(&mut faults.category_race)
        };

        let mut records = self.records();
        if race {
            records.categories.push(Category {
                id: new_id(),
                created_at: now_rfc3339(),
                ..category.clone()
            });
        }
        if let Some(plugin_id) = &category.plugin_id {
            let taken = records.categories.iter().any(|c| {
                c.organization_id == category.organization_id
                    && c.plugin_id.as_ref() == Some(plugin_id)
            });
            if taken {
                return Err(StockroomError::Conflict {
                    entity: "category".into(),
                    key: format!("{}/{plugin_id}", category.organization_id),
                });
            }
        }
        records.categories.push(category.clone());
        Ok(())
    }

    async fn get_attributes(
        &self,
        category_id: &str,
    ) -> Result<Vec<AttributeAssignment>, StockroomError> {
        Ok(self.assignments(category_id))
    }

    async fn set_attributes(
        &self,
        category_id: &str,
        assignments: &[AttributeAssignment],
    ) -> Result<(), StockroomError> {
        {
            let mut faults = self.faults();
            if faults.set_attributes || std::mem::take(&mut faults.set_attributes_once) {
                return Err(injected("set_attributes"));
            }
        }
        let mut records = self.records();
        records.set_attributes_calls += 1;
        records
            .assignments
            .insert(category_id.to_string(), assignments.to_vec());
        Ok(())
    }
}

#[async_trait]
impl AttributeStore for MemoryStore {
    async fn get_by_key(
        &self,
        org: &OrganizationId,
        key: &str,
    ) -> Result<Option<Attribute>, StockroomError> {
        Ok(self
            .records()
            .attributes
            .iter()
            .find(|a| &a.organization_id == org && a.key == key)
            .cloned())
    }

    async fn create_attribute(&self, attribute: &Attribute) -> Result<(), StockroomError> {
        let mut faults = self.faults();
        let mut records = self.records();
        records.attribute_creates += 1;
        let attempt = records.attribute_creates;

        if faults.attribute_create_on.is_some_and(|n| attempt >= n) {
            return Err(injected("create_attribute"));
        }
        let race = std::mem::take(&mut faults.attribute_race);
        drop(faults);

        if race {
            records.attributes.push(Attribute {
                id: new_id(),
                created_at: now_rfc3339(),
                ..attribute.clone()
            });
        }
        let taken = records.attributes.iter().any(|a| {
            a.organization_id == attribute.organization_id && a.key == attribute.key
        });
        if taken {
            return Err(StockroomError::Conflict {
                entity: "attribute".into(),
                key: format!("{}/{}", attribute.organization_id, attribute.key),
            });
        }
        records.attributes.push(attribute.clone());
        Ok(())
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn create_asset(&self, asset: &Asset) -> Result<(), StockroomError> {
        if self.faults().asset_create {
            return Err(injected("create_asset"));
        }
        self.records().assets.push(asset.clone());
        Ok(())
    }
}

#[async_trait]
impl AttachmentStore for MemoryStore {
    async fn create_attachment(&self, attachment: &Attachment) -> Result<(), StockroomError> {
        if self.faults().attachment_create {
            return Err(injected("create_attachment"));
        }
        self.records().attachments.push(attachment.clone());
        Ok(())
    }
}

/// A stored object in [`MemoryFileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct FileState {
    objects: HashMap<String, StoredObject>,
    deleted: Vec<String>,
    fail_upload: bool,
}

/// In-memory [`FileStore`] that records deletions.
#[derive(Default)]
pub struct MemoryFileStore {
    state: Mutex<FileState>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FileState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn fail_upload(&self) {
        self.state().fail_upload = true;
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.state().objects.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().objects.is_empty()
    }

    /// Keys passed to `delete`, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.state().deleted.clone()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, StockroomError> {
        let mut state = self.state();
        if state.fail_upload {
            return Err(injected("upload"));
        }
        let key = format!("{}/{filename}", new_id());
        state.objects.insert(
            key.clone(),
            StoredObject {
                filename: filename.to_string(),
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), StockroomError> {
        let mut state = self.state();
        state.objects.remove(key);
        state.deleted.push(key.to_string());
        Ok(())
    }
}
