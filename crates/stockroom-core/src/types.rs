// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types for the import pipeline and its storage collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of the organization that owns inventory records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(pub String);

impl OrganizationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrganizationId {
    fn from(value: &str) -> Self {
        OrganizationId(value.to_string())
    }
}

/// Value type of a custom attribute.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Text,
    Date,
}

/// One queryable field a plugin supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchField {
    pub key: String,
    pub label: String,
}

impl SearchField {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// One schema field populated by a plugin's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginAttribute {
    pub key: String,
    pub name: String,
    pub data_type: DataType,
    pub required: bool,
}

impl PluginAttribute {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        data_type: DataType,
        required: bool,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            data_type,
            required,
        }
    }
}

/// A single hit returned by a plugin search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub external_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The normalized external record returned by a plugin fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportData {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// A category owned by an organization, optionally provisioned by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub organization_id: OrganizationId,
    pub name: String,
    pub description: String,
    pub plugin_id: Option<String>,
    pub created_at: String,
}

/// A custom attribute definition, unique per organization by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub organization_id: OrganizationId,
    pub key: String,
    pub name: String,
    pub data_type: DataType,
    pub plugin_id: Option<String>,
    pub created_at: String,
}

/// Membership of an attribute in a category's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeAssignment {
    pub attribute_id: String,
    pub required: bool,
    pub sort_order: i64,
}

/// An inventory asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub organization_id: OrganizationId,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub category_id: Option<String>,
    /// JSON object text holding attribute values keyed by attribute key.
    pub attributes: String,
    pub import_plugin_id: Option<String>,
    pub import_external_id: Option<String>,
    pub created_at: String,
}

/// A file attached to an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub asset_id: String,
    pub storage_key: String,
    pub filename: String,
    pub size: i64,
    pub content_type: String,
    pub description: String,
    pub created_at: String,
}

/// Generates a fresh record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current UTC time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
