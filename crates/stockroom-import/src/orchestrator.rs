// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Import orchestrator: turns one external record into one asset.
//!
//! Steps run in order: resolve plugin, validate the external id, fetch,
//! validate the record, provision the schema, create the asset, then attach
//! the cover image. Only the last step is best-effort.

use std::sync::Arc;

use serde::Serialize;
use stockroom_core::types::{new_id, now_rfc3339};
use stockroom_core::{
    Asset, AssetStore, Attachment, Category, ImportData, ImportPlugin, OrganizationId,
    StockroomError,
};
use stockroom_plugin::PluginRegistry;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cancel::cancellable;
use crate::error::ImportError;
use crate::image::ImageIngestor;
use crate::provision::SchemaProvisioner;
use crate::resolve_enabled_plugin;

/// What happened to the record's cover image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CoverImage {
    Attached { attachment: Attachment },
    /// The record had no image URL, or image ingestion is not configured.
    NotRequested,
    /// Ingestion failed; the asset was still created.
    Failed { warning: String },
}

/// Result of a successful import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub asset: Asset,
    pub category: Category,
    pub cover: CoverImage,
}

impl ImportOutcome {
    /// True when the asset was created but its cover image could not be attached.
    pub fn is_degraded(&self) -> bool {
        matches!(self.cover, CoverImage::Failed { .. })
    }
}

/// Runs imports through registered plugins.
pub struct ImportOrchestrator {
    registry: Arc<PluginRegistry>,
    provisioner: SchemaProvisioner,
    assets: Arc<dyn AssetStore>,
    images: Option<ImageIngestor>,
}

impl ImportOrchestrator {
    pub fn new(
        registry: Arc<PluginRegistry>,
        provisioner: SchemaProvisioner,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            registry,
            provisioner,
            assets,
            images: None,
        }
    }

    /// Enables cover image ingestion.
    pub fn with_image_ingestor(mut self, images: ImageIngestor) -> Self {
        self.images = Some(images);
        self
    }

    /// Imports the record `external_id` from `plugin_id` into `org`.
    pub async fn import(
        &self,
        cancel: &CancellationToken,
        org: &OrganizationId,
        plugin_id: &str,
        external_id: &str,
    ) -> Result<ImportOutcome, ImportError> {
        let plugin = resolve_enabled_plugin(&self.registry, plugin_id)?;

        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(ImportError::MissingExternalId);
        }

        let record = self.fetch(cancel, plugin.as_ref(), external_id).await?;
        if record.name.trim().is_empty() {
            warn!(plugin = %plugin_id, external_id, "plugin returned a record without a name");
            return Err(ImportError::MalformedRecord(
                "record has an empty name".to_string(),
            ));
        }

        let category = self
            .provisioner
            .ensure_category(cancel, org, plugin.as_ref())
            .await
            .inspect_err(|e| log_internal(plugin_id, e))?;

        let attributes = serde_json::to_string(&record.attributes)
            .map_err(|e| ImportError::Serialization { source: e })
            .inspect_err(|e| log_internal(plugin_id, e))?;

        let asset = Asset {
            id: new_id(),
            organization_id: org.clone(),
            name: record.name.trim().to_string(),
            description: record.description.clone(),
            quantity: 1,
            category_id: Some(category.id.clone()),
            attributes,
            import_plugin_id: Some(plugin_id.to_string()),
            import_external_id: Some(external_id.to_string()),
            created_at: now_rfc3339(),
        };

        cancellable(cancel, self.assets.create_asset(&asset))
            .await?
            .map_err(|e| ImportError::AssetPersistence { source: e })
            .inspect_err(|e| log_internal(plugin_id, e))?;

        let cover = self.attach_cover(cancel, &asset, &record).await;

        info!(
            plugin = %plugin_id,
            org = %org,
            asset_id = %asset.id,
            category_id = %category.id,
            degraded = matches!(cover, CoverImage::Failed { .. }),
            "import complete"
        );

        Ok(ImportOutcome {
            asset,
            category,
            cover,
        })
    }

    async fn fetch(
        &self,
        cancel: &CancellationToken,
        plugin: &dyn ImportPlugin,
        external_id: &str,
    ) -> Result<ImportData, ImportError> {
        match cancellable(cancel, plugin.fetch(cancel, external_id)).await? {
            Ok(record) => Ok(record),
            Err(e) if e.is_cancelled() || cancel.is_cancelled() => Err(ImportError::Cancelled),
            Err(e) if is_not_found(&e) => Err(ImportError::UpstreamNotFound { source: e }),
            Err(e) => {
                warn!(plugin = %plugin.id(), external_id, error = %e, "plugin fetch failed");
                Err(ImportError::UpstreamFetch { source: e })
            }
        }
    }

    async fn attach_cover(
        &self,
        cancel: &CancellationToken,
        asset: &Asset,
        record: &ImportData,
    ) -> CoverImage {
        let url = record
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());
        let (Some(url), Some(images)) = (url, &self.images) else {
            return CoverImage::NotRequested;
        };

        match images.ingest(cancel, &asset.id, url).await {
            Ok(attachment) => CoverImage::Attached { attachment },
            Err(e) => {
                warn!(asset_id = %asset.id, url, error = %e, "cover image not attached");
                CoverImage::Failed {
                    warning: format!("cover image not attached: {e}"),
                }
            }
        }
    }
}

/// Plugins report missing records through their error text.
fn is_not_found(err: &StockroomError) -> bool {
    matches!(err, StockroomError::NotFound { .. })
        || err.to_string().to_ascii_lowercase().contains("not found")
}

fn log_internal(plugin_id: &str, err: &ImportError) {
    if err.is_cancelled() {
        return;
    }
    match std::error::Error::source(err) {
        Some(cause) => error!(plugin = %plugin_id, error = %err, cause = %cause, "import failed"),
        None => error!(plugin = %plugin_id, error = %err, "import failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::IngestorConfig;
    use stockroom_plugin::PluginStatus;
    use stockroom_test_utils::{book_record, MemoryFileStore, MemoryStore, MockPlugin};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn org() -> OrganizationId {
        OrganizationId::from("org-1")
    }

    fn registry_with(plugin: Arc<MockPlugin>) -> Arc<PluginRegistry> {
        let mut registry = PluginRegistry::new();
        registry.register(plugin);
        Arc::new(registry)
    }

    fn orchestrator(registry: Arc<PluginRegistry>, store: &Arc<MemoryStore>) -> ImportOrchestrator {
        ImportOrchestrator::new(
            registry,
            SchemaProvisioner::new(store.clone(), store.clone()),
            store.clone(),
        )
    }

    #[tokio::test]
    async fn import_creates_asset_category_and_schema() {
        let store = Arc::new(MemoryStore::new());
        let plugin = Arc::new(MockPlugin::books());
        let orchestrator = orchestrator(registry_with(plugin.clone()), &store);

        let outcome = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "X1")
            .await
            .unwrap();

        assert_eq!(outcome.asset.name, "Dune");
        assert_eq!(outcome.asset.quantity, 1);
        assert_eq!(outcome.asset.category_id.as_deref(), Some(outcome.category.id.as_str()));
        assert_eq!(outcome.asset.import_plugin_id.as_deref(), Some("books"));
        assert_eq!(outcome.asset.import_external_id.as_deref(), Some("X1"));
        assert_eq!(outcome.cover, CoverImage::NotRequested);
        assert!(!outcome.is_degraded());

        let attrs: serde_json::Value = serde_json::from_str(&outcome.asset.attributes).unwrap();
        assert_eq!(attrs["author"], "Frank Herbert");

        let assignments = store.assignments(&outcome.category.id);
        assert_eq!(assignments.len(), plugin.attributes().len());
        for (position, assignment) in assignments.iter().enumerate() {
            assert_eq!(assignment.sort_order, position as i64);
            assert_eq!(assignment.required, plugin.attributes()[position].required);
        }
    }

    #[tokio::test]
    async fn second_import_reuses_provisioned_schema() {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = orchestrator(registry_with(Arc::new(MockPlugin::books())), &store);
        let cancel = CancellationToken::new();

        let first = orchestrator.import(&cancel, &org(), "books", "X1").await.unwrap();
        let second = orchestrator.import(&cancel, &org(), "books", "X2").await.unwrap();

        assert_eq!(first.category.id, second.category.id);
        assert_eq!(store.categories().len(), 1);
        assert_eq!(store.attributes().len(), 2);
        assert_eq!(store.assets().len(), 2);
    }

    #[tokio::test]
    async fn retry_after_assignment_failure_imports_with_full_schema() {
        let store = Arc::new(MemoryStore::new());
        store.fail_set_attributes_once();
        let orchestrator = orchestrator(registry_with(Arc::new(MockPlugin::books())), &store);
        let cancel = CancellationToken::new();

        let err = orchestrator.import(&cancel, &org(), "books", "X1").await.unwrap_err();
        assert!(matches!(err, ImportError::AttributeAssignment { .. }));
        assert!(store.assets().is_empty());

        let outcome = orchestrator.import(&cancel, &org(), "books", "X1").await.unwrap();
        assert_eq!(store.assets().len(), 1);
        assert_eq!(store.categories().len(), 1);
        assert_eq!(store.assignments(&outcome.category.id).len(), 2);
    }

    #[tokio::test]
    async fn blank_external_id_never_calls_plugin() {
        let store = Arc::new(MemoryStore::new());
        let plugin = Arc::new(MockPlugin::books());
        let orchestrator = orchestrator(registry_with(plugin.clone()), &store);

        let err = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingExternalId));
        assert_eq!(plugin.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn disabled_plugin_is_unavailable() {
        let store = Arc::new(MemoryStore::new());
        let mut registry = PluginRegistry::new();
        registry.register_with_status(
            Arc::new(MockPlugin::books()),
            PluginStatus::Disabled {
                reason: "maintenance".into(),
            },
        );
        let orchestrator = orchestrator(Arc::new(registry), &store);

        let err = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "X1")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::PluginDisabled { reason, .. } if reason == "maintenance"));
    }

    #[tokio::test]
    async fn missing_upstream_record_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = orchestrator(registry_with(Arc::new(MockPlugin::books())), &store);

        let err = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "NOPE")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UpstreamNotFound { .. }));
        assert!(store.categories().is_empty());
    }

    #[tokio::test]
    async fn not_found_in_error_text_is_recognized() {
        let store = Arc::new(MemoryStore::new());
        let plugin = Arc::new(MockPlugin::books().failing_fetch("Work NOT FOUND upstream"));
        let orchestrator = orchestrator(registry_with(plugin), &store);

        let err = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "X1")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UpstreamNotFound { .. }));
    }

    #[tokio::test]
    async fn other_fetch_errors_are_upstream_failures() {
        let store = Arc::new(MemoryStore::new());
        let plugin = Arc::new(MockPlugin::books().failing_fetch("HTTP 500"));
        let orchestrator = orchestrator(registry_with(plugin), &store);

        let err = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "X1")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UpstreamFetch { .. }));
        assert_eq!(err.to_string(), "upstream fetch failed");
    }

    #[tokio::test]
    async fn empty_name_creates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let plugin = Arc::new(MockPlugin::books().with_record(book_record("X3", "  ", "Anon", "0")));
        let orchestrator = orchestrator(registry_with(plugin), &store);

        let err = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "X3")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MalformedRecord(_)));
        assert!(store.categories().is_empty());
        assert!(store.assets().is_empty());
    }

    #[tokio::test]
    async fn provisioning_failure_creates_no_asset() {
        let store = Arc::new(MemoryStore::new());
        store.fail_category_create();
        let orchestrator = orchestrator(registry_with(Arc::new(MockPlugin::books())), &store);

        let err = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "X1")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Provisioning { .. }));
        assert!(store.assets().is_empty());
    }

    #[tokio::test]
    async fn asset_failure_leaves_schema_in_place() {
        let store = Arc::new(MemoryStore::new());
        store.fail_asset_create();
        let orchestrator = orchestrator(registry_with(Arc::new(MockPlugin::books())), &store);

        let err = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "X1")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::AssetPersistence { .. }));
        assert_eq!(store.categories().len(), 1);
        assert_eq!(store.attributes().len(), 2);
        assert!(store.assets().is_empty());
    }

    #[tokio::test]
    async fn record_without_image_with_ingestor_is_not_requested() {
        let store = Arc::new(MemoryStore::new());
        let files = Arc::new(MemoryFileStore::new());
        let orchestrator = orchestrator(registry_with(Arc::new(MockPlugin::books())), &store)
            .with_image_ingestor(ImageIngestor::new(
                files.clone(),
                store.clone(),
                IngestorConfig::default(),
            ));

        let outcome = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "X1")
            .await
            .unwrap();
        assert_eq!(outcome.cover, CoverImage::NotRequested);
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn cover_image_is_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0xFF, 0xD8, 0xFF], "image/jpeg"))
            .mount(&server)
            .await;

        let mut record = book_record("X9", "Solaris", "Stanislaw Lem", "9780156027601");
        record.image_url = Some(format!("{}/covers/solaris.jpg", server.uri()));

        let store = Arc::new(MemoryStore::new());
        let files = Arc::new(MemoryFileStore::new());
        let orchestrator = orchestrator(
            registry_with(Arc::new(MockPlugin::books().with_record(record))),
            &store,
        )
        .with_image_ingestor(ImageIngestor::new(
            files.clone(),
            store.clone(),
            IngestorConfig::default(),
        ));

        let outcome = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "X9")
            .await
            .unwrap();

        match &outcome.cover {
            CoverImage::Attached { attachment } => {
                assert_eq!(attachment.asset_id, outcome.asset.id);
                assert_eq!(attachment.filename, "solaris.jpg");
            }
            other => panic!("expected attached cover, got {other:?}"),
        }
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn image_failure_degrades_but_keeps_asset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut record = book_record("X9", "Solaris", "Stanislaw Lem", "9780156027601");
        record.image_url = Some(format!("{}/covers/solaris.jpg", server.uri()));

        let store = Arc::new(MemoryStore::new());
        let orchestrator = orchestrator(
            registry_with(Arc::new(MockPlugin::books().with_record(record))),
            &store,
        )
        .with_image_ingestor(ImageIngestor::new(
            Arc::new(MemoryFileStore::new()),
            store.clone(),
            IngestorConfig::default(),
        ));

        let outcome = orchestrator
            .import(&CancellationToken::new(), &org(), "books", "X9")
            .await
            .unwrap();

        assert!(outcome.is_degraded());
        assert_eq!(store.assets().len(), 1);
        assert!(store.attachments().is_empty());
    }

    #[tokio::test]
    async fn cancelled_fetch_creates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let plugin = Arc::new(MockPlugin::books().hanging());
        let orchestrator = orchestrator(registry_with(plugin.clone()), &store);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = orchestrator
            .import(&cancel, &org(), "books", "X1")
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(plugin.fetch_calls(), 1);
        assert!(store.categories().is_empty());
        assert!(store.assets().is_empty());
    }

    #[test]
    fn cover_status_serializes_with_tag() {
        let json = serde_json::to_value(CoverImage::Failed {
            warning: "timeout".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["warning"], "timeout");

        let json = serde_json::to_value(CoverImage::NotRequested).unwrap();
        assert_eq!(json["status"], "not_requested");
    }
}
