// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `stockroom serve` command implementation.
//!
//! Opens SQLite storage and the local file store, assembles the plugin
//! registry and import pipeline, and runs the HTTP gateway until a
//! shutdown signal arrives.

use std::sync::Arc;

use stockroom_config::{ImportConfig, StockroomConfig};
use stockroom_core::StockroomError;
use stockroom_gateway::{AuthConfig, GatewayState, ServerConfig};
use stockroom_import::{
    ImageIngestor, ImportOrchestrator, IngestorConfig, SchemaProvisioner, SearchCoordinator,
};
use stockroom_storage::{LocalFileStore, SqliteStorage};
use tracing::{info, warn};

use crate::plugins;
use crate::shutdown;

/// Runs the `stockroom serve` command.
pub async fn run_serve(config: StockroomConfig) -> Result<(), StockroomError> {
    init_tracing(&config.server.log_level);

    info!("starting stockroom serve");

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };
    let files = Arc::new(LocalFileStore::new(&config.storage.files_path));

    let registry = Arc::new(plugins::build_registry(
        plugins::compiled_plugins(),
        &config,
    ));

    let provisioner = SchemaProvisioner::new(storage.clone(), storage.clone());
    let mut orchestrator = ImportOrchestrator::new(registry.clone(), provisioner, storage.clone());
    if config.import.download_images {
        let ingestor = ImageIngestor::new(files, storage.clone(), ingestor_config(&config.import));
        orchestrator = orchestrator.with_image_ingestor(ingestor);
    } else {
        info!("cover image downloads disabled");
    }

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set; all /v1 requests will be rejected");
    }

    let state = GatewayState {
        registry: registry.clone(),
        search: Arc::new(SearchCoordinator::new(registry)),
        orchestrator: Arc::new(orchestrator),
        categories: storage.clone(),
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let cancel = shutdown::install_signal_handler();
    let result =
        stockroom_gateway::start_server(&server_config, state, cancel.cancelled_owned()).await;

    storage.close().await?;
    result?;

    info!("stockroom serve shutdown complete");
    Ok(())
}

/// Maps the `[import]` section onto the image ingestor's settings.
fn ingestor_config(import: &ImportConfig) -> IngestorConfig {
    IngestorConfig {
        timeout: import.image_timeout(),
        max_bytes: usize::try_from(import.max_image_bytes).unwrap_or(usize::MAX),
        user_agent: import.user_agent.clone(),
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stockroom={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
