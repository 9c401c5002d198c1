// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory-backed [`FileStore`].
//!
//! Objects live at `<root>/<uuid>/<sanitized filename>`; the key is the path
//! relative to the root.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use stockroom_core::types::new_id;
use stockroom_core::{FileStore, StockroomError};
use tracing::debug;

const MAX_FILENAME_CHARS: usize = 128;

/// Stores attachment payloads on the local filesystem.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `key`, rejecting keys that would escape the root.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StockroomError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(StockroomError::Internal(format!(
                "invalid storage key: {key}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

/// Reduces a filename to `[A-Za-z0-9._-]`, never empty and never hidden.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn upload(
        &self,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, StockroomError> {
        let key = format!("{}/{}", new_id(), sanitize_filename(filename));
        let path = self.path_for(&key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StockroomError::storage)?;
        }
        tokio::fs::write(&path, &data)
            .await
            .map_err(StockroomError::storage)?;
        debug!(key = %key, bytes = data.len(), "stored file");
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), StockroomError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StockroomError::storage(e)),
        }
        // The per-object directory is empty now; failure to remove it is harmless.
        if let Some(parent) = path.parent().filter(|p| *p != self.root) {
            let _ = tokio::fs::remove_dir(parent).await;
        }
        debug!(key, "deleted file");
        Ok(())
    }
}
