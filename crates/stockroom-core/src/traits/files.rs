// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob storage trait for uploaded files.

use async_trait::async_trait;

use crate::error::StockroomError;

/// Object storage for attachment payloads.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores `data` under a fresh key and returns that key.
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, StockroomError>;

    /// Deletes the object at `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StockroomError>;
}
