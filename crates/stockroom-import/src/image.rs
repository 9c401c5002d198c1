// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cover image ingestion.
//!
//! Downloads a remote image, checks that it really is an image, stores the
//! bytes in the file store and records an attachment on the asset. The body
//! is capped at `max_bytes`; anything past the cap is dropped unread.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use percent_encoding::percent_decode_str;
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use stockroom_core::types::{new_id, now_rfc3339};
use stockroom_core::{Attachment, AttachmentStore, FileStore, StockroomError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cancel::cancellable;

/// Description stored on every ingested cover attachment.
pub const COVER_DESCRIPTION: &str = "Imported cover image";

/// Filename used when the URL path has no usable last segment.
const DEFAULT_FILENAME: &str = "cover";

/// Download limits for cover images.
#[derive(Debug, Clone)]
pub struct IngestorConfig {
    /// Deadline for the whole download, layered under the caller's token.
    pub timeout: Duration,
    /// Bytes kept from the response body.
    pub max_bytes: usize,
    pub user_agent: String,
}

impl Default for IngestorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_bytes: 10 * 1024 * 1024,
            user_agent: format!("stockroom/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Why a cover image was not attached.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("image download failed: {source}")]
    Download { source: reqwest::Error },

    #[error("image download timed out after {0:?}")]
    Timeout(Duration),

    #[error("image server returned HTTP {status}")]
    Status { status: u16 },

    #[error("downloaded content is not an image: {content_type}")]
    NotAnImage { content_type: String },

    #[error("failed to store image: {source}")]
    Upload { source: StockroomError },

    #[error("failed to create attachment: {source}")]
    AttachmentPersistence { source: StockroomError },

    #[error("image ingestion cancelled")]
    Cancelled,
}

/// A downloaded body plus the normalized `Content-Type` header, if any.
struct Downloaded {
    header_type: Option<String>,
    data: Vec<u8>,
}

/// Fetches cover images and stores them as asset attachments.
pub struct ImageIngestor {
    client: reqwest::Client,
    files: Arc<dyn FileStore>,
    attachments: Arc<dyn AttachmentStore>,
    config: IngestorConfig,
}

impl ImageIngestor {
    pub fn new(
        files: Arc<dyn FileStore>,
        attachments: Arc<dyn AttachmentStore>,
        config: IngestorConfig,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            files,
            attachments,
            config,
        }
    }

    /// Downloads `image_url` and attaches it to `asset_id`.
    ///
    /// If the attachment row cannot be written, the uploaded object is
    /// deleted before the error is returned.
    pub async fn ingest(
        &self,
        cancel: &CancellationToken,
        asset_id: &str,
        image_url: &str,
    ) -> Result<Attachment, ImageError> {
        let url = parse_image_url(image_url)?;

        let download = tokio::time::timeout(self.config.timeout, self.download(url.clone()));
        let downloaded = match cancellable(cancel, download).await {
            Err(_) => return Err(ImageError::Cancelled),
            Ok(Err(_elapsed)) => return Err(ImageError::Timeout(self.config.timeout)),
            Ok(Ok(result)) => result?,
        };

        let content_type = resolve_content_type(downloaded.header_type, &downloaded.data)?;
        let filename = derive_filename(&url, &content_type);
        let size = downloaded.data.len() as i64;

        let key = cancellable(
            cancel,
            self.files.upload(&filename, &content_type, downloaded.data),
        )
        .await
        .map_err(|_| ImageError::Cancelled)?
        .map_err(|e| ImageError::Upload { source: e })?;

        let attachment = Attachment {
            id: new_id(),
            asset_id: asset_id.to_string(),
            storage_key: key.clone(),
            filename,
            size,
            content_type,
            description: COVER_DESCRIPTION.to_string(),
            created_at: now_rfc3339(),
        };

        let created = match cancellable(cancel, self.attachments.create_attachment(&attachment)).await
        {
            Ok(Ok(())) => Ok(attachment),
            Ok(Err(e)) => Err(ImageError::AttachmentPersistence { source: e }),
            Err(_) => Err(ImageError::Cancelled),
        };

        if created.is_err() {
            self.discard_upload(&key).await;
        } else {
            debug!(asset_id, key = %key, size, "cover image attached");
        }
        created
    }

    async fn download(&self, url: Url) -> Result<Downloaded, ImageError> {
        let mut response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| ImageError::Download { source: e })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status {
                status: status.as_u16(),
            });
        }

        let header_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(normalize_content_type)
            .filter(|ct| !ct.is_empty());

        let max = self.config.max_bytes;
        let mut data = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ImageError::Download { source: e })?
        {
            let take = chunk.len().min(max - data.len());
            data.extend_from_slice(&chunk[..take]);
            if data.len() >= max {
                debug!(max_bytes = max, "image body reached size cap, truncating");
                break;
            }
        }

        Ok(Downloaded { header_type, data })
    }

    async fn discard_upload(&self, key: &str) {
        if let Err(e) = self.files.delete(key).await {
            warn!(key, error = %e, "failed to delete orphaned cover image");
        }
    }
}

/// Accepts only absolute `http` and `https` URLs.
fn parse_image_url(raw: &str) -> Result<Url, ImageError> {
    let url = Url::parse(raw.trim()).map_err(|e| ImageError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ImageError::InvalidUrl(format!(
            "scheme '{other}' not allowed, only http and https"
        ))),
    }
}

/// Strips parameters and lowercases a `Content-Type` value.
fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Trusts an `image/*` header; otherwise sniffs the bytes.
fn resolve_content_type(header: Option<String>, data: &[u8]) -> Result<String, ImageError> {
    if let Some(ct) = header.as_deref().filter(|ct| ct.starts_with("image/")) {
        return Ok(ct.to_string());
    }

    match infer::get(data) {
        Some(kind) if kind.mime_type().starts_with("image/") => Ok(kind.mime_type().to_string()),
        Some(kind) => Err(ImageError::NotAnImage {
            content_type: kind.mime_type().to_string(),
        }),
        None => Err(ImageError::NotAnImage {
            content_type: header.unwrap_or_else(|| "unknown".to_string()),
        }),
    }
}

/// Last URL path segment (query ignored, percent-decoded), with an
/// extension added when missing.
fn derive_filename(url: &Url, content_type: &str) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().trim().to_string())
        .filter(|s| !s.is_empty());
    let base = segment.as_deref().unwrap_or(DEFAULT_FILENAME);

    if Path::new(base).extension().is_some() {
        return base.to_string();
    }
    match extension_for(content_type) {
        Some(ext) => format!("{base}.{ext}"),
        None => base.to_string(),
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    let ext = match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        other => return mime_guess::get_mime_extensions_str(other)?.first().copied(),
    };
    Some(ext)
}
