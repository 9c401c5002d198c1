// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment operations.

use rusqlite::params;
use stockroom_core::{Attachment, StockroomError};

use crate::database::{map_tr_err, Database};

/// Insert an attachment row for an uploaded object.
pub async fn create_attachment(
    db: &Database,
    attachment: &Attachment,
) -> Result<(), StockroomError> {
    let attachment = attachment.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO attachments (id, asset_id, storage_key, filename, size, content_type,
                                          description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    attachment.id,
                    attachment.asset_id,
                    attachment.storage_key,
                    attachment.filename,
                    attachment.size,
                    attachment.content_type,
                    attachment.description,
                    attachment.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Attachments of an asset, oldest first.
pub async fn list_for_asset(
    db: &Database,
    asset_id: &str,
) -> Result<Vec<Attachment>, StockroomError> {
    let asset_id = asset_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Attachment>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, asset_id, storage_key, filename, size, content_type, description, created_at
                 FROM attachments WHERE asset_id = ?1 ORDER BY created_at, id",
            )?;
            let rows = stmt.query_map(params![asset_id], |row| {
                Ok(Attachment {
                    id: row.get(0)?,
                    asset_id: row.get(1)?,
                    storage_key: row.get(2)?,
                    filename: row.get(3)?,
                    size: row.get(4)?,
                    content_type: row.get(5)?,
                    description: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
