// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asset operations.

use rusqlite::params;
use stockroom_core::{Asset, OrganizationId, StockroomError};

use crate::database::{map_tr_err, Database};

/// Insert an asset.
pub async fn create_asset(db: &Database, asset: &Asset) -> Result<(), StockroomError> {
    let asset = asset.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO assets (id, organization_id, name, description, quantity, category_id,
                                     attributes, import_plugin_id, import_external_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    asset.id,
                    asset.organization_id.as_str(),
                    asset.name,
                    asset.description,
                    asset.quantity,
                    asset.category_id,
                    asset.attributes,
                    asset.import_plugin_id,
                    asset.import_external_id,
                    asset.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get an asset by ID.
pub async fn get_asset(db: &Database, id: &str) -> Result<Option<Asset>, StockroomError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Asset>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, organization_id, name, description, quantity, category_id,
                        attributes, import_plugin_id, import_external_id, created_at
                 FROM assets WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                Ok(Asset {
                    id: row.get(0)?,
                    organization_id: OrganizationId(row.get(1)?),
                    name: row.get(2)?,
                    description: row.get(3)?,
                    quantity: row.get(4)?,
                    category_id: row.get(5)?,
                    attributes: row.get(6)?,
                    import_plugin_id: row.get(7)?,
                    import_external_id: row.get(8)?,
                    created_at: row.get(9)?,
                })
            });
            match result {
                Ok(asset) => Ok(Some(asset)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}
