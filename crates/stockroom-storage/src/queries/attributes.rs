// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attribute definition operations.

use std::str::FromStr;

use rusqlite::params;
use rusqlite::types::Type;
use stockroom_core::{Attribute, DataType, OrganizationId, StockroomError};

use crate::database::{is_unique_violation, map_tr_err, Database};

fn row_to_attribute(row: &rusqlite::Row<'_>) -> rusqlite::Result<Attribute> {
    let data_type: String = row.get(4)?;
    let data_type = DataType::from_str(&data_type)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(Attribute {
        id: row.get(0)?,
        organization_id: OrganizationId(row.get(1)?),
        key: row.get(2)?,
        name: row.get(3)?,
        data_type,
        plugin_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// The attribute with `key` in `org`, if any.
pub async fn get_by_key(
    db: &Database,
    org: &OrganizationId,
    key: &str,
) -> Result<Option<Attribute>, StockroomError> {
    let org = org.as_str().to_string();
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Attribute>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, organization_id, key, name, data_type, plugin_id, created_at
                 FROM attributes WHERE organization_id = ?1 AND key = ?2",
            )?;
            match stmt.query_row(params![org, key], row_to_attribute) {
                Ok(attribute) => Ok(Some(attribute)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert an attribute. A second attribute with the same key in the same
/// organization is a `Conflict`.
pub async fn create_attribute(db: &Database, attribute: &Attribute) -> Result<(), StockroomError> {
    let attribute = attribute.clone();
    let key = format!("{}/{}", attribute.organization_id, attribute.key);
    let inserted = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let result = conn.execute(
                "INSERT INTO attributes (id, organization_id, key, name, data_type, plugin_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    attribute.id,
                    attribute.organization_id.as_str(),
                    attribute.key,
                    attribute.name,
                    attribute.data_type.to_string(),
                    attribute.plugin_id,
                    attribute.created_at,
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    if inserted {
        Ok(())
    } else {
        Err(StockroomError::Conflict {
            entity: "attribute".to_string(),
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_attribute(id: &str, org: &str, key: &str, data_type: DataType) -> Attribute {
        Attribute {
            id: id.to_string(),
            organization_id: OrganizationId::from(org),
            key: key.to_string(),
            name: "Published".to_string(),
            data_type,
            plugin_id: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn data_type_survives_storage() {
        let (db, _dir) = setup_db().await;
        create_attribute(&db, &make_attribute("a1", "org-1", "published", DataType::Date))
            .await
            .unwrap();

        let found = get_by_key(&db, &OrganizationId::from("org-1"), "published")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "a1");
        assert_eq!(found.data_type, DataType::Date);
        assert!(found.plugin_id.is_none());
    }

    #[tokio::test]
    async fn duplicate_key_in_org_is_conflict() {
        let (db, _dir) = setup_db().await;
        create_attribute(&db, &make_attribute("a1", "org-1", "isbn", DataType::String))
            .await
            .unwrap();

        let err = create_attribute(&db, &make_attribute("a2", "org-1", "isbn", DataType::String))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("org-1/isbn"));
    }

    #[tokio::test]
    async fn same_key_in_other_org_is_allowed() {
        let (db, _dir) = setup_db().await;
        create_attribute(&db, &make_attribute("a1", "org-1", "isbn", DataType::String))
            .await
            .unwrap();
        create_attribute(&db, &make_attribute("a2", "org-2", "isbn", DataType::String))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let (db, _dir) = setup_db().await;
        let found = get_by_key(&db, &OrganizationId::from("org-1"), "nope")
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
