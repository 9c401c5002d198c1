// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category and category-attribute assignment operations.

use rusqlite::params;
use stockroom_core::{AttributeAssignment, Category, OrganizationId, StockroomError};

use crate::database::{is_unique_violation, map_tr_err, Database};

fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        organization_id: OrganizationId(row.get(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        plugin_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// The category provisioned for `plugin_id` in `org`, if any.
pub async fn get_by_plugin_id(
    db: &Database,
    org: &OrganizationId,
    plugin_id: &str,
) -> Result<Option<Category>, StockroomError> {
    let org = org.as_str().to_string();
    let plugin_id = plugin_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Category>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, organization_id, name, description, plugin_id, created_at
                 FROM categories WHERE organization_id = ?1 AND plugin_id = ?2",
            )?;
            match stmt.query_row(params![org, plugin_id], row_to_category) {
                Ok(category) => Ok(Some(category)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a category. A second category for the same plugin and
/// organization is a `Conflict`.
pub async fn create_category(db: &Database, category: &Category) -> Result<(), StockroomError> {
    let category = category.clone();
    let key = format!(
        "{}/{}",
        category.organization_id,
        category.plugin_id.as_deref().unwrap_or(&category.id)
    );
    let inserted = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let result = conn.execute(
                "INSERT INTO categories (id, organization_id, name, description, plugin_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    category.id,
                    category.organization_id.as_str(),
                    category.name,
                    category.description,
                    category.plugin_id,
                    category.created_at,
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
            entity: "category".to_string(),
            key,
        })
    }
}

/// Replace the category's attribute assignments in one transaction.
pub async fn set_attributes(
    db: &Database,
    category_id: &str,
    assignments: &[AttributeAssignment],
) -> Result<(), StockroomError> {
    let category_id = category_id.to_string();
    let assignments = assignments.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM category_attributes WHERE category_id = ?1",
                params![category_id],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO category_attributes (category_id, attribute_id, required, sort_order)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for a in &assignments {
                    stmt.execute(params![category_id, a.attribute_id, a.required, a.sort_order])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// Current assignments of a category, by sort order.
pub async fn list_assignments(
    db: &Database,
    category_id: &str,
) -> Result<Vec<AttributeAssignment>, StockroomError> {
    let category_id = category_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<AttributeAssignment>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT attribute_id, required, sort_order FROM category_attributes
                 WHERE category_id = ?1 ORDER BY sort_order, attribute_id",
            )?;
            let rows = stmt.query_map(params![category_id], |row| {
                Ok(AttributeAssignment {
                    attribute_id: row.get(0)?,
                    required: row.get(1)?,
                    sort_order: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::attributes;
    use stockroom_core::{Attribute, DataType};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_category(id: &str, org: &str, plugin_id: Option<&str>) -> Category {
        Category {
            id: id.to_string(),
            organization_id: OrganizationId::from(org),
            name: "Books".to_string(),
            description: "Imported books".to_string(),
            plugin_id: plugin_id.map(str::to_string),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn make_attribute(id: &str, key: &str) -> Attribute {
        Attribute {
            id: id.to_string(),
            organization_id: OrganizationId::from("org-1"),
            key: key.to_string(),
            name: key.to_uppercase(),
            data_type: DataType::String,
            plugin_id: Some("books".to_string()),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_lookup_by_plugin() {
        let (db, _dir) = setup_db().await;
        create_category(&db, &make_category("c1", "org-1", Some("books")))
            .await
            .unwrap();

        let found = get_by_plugin_id(&db, &OrganizationId::from("org-1"), "books")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "c1");
        assert_eq!(found.description, "Imported books");

        let other_org = get_by_plugin_id(&db, &OrganizationId::from("org-2"), "books")
            .await
            .unwrap();
        assert!(other_org.is_none());
    }

    #[tokio::test]
    async fn duplicate_plugin_category_is_conflict() {
        let (db, _dir) = setup_db().await;
        create_category(&db, &make_category("c1", "org-1", Some("books")))
            .await
            .unwrap();

        let err = create_category(&db, &make_category("c2", "org-1", Some("books")))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn manual_categories_do_not_collide() {
        let (db, _dir) = setup_db().await;
        create_category(&db, &make_category("c1", "org-1", None)).await.unwrap();
        create_category(&db, &make_category("c2", "org-1", None)).await.unwrap();
    }

    #[tokio::test]
    async fn set_attributes_replaces_previous_assignments() {
        let (db, _dir) = setup_db().await;
        create_category(&db, &make_category("c1", "org-1", Some("books")))
            .await
            .unwrap();
        for (id, key) in [("a1", "isbn"), ("a2", "author"), ("a3", "pages")] {
            attributes::create_attribute(&db, &make_attribute(id, key))
                .await
                .unwrap();
        }

        let first = [
            AttributeAssignment {
                attribute_id: "a1".into(),
                required: true,
                sort_order: 0,
            },
            AttributeAssignment {
                attribute_id: "a2".into(),
                required: false,
                sort_order: 1,
            },
        ];
        set_attributes(&db, "c1", &first).await.unwrap();
        assert_eq!(list_assignments(&db, "c1").await.unwrap(), first.to_vec());

        let second = [AttributeAssignment {
            attribute_id: "a3".into(),
            required: false,
            sort_order: 0,
        }];
        set_attributes(&db, "c1", &second).await.unwrap();
        assert_eq!(list_assignments(&db, "c1").await.unwrap(), second.to_vec());
    }

    #[tokio::test]
    async fn failed_assignment_rolls_back() {
        let (db, _dir) = setup_db().await;
        create_category(&db, &make_category("c1", "org-1", Some("books")))
            .await
            .unwrap();
        attributes::create_attribute(&db, &make_attribute("a1", "isbn"))
            .await
            .unwrap();
        set_attributes(
            &db,
            "c1",
            &[AttributeAssignment {
                attribute_id: "a1".into(),
                required: true,
                sort_order: 0,
            }],
        )
        .await
        .unwrap();

        let bad = [AttributeAssignment {
            attribute_id: "no-such-attribute".into(),
            required: false,
            sort_order: 0,
        }];
        assert!(set_attributes(&db, "c1", &bad).await.is_err());

        let kept = list_assignments(&db, "c1").await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].attribute_id, "a1");
    }
}
