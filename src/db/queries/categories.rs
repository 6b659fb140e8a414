use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, type
FROM categories
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// `{id: type}` map in the shape the quiz client expects.
pub async fn get_categories_map(pool: &SqlitePool) -> sqlx::Result<BTreeMap<i64, String>> {
    Ok(get_all_categories(pool)
        .await?
        .into_iter()
        .map(|c| (c.id, c.kind))
        .collect())
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, type
FROM categories
WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_category(pool: &SqlitePool, id: i64, kind: &str) -> sqlx::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
INSERT INTO categories (id, type) VALUES (?1, ?2)
        "#,
    )
    .bind(id)
    .bind(kind)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn update_category(pool: &SqlitePool, category: &Category) -> sqlx::Result<()> {
    let mut conn = pool.acquire().await?;

    sqlx::query(
        r#"
UPDATE categories SET type = ?1 WHERE categories.id = ?2
        "#,
    )
    .bind(&category.kind)
    .bind(category.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Inserts new categories and renames existing ones. Categories are never
/// removed here since questions may still reference them.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = get_all_categories(pool)
        .await?
        .iter()
        .map(|c| c.id)
        .collect();
    for category in categories {
        if existing_ids.contains(&category.id) {
            update_category(pool, &category).await?;
        } else {
            create_category(pool, category.id, &category.kind).await?;
        }
    }
    Ok(())
}
