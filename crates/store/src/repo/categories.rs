use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use depot_catalog::{Category, NewCategory};
use depot_core::{CategoryId, PageParams};

use crate::error::StoreResult;

#[derive(Debug, Clone)]
pub struct CategoryRepo {
    pool: PgPool,
}

impl CategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, new: NewCategory) -> StoreResult<Category> {
        new.validate()?;
        let category = Category {
            id: CategoryId::new(),
            name: new.name.trim().to_string(),
            time: Utc::now(),
        };
        sqlx::query("INSERT INTO categories (id, name, time) VALUES ($1, $2, $3)")
            .bind(category.id.as_uuid())
            .bind(&category.name)
            .bind(category.time)
            .execute(&self.pool)
            .await?;
        Ok(category)
    }

    pub async fn list(&self, page: PageParams) -> StoreResult<(Vec<Category>, i64)> {
        let rows = sqlx::query(
            "SELECT id, name, time FROM categories ORDER BY time DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let categories = rows
            .iter()
            .map(category_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM categories")
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;
        Ok((categories, total))
    }

    pub async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, time FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(category_from_row).transpose().map_err(Into::into)
    }

    pub async fn update(&self, category: &Category) -> StoreResult<()> {
        sqlx::query("UPDATE categories SET name = $2, time = $3 WHERE id = $1")
            .bind(category.id.as_uuid())
            .bind(&category.name)
            .bind(category.time)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: CategoryId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: CategoryId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        time: row.try_get("time")?,
    })
}
