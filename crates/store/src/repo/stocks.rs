use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use depot_catalog::{NewStock, Stock};
use depot_core::{CategoryId, PageParams, SortOrder, StockId};

use crate::error::StoreResult;
use crate::sheet::StockExportRow;

/// Sortable stock columns. A whitelist, so the `sort` query value can never
/// reach the ORDER BY clause verbatim.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StockSort {
    #[default]
    Time,
    Code,
    Name,
    Price,
    InStock,
    Rating,
    Status,
}

impl StockSort {
    /// Unknown sort keys fall back to the timestamp column.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("code") => Self::Code,
            Some("name") => Self::Name,
            Some("price") => Self::Price,
            Some("inStock") | Some("in_stock") => Self::InStock,
            Some("rating") => Self::Rating,
            Some("status") => Self::Status,
            _ => Self::Time,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Code => "code",
            Self::Name => "name",
            Self::Price => "price",
            Self::InStock => "in_stock",
            Self::Rating => "rating",
            Self::Status => "status",
        }
    }

    /// Echo value for list responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Code => "code",
            Self::Name => "name",
            Self::Price => "price",
            Self::InStock => "inStock",
            Self::Rating => "rating",
            Self::Status => "status",
        }
    }
}

/// Filter/sort/pagination input for the stock list endpoint.
#[derive(Debug, Clone, Default)]
pub struct StockListQuery {
    pub page: PageParams,
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub sort: StockSort,
    pub order: SortOrder,
}

/// The populated category reference returned by get-by-id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// A stock with its category resolved at read time.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedStock {
    pub stock: Stock,
    pub category: Option<CategoryRef>,
}

#[derive(Debug, Clone)]
pub struct StockRepo {
    pool: PgPool,
}

const STOCK_COLUMNS: &str = "id, code, name, description, price, discount_percentage, in_stock, \
     reorder_level, category_id, images, status, rating, created_by, updated_by, time";

impl StockRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a `Stock` from a `NewStock`, stamping id and timestamp, and
    /// persist it. Images come pre-stored from the attachment manager.
    pub async fn insert(&self, new: NewStock, images: Vec<String>) -> StoreResult<Stock> {
        let stock = Stock {
            id: StockId::new(),
            code: new.code,
            name: new.name,
            description: new.description,
            price: new.price,
            discount_percentage: new.discount_percentage,
            in_stock: new.in_stock,
            reorder_level: new.reorder_level,
            category_id: new.category_id,
            images,
            status: new.status,
            rating: new.rating,
            created_by: new.created_by,
            updated_by: None,
            time: Utc::now(),
        };
        self.insert_stock(&self.pool, &stock).await?;
        Ok(stock)
    }

    async fn insert_stock<'e>(
        &self,
        exec: impl sqlx::PgExecutor<'e>,
        stock: &Stock,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO stocks (id, code, name, description, price, discount_percentage, \
             in_stock, reorder_level, category_id, images, status, rating, created_by, \
             updated_by, time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(stock.id.as_uuid())
        .bind(&stock.code)
        .bind(&stock.name)
        .bind(&stock.description)
        .bind(stock.price)
        .bind(stock.discount_percentage)
        .bind(stock.in_stock)
        .bind(stock.reorder_level)
        .bind(stock.category_id.map(|c| *c.as_uuid()))
        .bind(&stock.images)
        .bind(stock.status)
        .bind(stock.rating)
        .bind(&stock.created_by)
        .bind(&stock.updated_by)
        .bind(stock.time)
        .execute(exec)
        .await?;
        Ok(())
    }

    /// List with filters applied; `total` comes from a separate count query
    /// over the same filter.
    pub async fn list(&self, q: &StockListQuery) -> StoreResult<(Vec<Stock>, i64)> {
        let mut qb = QueryBuilder::new(format!("SELECT {STOCK_COLUMNS} FROM stocks"));
        push_filters(&mut qb, q);
        qb.push(" ORDER BY ")
            .push(q.sort.as_sql())
            .push(" ")
            .push(q.order.as_sql());
        qb.push(" LIMIT ")
            .push_bind(q.page.limit())
            .push(" OFFSET ")
            .push_bind(q.page.offset());

        let rows = qb.build().fetch_all(&self.pool).await?;
        let stocks = rows
            .iter()
            .map(stock_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let mut qb = QueryBuilder::new("SELECT COUNT(*) AS total FROM stocks");
        push_filters(&mut qb, q);
        let total: i64 = qb.build().fetch_one(&self.pool).await?.try_get("total")?;

        Ok((stocks, total))
    }

    /// Get-by-id with the category populated; `None` when absent.
    pub async fn get(&self, id: StockId) -> StoreResult<Option<PopulatedStock>> {
        let row = sqlx::query(
            "SELECT s.id, s.code, s.name, s.description, s.price, s.discount_percentage, \
             s.in_stock, s.reorder_level, s.category_id, s.images, s.status, s.rating, \
             s.created_by, s.updated_by, s.time, c.name AS category_name \
             FROM stocks s LEFT JOIN categories c ON c.id = s.category_id \
             WHERE s.id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let stock = stock_from_row(&row)?;
        let category = match (stock.category_id, row.try_get::<Option<String>, _>("category_name")?)
        {
            (Some(id), Some(name)) => Some(CategoryRef { id, name }),
            _ => None,
        };
        Ok(Some(PopulatedStock { stock, category }))
    }

    /// Persist a fully merged record (last-write-wins, no version check).
    pub async fn update(&self, stock: &Stock) -> StoreResult<()> {
        sqlx::query(
            "UPDATE stocks SET code = $2, name = $3, description = $4, price = $5, \
             discount_percentage = $6, in_stock = $7, reorder_level = $8, category_id = $9, \
             images = $10, status = $11, rating = $12, updated_by = $13, time = $14 \
             WHERE id = $1",
        )
        .bind(stock.id.as_uuid())
        .bind(&stock.code)
        .bind(&stock.name)
        .bind(&stock.description)
        .bind(stock.price)
        .bind(stock.discount_percentage)
        .bind(stock.in_stock)
        .bind(stock.reorder_level)
        .bind(stock.category_id.map(|c| *c.as_uuid()))
        .bind(&stock.images)
        .bind(stock.status)
        .bind(stock.rating)
        .bind(&stock.updated_by)
        .bind(stock.time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns whether a row was actually removed.
    pub async fn delete(&self, id: StockId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM stocks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bulk insert for spreadsheet import. One transaction: any row error
    /// rolls the whole batch back.
    pub async fn insert_batch(&self, rows: Vec<NewStock>) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;
        for new in rows {
            let stock = Stock {
                id: StockId::new(),
                code: new.code,
                name: new.name,
                description: new.description,
                price: new.price,
                discount_percentage: new.discount_percentage,
                in_stock: new.in_stock,
                reorder_level: new.reorder_level,
                category_id: new.category_id,
                images: Vec::new(),
                status: new.status,
                rating: new.rating,
                created_by: new.created_by,
                updated_by: None,
                time: Utc::now(),
            };
            self.insert_stock(&mut *tx, &stock).await?;
            inserted += 1;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    /// All records flattened for export, category name resolved, newest
    /// first.
    pub async fn export_rows(&self) -> StoreResult<Vec<StockExportRow>> {
        let rows = sqlx::query(
            "SELECT s.code, s.name, s.description, s.price, s.discount_percentage, s.in_stock, \
             COALESCE(c.name, '') AS category, s.status, s.rating, s.created_by, s.time \
             FROM stocks s LEFT JOIN categories c ON c.id = s.category_id \
             ORDER BY s.time DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(StockExportRow {
                    code: row.try_get("code")?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    price: row.try_get("price")?,
                    discount_percentage: row.try_get("discount_percentage")?,
                    in_stock: row.try_get("in_stock")?,
                    category: row.try_get("category")?,
                    status: row.try_get("status")?,
                    rating: row.try_get("rating")?,
                    created_by: row.try_get("created_by")?,
                    time: row.try_get("time")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(Into::into)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &StockListQuery) {
    let mut sep = " WHERE ";
    if let Some(search) = q.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        qb.push(sep)
            .push("(code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
        sep = " AND ";
    }
    if let Some(from) = q.from {
        qb.push(sep).push("time >= ").push_bind(from);
        sep = " AND ";
    }
    if let Some(to) = q.to {
        qb.push(sep).push("time <= ").push_bind(to);
    }
}

fn stock_from_row(row: &PgRow) -> Result<Stock, sqlx::Error> {
    Ok(Stock {
        id: StockId::from_uuid(row.try_get("id")?),
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        discount_percentage: row.try_get("discount_percentage")?,
        in_stock: row.try_get("in_stock")?,
        reorder_level: row.try_get("reorder_level")?,
        category_id: row
            .try_get::<Option<Uuid>, _>("category_id")?
            .map(CategoryId::from_uuid),
        images: row.try_get("images")?,
        status: row.try_get("status")?,
        rating: row.try_get("rating")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        time: row.try_get("time")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_key_falls_back_to_time() {
        assert_eq!(StockSort::from_query(Some("price")), StockSort::Price);
        assert_eq!(StockSort::from_query(Some("inStock")), StockSort::InStock);
        assert_eq!(StockSort::from_query(Some("; DROP TABLE stocks")), StockSort::Time);
        assert_eq!(StockSort::from_query(None), StockSort::Time);
    }

    #[test]
    fn sort_sql_is_a_fixed_column_name() {
        for raw in ["time", "code", "name", "price", "in_stock", "rating", "status"] {
            let sort = StockSort::from_query(Some(raw));
            assert!(sort.as_sql().chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }
    }
}
