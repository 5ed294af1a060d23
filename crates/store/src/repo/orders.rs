use chrono::Utc;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use depot_core::{OrderId, PageParams, UserId};
use depot_orders::{NewOrder, Order, OrderLine};

use crate::error::StoreResult;

/// Populated user reference on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedOrder {
    pub order: Order,
    pub user: Option<UserRef>,
}

#[derive(Debug, Clone)]
pub struct OrderRepo {
    pool: PgPool,
}

impl OrderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, new: NewOrder, created_by: &str) -> StoreResult<Order> {
        new.validate()?;
        let order = Order {
            id: OrderId::new(),
            total: new.total(),
            order_number: new.order_number,
            user_id: new.user_id,
            lines: new.lines,
            status: new.status,
            created_by: created_by.to_string(),
            updated_by: None,
            time: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO orders (id, order_number, user_id, lines, total, status, created_by, \
             updated_by, time) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(order.user_id.map(|u| *u.as_uuid()))
        .bind(Json(&order.lines))
        .bind(order.total)
        .bind(order.status)
        .bind(&order.created_by)
        .bind(&order.updated_by)
        .bind(order.time)
        .execute(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn list(&self, page: PageParams) -> StoreResult<(Vec<Order>, i64)> {
        let rows = sqlx::query(
            "SELECT id, order_number, user_id, lines, total, status, created_by, updated_by, \
             time FROM orders ORDER BY time DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let orders = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM orders")
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;
        Ok((orders, total))
    }

    /// Get-by-id with the ordering user populated.
    pub async fn get(&self, id: OrderId) -> StoreResult<Option<PopulatedOrder>> {
        let row = sqlx::query(
            "SELECT o.id, o.order_number, o.user_id, o.lines, o.total, o.status, o.created_by, \
             o.updated_by, o.time, u.name AS user_name \
             FROM orders o LEFT JOIN users u ON u.id = o.user_id WHERE o.id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = order_from_row(&row)?;
        let user = match (order.user_id, row.try_get::<Option<String>, _>("user_name")?) {
            (Some(id), Some(name)) => Some(UserRef { id, name }),
            _ => None,
        };
        Ok(Some(PopulatedOrder { order, user }))
    }

    pub async fn update(&self, order: &Order) -> StoreResult<()> {
        sqlx::query(
            "UPDATE orders SET order_number = $2, user_id = $3, lines = $4, total = $5, \
             status = $6, updated_by = $7, time = $8 WHERE id = $1",
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(order.user_id.map(|u| *u.as_uuid()))
        .bind(Json(&order.lines))
        .bind(order.total)
        .bind(order.status)
        .bind(&order.updated_by)
        .bind(order.time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: OrderId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn order_from_row(row: &PgRow) -> Result<Order, sqlx::Error> {
    Ok(Order {
        id: OrderId::from_uuid(row.try_get("id")?),
        order_number: row.try_get("order_number")?,
        user_id: row
            .try_get::<Option<Uuid>, _>("user_id")?
            .map(UserId::from_uuid),
        lines: row.try_get::<Json<Vec<OrderLine>>, _>("lines")?.0,
        total: row.try_get("total")?,
        status: row.try_get("status")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        time: row.try_get("time")?,
    })
}
