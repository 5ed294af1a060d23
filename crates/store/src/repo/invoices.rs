use chrono::Utc;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use depot_core::{InvoiceId, OrderId, PageParams};
use depot_orders::{Invoice, NewInvoice};

use crate::error::StoreResult;

/// Populated order reference on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRef {
    pub id: OrderId,
    pub order_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedInvoice {
    pub invoice: Invoice,
    pub order: Option<OrderRef>,
}

#[derive(Debug, Clone)]
pub struct InvoiceRepo {
    pool: PgPool,
}

impl InvoiceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, new: NewInvoice, created_by: &str) -> StoreResult<Invoice> {
        new.validate()?;
        let now = Utc::now();
        let invoice = Invoice {
            id: InvoiceId::new(),
            invoice_number: new.invoice_number,
            order_id: new.order_id,
            amount: new.amount,
            status: new.status,
            created_by: created_by.to_string(),
            updated_by: None,
            issued_at: new.issued_at.unwrap_or(now),
            time: now,
        };
        sqlx::query(
            "INSERT INTO invoices (id, invoice_number, order_id, amount, status, created_by, \
             updated_by, issued_at, time) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(invoice.id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(invoice.order_id.map(|o| *o.as_uuid()))
        .bind(invoice.amount)
        .bind(invoice.status)
        .bind(&invoice.created_by)
        .bind(&invoice.updated_by)
        .bind(invoice.issued_at)
        .bind(invoice.time)
        .execute(&self.pool)
        .await?;
        Ok(invoice)
    }

    pub async fn list(&self, page: PageParams) -> StoreResult<(Vec<Invoice>, i64)> {
        let rows = sqlx::query(
            "SELECT id, invoice_number, order_id, amount, status, created_by, updated_by, \
             issued_at, time FROM invoices ORDER BY time DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let invoices = rows
            .iter()
            .map(invoice_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM invoices")
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;
        Ok((invoices, total))
    }

    /// Get-by-id with the billed order populated.
    pub async fn get(&self, id: InvoiceId) -> StoreResult<Option<PopulatedInvoice>> {
        let row = sqlx::query(
            "SELECT i.id, i.invoice_number, i.order_id, i.amount, i.status, i.created_by, \
             i.updated_by, i.issued_at, i.time, o.order_number AS ref_order_number \
             FROM invoices i LEFT JOIN orders o ON o.id = i.order_id WHERE i.id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let invoice = invoice_from_row(&row)?;
        let order = match (
            invoice.order_id,
            row.try_get::<Option<String>, _>("ref_order_number")?,
        ) {
            (Some(id), Some(order_number)) => Some(OrderRef { id, order_number }),
            _ => None,
        };
        Ok(Some(PopulatedInvoice { invoice, order }))
    }

    pub async fn update(&self, invoice: &Invoice) -> StoreResult<()> {
        sqlx::query(
            "UPDATE invoices SET invoice_number = $2, order_id = $3, amount = $4, status = $5, \
             updated_by = $6, issued_at = $7, time = $8 WHERE id = $1",
        )
        .bind(invoice.id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(invoice.order_id.map(|o| *o.as_uuid()))
        .bind(invoice.amount)
        .bind(invoice.status)
        .bind(&invoice.updated_by)
        .bind(invoice.issued_at)
        .bind(invoice.time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: InvoiceId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn invoice_from_row(row: &PgRow) -> Result<Invoice, sqlx::Error> {
    Ok(Invoice {
        id: InvoiceId::from_uuid(row.try_get("id")?),
        invoice_number: row.try_get("invoice_number")?,
        order_id: row
            .try_get::<Option<Uuid>, _>("order_id")?
            .map(OrderId::from_uuid),
        amount: row.try_get("amount")?,
        status: row.try_get("status")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        issued_at: row.try_get("issued_at")?,
        time: row.try_get("time")?,
    })
}
