use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, InvoiceId, OrderId};

/// An invoice, optionally tied to the order it bills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub order_id: Option<OrderId>,
    pub amount: f64,
    pub status: i32,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub invoice_number: String,
    pub order_id: Option<OrderId>,
    pub amount: f64,
    #[serde(default)]
    pub status: i32,
    pub issued_at: Option<DateTime<Utc>>,
}

impl NewInvoice {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.invoice_number.trim().is_empty() {
            return Err(DomainError::validation("invoice_number is required"));
        }
        if self.amount < 0.0 {
            return Err(DomainError::validation("amount must not be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePatch {
    pub order_id: Option<Option<OrderId>>,
    pub amount: Option<f64>,
    pub status: Option<i32>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl Invoice {
    pub fn merge(&mut self, patch: InvoicePatch, updated_by: &str, now: DateTime<Utc>) {
        if let Some(v) = patch.order_id {
            self.order_id = v;
        }
        if let Some(v) = patch.amount {
            self.amount = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.issued_at {
            self.issued_at = v;
        }
        self.updated_by = Some(updated_by.to_string());
        self.time = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amount_is_rejected() {
        let invoice = NewInvoice {
            invoice_number: "INV-1".into(),
            order_id: None,
            amount: -1.0,
            status: 0,
            issued_at: None,
        };
        assert!(invoice.validate().is_err());
    }

    #[test]
    fn merge_preserves_absent_fields() {
        let issued = Utc::now();
        let mut invoice = Invoice {
            id: InvoiceId::new(),
            invoice_number: "INV-1".into(),
            order_id: Some(OrderId::new()),
            amount: 50.0,
            status: 0,
            created_by: "ava".into(),
            updated_by: None,
            issued_at: issued,
            time: issued,
        };
        invoice.merge(
            InvoicePatch {
                status: Some(1),
                ..Default::default()
            },
            "ben",
            Utc::now(),
        );
        assert_eq!(invoice.status, 1);
        assert_eq!(invoice.amount, 50.0);
        assert!(invoice.order_id.is_some());
    }
}
