use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, OrderId, StockId, UserId};

/// One line of an order; `unit_price` is captured at order time so later
/// stock price changes do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub stock_id: StockId,
    pub quantity: i64,
    pub unit_price: f64,
}

/// A business order referencing stock records and (optionally) the ordering
/// user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: Option<UserId>,
    pub lines: Vec<OrderLine>,
    pub total: f64,
    pub status: i32,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: Option<UserId>,
    pub lines: Vec<OrderLine>,
    #[serde(default)]
    pub status: i32,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.order_number.trim().is_empty() {
            return Err(DomainError::validation("order_number is required"));
        }
        if self.lines.is_empty() {
            return Err(DomainError::validation("an order needs at least one line"));
        }
        for line in &self.lines {
            if line.quantity <= 0 {
                return Err(DomainError::validation("line quantity must be positive"));
            }
            if line.unit_price < 0.0 {
                return Err(DomainError::validation("line unit_price must not be negative"));
            }
        }
        Ok(())
    }

    /// Total is derived from the lines, never trusted from the client.
    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.unit_price * l.quantity as f64)
            .sum()
    }
}

/// Partial update; absent fields are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub user_id: Option<Option<UserId>>,
    pub lines: Option<Vec<OrderLine>>,
    pub status: Option<i32>,
}

impl Order {
    pub fn merge(&mut self, patch: OrderPatch, updated_by: &str, now: DateTime<Utc>) {
        if let Some(v) = patch.user_id {
            self.user_id = v;
        }
        if let Some(v) = patch.lines {
            self.total = v.iter().map(|l| l.unit_price * l.quantity as f64).sum();
            self.lines = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        self.updated_by = Some(updated_by.to_string());
        self.time = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i64, unit_price: f64) -> OrderLine {
        OrderLine {
            stock_id: StockId::new(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn total_is_derived_from_lines() {
        let order = NewOrder {
            order_number: "ORD-1".into(),
            user_id: None,
            lines: vec![line(2, 9.99), line(1, 5.0)],
            status: 0,
        };
        assert!(order.validate().is_ok());
        assert!((order.total() - 24.98).abs() < 1e-9);
    }

    #[test]
    fn empty_orders_are_rejected() {
        let order = NewOrder {
            order_number: "ORD-1".into(),
            user_id: None,
            lines: vec![],
            status: 0,
        };
        assert!(order.validate().is_err());
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let order = NewOrder {
            order_number: "ORD-1".into(),
            user_id: None,
            lines: vec![line(0, 1.0)],
            status: 0,
        };
        assert!(order.validate().is_err());
    }

    #[test]
    fn merge_recomputes_total_when_lines_change() {
        let mut order = Order {
            id: OrderId::new(),
            order_number: "ORD-1".into(),
            user_id: None,
            lines: vec![line(1, 10.0)],
            total: 10.0,
            status: 0,
            created_by: "ava".into(),
            updated_by: None,
            time: Utc::now(),
        };
        order.merge(
            OrderPatch {
                lines: Some(vec![line(3, 2.0)]),
                ..Default::default()
            },
            "ben",
            Utc::now(),
        );
        assert!((order.total - 6.0).abs() < 1e-9);
        assert_eq!(order.updated_by.as_deref(), Some("ben"));
    }
}
