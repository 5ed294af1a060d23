use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{CategoryId, DomainError, StockId};

use crate::fields::{normalize_category_id, parse_f64_or, parse_i32_or, parse_i64_or};

/// Rating assigned when none is provided (form or spreadsheet).
pub const DEFAULT_RATING: i32 = 3;
/// Status assigned when none is provided.
pub const DEFAULT_STATUS: i32 = 0;

/// A stock record.
///
/// `images` is the ordered list of public URLs; the files behind them live
/// under the per-code uploads directory until explicitly deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount_percentage: f64,
    pub in_stock: i64,
    pub reorder_level: i64,
    pub category_id: Option<CategoryId>,
    pub images: Vec<String>,
    pub status: i32,
    pub rating: i32,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub time: DateTime<Utc>,
}

/// Input for creating a stock record, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStock {
    pub code: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount_percentage: f64,
    pub in_stock: i64,
    pub reorder_level: i64,
    pub category_id: Option<CategoryId>,
    pub status: i32,
    pub rating: i32,
    pub created_by: String,
}

impl NewStock {
    /// Build from multipart form text fields.
    ///
    /// `code` and `name` are required; numeric fields fall back to defaults
    /// on missing or unparseable input; a blank `categoryId` means no
    /// category.
    pub fn from_form(
        fields: &HashMap<String, String>,
        created_by: &str,
    ) -> Result<Self, DomainError> {
        let get = |k: &str| fields.get(k).map(String::as_str);

        let code = get("code").map(str::trim).unwrap_or_default();
        if code.is_empty() {
            return Err(DomainError::validation("code is required"));
        }
        let name = get("name").map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }

        Ok(Self {
            code: code.to_string(),
            name: name.to_string(),
            description: get("description").unwrap_or_default().to_string(),
            price: parse_f64_or(get("price"), 0.0),
            discount_percentage: parse_f64_or(get("discountPercentage"), 0.0),
            in_stock: parse_i64_or(get("inStock"), 0),
            reorder_level: parse_i64_or(get("reorderLevel"), 0),
            category_id: normalize_category_id(get("categoryId"))?,
            status: parse_i32_or(get("status"), DEFAULT_STATUS),
            rating: parse_i32_or(get("rating"), DEFAULT_RATING),
            created_by: created_by.to_string(),
        })
    }
}

/// Partial update for a stock record: only present form fields are merged.
///
/// `category_id` is doubly optional — absent means "keep", present-but-blank
/// means "clear the reference".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub in_stock: Option<i64>,
    pub reorder_level: Option<i64>,
    pub category_id: Option<Option<CategoryId>>,
    pub status: Option<i32>,
    pub rating: Option<i32>,
}

impl StockPatch {
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, DomainError> {
        let get = |k: &str| fields.get(k).map(String::as_str);

        Ok(Self {
            code: get("code").map(|s| s.trim().to_string()),
            name: get("name").map(|s| s.trim().to_string()),
            description: get("description").map(str::to_string),
            price: get("price").map(|s| parse_f64_or(Some(s), 0.0)),
            discount_percentage: get("discountPercentage").map(|s| parse_f64_or(Some(s), 0.0)),
            in_stock: get("inStock").map(|s| parse_i64_or(Some(s), 0)),
            reorder_level: get("reorderLevel").map(|s| parse_i64_or(Some(s), 0)),
            category_id: match get("categoryId") {
                None => None,
                some => Some(normalize_category_id(some)?),
            },
            status: get("status").map(|s| parse_i32_or(Some(s), DEFAULT_STATUS)),
            rating: get("rating").map(|s| parse_i32_or(Some(s), DEFAULT_RATING)),
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Stock {
    /// Shallow-merge a patch onto this record, stamping `updated_by`.
    /// Images are managed separately by the attachment lifecycle.
    pub fn merge(&mut self, patch: StockPatch, updated_by: &str, now: DateTime<Utc>) {
        if let Some(v) = patch.code {
            self.code = v;
        }
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.price {
            self.price = v;
        }
        if let Some(v) = patch.discount_percentage {
            self.discount_percentage = v;
        }
        if let Some(v) = patch.in_stock {
            self.in_stock = v;
        }
        if let Some(v) = patch.reorder_level {
            self.reorder_level = v;
        }
        if let Some(v) = patch.category_id {
            self.category_id = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.rating {
            self.rating = v;
        }
        self.updated_by = Some(updated_by.to_string());
        self.time = now;
    }
}

/// One row of the stock import sheet, keyed by the documented header set:
/// `code, name, description, price, discountPercentage, inStock, categoryId,
/// status, rating, reorderLevel, createdBy`.
///
/// Every field has a defensive default; the only row-level error is a
/// malformed non-blank `categoryId`.
#[derive(Debug, Clone, PartialEq)]
pub struct StockImportRow {
    pub inner: NewStock,
}

impl StockImportRow {
    pub fn from_record(cells: &HashMap<String, String>) -> Result<Self, DomainError> {
        let get = |k: &str| cells.get(k).map(String::as_str).filter(|s| !s.trim().is_empty());

        Ok(Self {
            inner: NewStock {
                code: get("code").unwrap_or_default().trim().to_string(),
                name: get("name").unwrap_or_default().trim().to_string(),
                description: get("description").unwrap_or_default().to_string(),
                price: parse_f64_or(get("price"), 0.0),
                discount_percentage: parse_f64_or(get("discountPercentage"), 0.0),
                in_stock: parse_i64_or(get("inStock"), 0),
                reorder_level: parse_i64_or(get("reorderLevel"), 0),
                category_id: normalize_category_id(get("categoryId"))?,
                status: parse_i32_or(get("status"), DEFAULT_STATUS),
                rating: parse_i32_or(get("rating"), DEFAULT_RATING),
                created_by: get("createdBy").unwrap_or_default().to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn new_stock_requires_code_and_name() {
        let err = NewStock::from_form(&form(&[("name", "Widget")]), "ava").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = NewStock::from_form(&form(&[("code", "SKU1")]), "ava").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_stock_defaults_numeric_fields() {
        let s = NewStock::from_form(
            &form(&[("code", "SKU1"), ("name", "Widget"), ("price", "not-a-number")]),
            "ava",
        )
        .unwrap();
        assert_eq!(s.price, 0.0);
        assert_eq!(s.rating, DEFAULT_RATING);
        assert_eq!(s.status, DEFAULT_STATUS);
        assert_eq!(s.created_by, "ava");
        assert_eq!(s.category_id, None);
    }

    #[test]
    fn patch_keeps_absent_fields_and_clears_blank_category() {
        let patch = StockPatch::from_form(&form(&[("price", "12.5"), ("categoryId", "")])).unwrap();
        assert_eq!(patch.price, Some(12.5));
        assert_eq!(patch.category_id, Some(None));
        assert_eq!(patch.name, None);
    }

    #[test]
    fn merge_is_shallow_and_stamps_updated_by() {
        let now = Utc::now();
        let mut stock = Stock {
            id: StockId::new(),
            code: "SKU1".into(),
            name: "Widget".into(),
            description: "desc".into(),
            price: 9.99,
            discount_percentage: 0.0,
            in_stock: 5,
            reorder_level: 2,
            category_id: Some(CategoryId::new()),
            images: vec!["/public/uploads/SKU1/1-a.png".into()],
            status: 0,
            rating: 3,
            created_by: "ava".into(),
            updated_by: None,
            time: now,
        };

        let later = now + chrono::Duration::seconds(30);
        stock.merge(
            StockPatch {
                name: Some("Gadget".into()),
                category_id: Some(None),
                ..Default::default()
            },
            "ben",
            later,
        );

        assert_eq!(stock.name, "Gadget");
        assert_eq!(stock.code, "SKU1");
        assert_eq!(stock.category_id, None);
        assert_eq!(stock.updated_by.as_deref(), Some("ben"));
        assert_eq!(stock.time, later);
        // images untouched by merge
        assert_eq!(stock.images.len(), 1);
    }

    #[test]
    fn import_row_fills_documented_defaults() {
        let row = StockImportRow::from_record(&form(&[("code", "SKU9"), ("name", "Bolt")])).unwrap();
        assert_eq!(row.inner.rating, 3);
        assert_eq!(row.inner.status, 0);
        assert_eq!(row.inner.price, 0.0);
        assert_eq!(row.inner.created_by, "");
    }

    #[test]
    fn import_row_rejects_malformed_category() {
        let err =
            StockImportRow::from_record(&form(&[("code", "SKU9"), ("categoryId", "tools")]))
                .unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }
}
