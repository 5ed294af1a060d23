//! `depot-catalog` — stock and category domain models.
//!
//! Pure data + normalization; persistence lives in `depot-store`.

pub mod category;
pub mod fields;
pub mod stock;

pub use category::{Category, NewCategory};
pub use fields::{normalize_category_id, parse_f64_or, parse_i32_or, parse_i64_or};
pub use stock::{NewStock, Stock, StockImportRow, StockPatch, DEFAULT_RATING, DEFAULT_STATUS};
