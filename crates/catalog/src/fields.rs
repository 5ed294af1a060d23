//! Defensive field normalization shared by form intake and spreadsheet import.

use core::str::FromStr;

use depot_core::{CategoryId, DomainError};

/// Normalize a raw `categoryId` value.
///
/// The invariant is: `category_id` is either a valid reference or `None`.
/// Empty/blank input means "no category"; anything else must parse as an id.
pub fn normalize_category_id(raw: Option<&str>) -> Result<Option<CategoryId>, DomainError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => CategoryId::from_str(s.trim()).map(Some),
    }
}

/// Parse a numeric field, falling back to `default` on missing/garbage input.
pub fn parse_f64_or(raw: Option<&str>, default: f64) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(default)
}

pub fn parse_i64_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(default)
}

pub fn parse_i32_or(raw: Option<&str>, default: i32) -> i32 {
    raw.and_then(|s| s.trim().parse::<i32>().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_category_id_becomes_none() {
        assert_eq!(normalize_category_id(None).unwrap(), None);
        assert_eq!(normalize_category_id(Some("")).unwrap(), None);
        assert_eq!(normalize_category_id(Some("   ")).unwrap(), None);
    }

    #[test]
    fn valid_category_id_is_kept() {
        let id = CategoryId::new();
        let got = normalize_category_id(Some(&id.to_string())).unwrap();
        assert_eq!(got, Some(id));
    }

    #[test]
    fn malformed_category_id_is_an_error() {
        assert!(normalize_category_id(Some("electronics")).is_err());
    }

    #[test]
    fn numeric_parsing_falls_back() {
        assert_eq!(parse_f64_or(Some("9.99"), 0.0), 9.99);
        assert_eq!(parse_f64_or(Some("cheap"), 0.0), 0.0);
        assert_eq!(parse_i64_or(None, 7), 7);
        assert_eq!(parse_i32_or(Some(" 42 "), 0), 42);
    }
}
