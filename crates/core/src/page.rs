//! Pagination and sort parameters, derived defensively from query input.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Sort direction for list endpoints. Defaults to newest-first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse the `order` query flag; anything other than `asc` means descending.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Validated page/perpage pair.
///
/// Both values are always positive: zero, negative, or unparseable query
/// input falls back to the defaults rather than erroring.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    pub page: u32,
    pub perpage: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            perpage: DEFAULT_PER_PAGE,
        }
    }
}

impl PageParams {
    pub fn new(page: u32, perpage: u32) -> Self {
        Self {
            page: page.max(1),
            perpage: perpage.max(1),
        }
    }

    /// Derive parameters from raw query strings.
    pub fn from_query(page: Option<&str>, perpage: Option<&str>) -> Self {
        let page = page
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|&p| p >= 1)
            .unwrap_or(DEFAULT_PAGE);
        let perpage = perpage
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|&p| p >= 1)
            .unwrap_or(DEFAULT_PER_PAGE);
        Self { page, perpage }
    }

    /// Number of rows to skip before the requested page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.perpage)
    }

    /// Maximum number of rows on the page.
    pub fn limit(&self) -> i64 {
        i64::from(self.perpage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_when_absent() {
        let p = PageParams::from_query(None, None);
        assert_eq!(p, PageParams { page: 1, perpage: 10 });
    }

    #[test]
    fn defaults_on_garbage_and_zero() {
        assert_eq!(PageParams::from_query(Some("abc"), Some("0")).page, 1);
        assert_eq!(PageParams::from_query(Some("abc"), Some("0")).perpage, 10);
        assert_eq!(PageParams::from_query(Some("-3"), Some("-1")), PageParams::default());
    }

    #[test]
    fn offset_skips_prior_pages() {
        let p = PageParams::from_query(Some("3"), Some("25"));
        assert_eq!(p.offset(), 50);
        assert_eq!(p.limit(), 25);
    }

    #[test]
    fn order_flag_defaults_to_desc() {
        assert_eq!(SortOrder::from_query(None), SortOrder::Desc);
        assert_eq!(SortOrder::from_query(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::from_query(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::from_query(Some("descending")), SortOrder::Desc);
    }

    proptest! {
        /// Whatever the query input, derived offset/limit stay non-negative
        /// and consistent with page >= 1, perpage >= 1.
        #[test]
        fn derived_params_are_always_positive(page in any::<Option<String>>(), perpage in any::<Option<String>>()) {
            let p = PageParams::from_query(page.as_deref(), perpage.as_deref());
            prop_assert!(p.page >= 1);
            prop_assert!(p.perpage >= 1);
            prop_assert!(p.offset() >= 0);
            prop_assert_eq!(p.offset(), i64::from(p.page - 1) * p.limit());
        }
    }
}
