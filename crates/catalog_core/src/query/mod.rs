//! List query construction.
//!
//! # Responsibility
//! - Translate `page`/`limit`/`sort`/`name` request parameters into a name
//!   filter and an offset/count window for the store.
//! - Reorder an already-fetched page when a sort is requested.
//!
//! # Invariants
//! - `offset = (page - 1) * limit` and `count = limit`.
//! - Filtering and pagination run in the store over the full dataset.
//! - Sorting runs after pagination and only reorders the returned page; it
//!   never changes which rows land on a page.

mod sort;

pub use sort::{sort_page, Named, SortOrder};

use serde::{Deserialize, Serialize};

/// Page number used when the caller omits `page` or sends `0`.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller omits `limit` and no override is configured.
pub const DEFAULT_LIMIT: u32 = 10;

/// Raw list parameters as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    /// `name`, `-name`, or anything else (ignored).
    #[serde(default)]
    pub sort: Option<String>,
    /// Case-insensitive substring to match against the record name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Name predicate pushed down to the store.
///
/// The needle is stored case-folded; the store folds the name column with
/// the same function before matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    folded: Option<String>,
}

impl NameFilter {
    /// Matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches rows whose name contains `needle`, ignoring case.
    ///
    /// An empty needle matches every row.
    pub fn contains(needle: impl Into<String>) -> Self {
        let needle = needle.into();
        if needle.is_empty() {
            return Self::all();
        }
        Self {
            folded: Some(fold_case(&needle)),
        }
    }

    /// Case-folded substring to look for, `None` when every row matches.
    pub fn needle(&self) -> Option<&str> {
        self.folded.as_deref()
    }

    pub fn matches_all(&self) -> bool {
        self.folded.is_none()
    }
}

/// Unicode-aware case folding shared by filtering and page sorting.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Offset/count pair handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub count: u32,
}

impl Window {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            offset: u64::from(page.saturating_sub(1)) * u64::from(limit),
            count: limit,
        }
    }
}

/// Fully resolved list request for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: NameFilter,
    pub window: Window,
    pub sort: Option<SortOrder>,
}

impl ListQuery {
    /// Resolves raw parameters using the built-in default page size.
    pub fn from_params(params: &ListParams) -> Self {
        Self::with_default_limit(params, DEFAULT_LIMIT)
    }

    /// Resolves raw parameters; `page = 0` reads as the first page and
    /// `limit = 0` as `default_limit`.
    pub fn with_default_limit(params: &ListParams, default_limit: u32) -> Self {
        let page = match params.page {
            Some(0) | None => DEFAULT_PAGE,
            Some(value) => value,
        };
        let fallback_limit = if default_limit == 0 {
            DEFAULT_LIMIT
        } else {
            default_limit
        };
        let limit = match params.limit {
            Some(0) | None => fallback_limit,
            Some(value) => value,
        };
        let filter = params
            .name
            .as_deref()
            .map_or_else(NameFilter::all, NameFilter::contains);
        let sort = params.sort.as_deref().and_then(SortOrder::parse);

        Self {
            filter,
            window: Window::new(page, limit),
            sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ListParams, ListQuery, NameFilter, SortOrder, Window, DEFAULT_LIMIT};

    #[test]
    fn defaults_to_first_page_of_ten() {
        let query = ListQuery::from_params(&ListParams::default());
        assert_eq!(query.window, Window { offset: 0, count: DEFAULT_LIMIT });
        assert!(query.filter.matches_all());
        assert_eq!(query.sort, None);
    }

    #[test]
    fn offset_is_previous_pages_times_limit() {
        let params = ListParams {
            page: Some(3),
            limit: Some(25),
            ..ListParams::default()
        };
        let query = ListQuery::from_params(&params);
        assert_eq!(query.window, Window { offset: 50, count: 25 });
    }

    #[test]
    fn zero_page_and_limit_fall_back_to_defaults() {
        let params = ListParams {
            page: Some(0),
            limit: Some(0),
            ..ListParams::default()
        };
        let query = ListQuery::with_default_limit(&params, 7);
        assert_eq!(query.window, Window { offset: 0, count: 7 });
    }

    #[test]
    fn large_page_numbers_do_not_overflow() {
        let window = Window::new(u32::MAX, u32::MAX);
        assert_eq!(
            window.offset,
            u64::from(u32::MAX - 1) * u64::from(u32::MAX)
        );
    }

    #[test]
    fn unknown_sort_values_are_ignored() {
        let params = ListParams {
            sort: Some("year".to_string()),
            ..ListParams::default()
        };
        assert_eq!(ListQuery::from_params(&params).sort, None);

        let params = ListParams {
            sort: Some("-name".to_string()),
            ..ListParams::default()
        };
        assert_eq!(
            ListQuery::from_params(&params).sort,
            Some(SortOrder::NameDesc)
        );
    }

    #[test]
    fn empty_name_matches_all_rows() {
        let params = ListParams {
            name: Some(String::new()),
            ..ListParams::default()
        };
        assert!(ListQuery::from_params(&params).filter.matches_all());
    }

    #[test]
    fn needle_is_folded_for_non_ascii_letters() {
        let filter = NameFilter::contains("ЁЛКА Émile");
        assert_eq!(filter.needle(), Some("ёлка émile"));
        assert_eq!(NameFilter::contains("50%_off").needle(), Some("50%_off"));
        assert_eq!(NameFilter::all().needle(), None);
    }
}
