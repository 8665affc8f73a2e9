//! Catalog query building: filter, search and paginate public listings
//!
//! Listing queries over-fetch a single row past the page size to detect
//! a next page without issuing a count query. Filter option lists are
//! computed from the distinct non-null values among published records.

use serde::{Deserialize, Serialize};

/// Normalized listing parameters shared by the catalog pages.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Free-text search term, matched case-insensitively as a substring
    /// across the record kind's text fields (logical OR).
    pub search: Option<String>,

    /// 1-based page number.
    pub page: u64,
}

impl CatalogQuery {
    /// Build a query from raw request parameters. The page value is
    /// parsed leniently and coerced to at least 1; blank search terms
    /// collapse to none.
    pub fn new(search: Option<&str>, page: Option<&str>) -> Self {
        Self {
            search: normalize_search(search),
            page: parse_page(page),
        }
    }

    /// Row offset for this query at the given page size. Saturates so a
    /// hostile page parameter cannot overflow the multiplication.
    pub fn offset(&self, page_size: u64) -> u64 {
        self.page.saturating_sub(1).saturating_mul(page_size)
    }

    /// Row limit including the extra next-page probe row.
    pub fn fetch_limit(&self, page_size: u64) -> u64 {
        page_size + 1
    }
}

/// Parse a raw page parameter, defaulting to 1 and clamping to >= 1.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
}

/// Trim a search term, dropping it entirely when blank.
pub fn normalize_search(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Trim an exact-match filter value, dropping it when blank.
pub fn normalize_filter(raw: Option<&str>) -> Option<String> {
    normalize_search(raw)
}

/// One page of an ordered result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with [`CatalogQuery::fetch_limit`].
    /// The probe row beyond `page_size` is sliced off.
    pub fn from_rows(mut rows: Vec<T>, page: u64, page_size: u64) -> Self {
        let has_next = rows.len() as u64 > page_size;
        if has_next {
            rows.truncate(page_size as usize);
        }
        Self {
            items: rows,
            page,
            has_next,
            has_prev: page > 1,
        }
    }

    /// An empty page, used when a listing query fails and the page is
    /// rendered without results.
    pub fn empty(page: u64) -> Self {
        Self {
            items: Vec::new(),
            page,
            has_next: false,
            has_prev: page > 1,
        }
    }
}

/// Distinct values for the evaluation filter selects, published records
/// only. Types and sectors sort ascending; years sort descending so the
/// most recent work leads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub types: Vec<String>,
    pub sectors: Vec<String>,
    pub years: Vec<String>,
}

impl FilterOptions {
    /// Build from (type, sector, year) tuples of the published rows.
    pub fn from_rows(rows: Vec<(Option<String>, Option<String>, Option<String>)>) -> Self {
        let mut types = Vec::new();
        let mut sectors = Vec::new();
        let mut years = Vec::new();

        for (t, s, y) in rows {
            if let Some(t) = t {
                types.push(t);
            }
            if let Some(s) = s {
                sectors.push(s);
            }
            if let Some(y) = y {
                years.push(y);
            }
        }

        let mut options = Self {
            types: distinct_sorted(types),
            sectors: distinct_sorted(sectors),
            years: distinct_sorted(years),
        };
        options.years.reverse();
        options
    }
}

/// Deduplicate and sort a list of categorical values, skipping blanks.
pub fn distinct_sorted(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("not-a-number")), 1);
        assert_eq!(parse_page(Some("  2 ")), 2);
    }

    #[test]
    fn test_offset_and_limit() {
        let q = CatalogQuery::new(None, Some("2"));
        assert_eq!(q.offset(6), 6);
        assert_eq!(q.fetch_limit(6), 7);

        let first = CatalogQuery::new(None, None);
        assert_eq!(first.offset(6), 0);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        // The page parameter comes straight off the query string, so the
        // largest u64 is reachable; the offset must not overflow.
        let q = CatalogQuery::new(None, Some("18446744073709551615"));
        assert_eq!(q.page, u64::MAX);
        assert_eq!(q.offset(6), u64::MAX);
    }

    #[test]
    fn test_normalize_search() {
        assert_eq!(normalize_search(Some("  waste  ")), Some("waste".into()));
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(normalize_search(None), None);
    }

    #[test]
    fn test_seven_rows_page_size_six() {
        // 7 published records, page size 6: page 1 holds 6 rows with a
        // next page, page 2 holds the last row.
        let rows: Vec<u32> = (0..7).collect();
        let page1 = Page::from_rows(rows.clone(), 1, 6);
        assert_eq!(page1.items.len(), 6);
        assert!(page1.has_next);
        assert!(!page1.has_prev);

        let page2 = Page::from_rows(vec![rows[6]], 2, 6);
        assert_eq!(page2.items.len(), 1);
        assert!(!page2.has_next);
        assert!(page2.has_prev);
    }

    #[test]
    fn test_page_beyond_last_is_empty() {
        let page = Page::from_rows(Vec::<u32>::new(), 5, 6);
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_filter_options_dedupe_and_sort() {
        let rows = vec![
            (Some("Evaluation".into()), Some("Health".into()), Some("2023".into())),
            (Some("Review".into()), None, Some("2021".into())),
            (Some("Evaluation".into()), Some("Education".into()), Some("2023".into())),
            (None, Some("Health".into()), None),
        ];
        let options = FilterOptions::from_rows(rows);
        assert_eq!(options.types, vec!["Evaluation", "Review"]);
        assert_eq!(options.sectors, vec!["Education", "Health"]);
        // Years descend so the latest leads the select.
        assert_eq!(options.years, vec!["2023", "2021"]);
    }
}
