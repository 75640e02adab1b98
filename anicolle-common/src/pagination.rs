//! Page arithmetic for listings
//!
//! [MB-PAGE]: every listing (posts, tagged posts, anime search results) is
//! split into fixed-size pages. The requested page arrives as raw query text:
//! - missing or not an integer: first page
//! - below 1 or past the end: last page
//!
//! An empty result set still has one (empty) page.

use serde::Serialize;
use std::num::IntErrorKind;

/// Posts and anime search results are both shown 10 per page
pub const PAGE_SIZE: i64 = 10;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Total number of pages (at least 1)
    pub total_pages: i64,
    /// Total number of items across all pages
    pub total_results: i64,
    /// Items per page
    pub page_size: i64,
    /// Offset for SQL LIMIT/OFFSET or slice start
    #[serde(skip)]
    pub offset: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Interpret the raw `page` query value
///
/// Returns `None` when the value is missing or not an integer. An integer
/// too large for `i64` saturates, so it still lands on the last page.
pub fn parse_page(raw: Option<&str>) -> Option<i64> {
    match raw?.trim().parse::<i64>() {
        Ok(page) => Some(page),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// Calculate pagination metadata from total results and requested page
///
/// # Examples
/// ```
/// use anicolle_common::pagination::calculate_pagination;
///
/// // 25 results at 10 per page = 3 pages (10 + 10 + 5)
/// let p = calculate_pagination(25, Some(2), 10);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 10);
///
/// // Requesting an out-of-range page lands on the last page
/// let p = calculate_pagination(25, Some(99), 10);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 20);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: Option<i64>, page_size: i64) -> Pagination {
    let page_size = page_size.max(1);
    let total_results = total_results.max(0);
    let total_pages = ((total_results + page_size - 1) / page_size).max(1);

    let page = match requested_page {
        None => 1,
        Some(p) if p < 1 || p > total_pages => total_pages,
        Some(p) => p,
    };
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        total_pages,
        total_results,
        page_size,
        offset,
        has_next: page < total_pages,
        has_previous: page > 1,
    }
}

/// Slice an in-memory list according to the pagination
pub fn page_slice<T>(items: &[T], pagination: &Pagination) -> std::ops::Range<usize> {
    let start = (pagination.offset as usize).min(items.len());
    let end = (start + pagination.page_size as usize).min(items.len());
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(25, Some(2), PAGE_SIZE);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 10);
        assert!(p.has_next);
        assert!(p.has_previous);
    }

    #[test]
    fn test_pagination_missing_page_is_first() {
        let p = calculate_pagination(25, None, PAGE_SIZE);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);
        assert!(!p.has_previous);
    }

    #[test]
    fn test_pagination_out_of_bounds_high() {
        let p = calculate_pagination(15, Some(99), PAGE_SIZE);
        assert_eq!(p.page, 2);
        assert_eq!(p.offset, 10);
        assert!(!p.has_next);
    }

    #[test]
    fn test_pagination_zero_goes_to_last_page() {
        let p = calculate_pagination(35, Some(0), PAGE_SIZE);
        assert_eq!(p.page, 4);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, Some(3), PAGE_SIZE);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.offset, 0);
        assert!(!p.has_next);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = calculate_pagination(20, Some(2), PAGE_SIZE);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 10);
        assert!(!p.has_next);
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(Some("3")), Some(3));
        assert_eq!(parse_page(Some(" 2 ")), Some(2));
        assert_eq!(parse_page(Some("abc")), None);
        assert_eq!(parse_page(Some("")), None);
        assert_eq!(parse_page(None), None);
    }

    #[test]
    fn test_oversized_page_lands_on_last_page() {
        let huge = parse_page(Some("99999999999999999999"));
        assert_eq!(huge, Some(i64::MAX));
        assert_eq!(calculate_pagination(25, huge, PAGE_SIZE).page, 3);

        let very_negative = parse_page(Some("-99999999999999999999"));
        assert_eq!(calculate_pagination(25, very_negative, PAGE_SIZE).page, 3);

        assert_eq!(parse_page(Some("12abc")), None);
        assert_eq!(parse_page(Some("")), None);
    }

    #[test]
    fn test_page_slice() {
        let items: Vec<i32> = (0..25).collect();
        let p = calculate_pagination(items.len() as i64, Some(3), PAGE_SIZE);
        assert_eq!(&items[page_slice(&items, &p)], &[20, 21, 22, 23, 24]);
    }
}
