//! Pagination utilities for linka-historial

use serde::Serialize;

/// Pagination metadata calculated from the filtered result count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-indexed, as requested)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Results after filtering, before slicing
    pub total_count: u64,
    /// `ceil(total_count / limit)`; 0 when there are no results
    pub total_pages: u64,
    pub has_next_page: bool,
    /// Index of the first result on this page
    #[serde(skip)]
    pub offset: u64,
}

/// Calculate pagination metadata from total results and requested page
///
/// The requested page is not clamped: a page past the end yields an empty
/// slice with the true totals. Callers guarantee `page >= 1` and `limit >= 1`.
///
/// # Examples
/// ```
/// use linka_historial::pagination::calculate_pagination;
///
/// // 6 results, 2 per page = 3 pages
/// let p = calculate_pagination(6, 2, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 2);
/// assert!(p.has_next_page);
/// ```
pub fn calculate_pagination(total_count: u64, page: u32, limit: u32) -> Pagination {
    let limit_wide = u64::from(limit.max(1));
    let total_pages = total_count.div_ceil(limit_wide);
    let offset = u64::from(page.max(1) - 1) * limit_wide;

    Pagination {
        page,
        limit,
        total_count,
        total_pages,
        has_next_page: u64::from(page) < total_pages,
        offset,
    }
}

impl Pagination {
    /// Take this page's window out of a filtered result set
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(start)
            .take(self.limit as usize)
            .collect()
    }
}
