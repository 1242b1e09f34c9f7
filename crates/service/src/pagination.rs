//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct, input normalization, and the
//! `Page<T>` envelope every list endpoint returns.

use serde::Serialize;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and convert to `u64`
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 10 } }
}

/// Paginated result envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_results: u64,
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
}

impl<T> Page<T> {
    /// Assemble a page from a fetched slice. `page_idx` is 0-based.
    pub fn assemble(results: Vec<T>, total_results: u64, page_idx: u64, per_page: u64) -> Self {
        let total_pages = total_results.div_ceil(per_page);
        let page = page_idx + 1;
        let has_next_page = page * per_page < total_results;
        Self { results, total_results, limit: per_page, page, total_pages, has_next_page }
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, Pagination};

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 10);
    }

    #[test]
    fn assemble_computes_pages_and_next() {
        let p = Page::assemble(vec![1, 2, 3], 7, 0, 3);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);

        let last = Page::assemble(vec![7], 7, 2, 3);
        assert_eq!(last.page, 3);
        assert!(!last.has_next_page);
    }

    #[test]
    fn assemble_handles_empty_result() {
        let p: Page<u8> = Page::assemble(vec![], 0, 0, 10);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
    }
}
