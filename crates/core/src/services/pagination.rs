//! Page-number pagination.

use serde::Serialize;

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub num_pages: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            items,
            page,
            per_page,
            total,
            num_pages: total.div_ceil(per_page.max(1)).max(1),
        }
    }

    /// Whether a following page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    /// Apply `f` to every item, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            num_pages: self.num_pages,
        }
    }
}

/// Row offset of a 1-based page. Page 0 is treated as page 1.
#[must_use]
pub const fn offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_pages() {
        assert_eq!(Page::<u8>::new(vec![], 1, 20, 0).num_pages, 1);
        assert_eq!(Page::<u8>::new(vec![], 1, 20, 20).num_pages, 1);
        assert_eq!(Page::<u8>::new(vec![], 1, 20, 21).num_pages, 2);
    }

    #[test]
    fn test_has_next() {
        assert!(Page::<u8>::new(vec![], 1, 20, 41).has_next());
        assert!(!Page::<u8>::new(vec![], 3, 20, 41).has_next());
    }

    #[test]
    fn test_offset() {
        assert_eq!(offset(0, 20), 0);
        assert_eq!(offset(1, 20), 0);
        assert_eq!(offset(3, 20), 40);
    }
}
