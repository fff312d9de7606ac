//! Pagination over result sets.

/// Default number of memes per explore page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// Items on this page.
    pub items: &'a [T],
    /// 1-based page number that was requested.
    pub number: usize,
    /// Total number of pages (0 for an empty set).
    pub total_pages: usize,
    /// Total number of items across all pages.
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    /// Returns true if a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Returns true if an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1 && self.total_pages > 0
    }
}

/// Slices `items` into the 1-based page `number`.
///
/// Out-of-range pages (including 0) are empty. A `per_page` of 0 is treated
/// as 1.
#[must_use]
pub fn paginate<T>(items: &[T], number: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let start = number.saturating_sub(1).saturating_mul(per_page);
    let page_items = if number == 0 || start >= total_items {
        &items[0..0]
    } else {
        let end = (start + per_page).min(total_items);
        &items[start..end]
    };

    Page {
        items: page_items,
        number,
        total_pages,
        total_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, 0 ; "empty")]
    #[test_case(12, 1 ; "exactly one page")]
    #[test_case(13, 2 ; "one over")]
    #[test_case(100, 9 ; "catalog sized")]
    fn test_total_pages(len: usize, expected: usize) {
        let items = vec![0u8; len];
        assert_eq!(paginate(&items, 1, DEFAULT_PAGE_SIZE).total_pages, expected);
    }

    #[test]
    fn test_last_page_is_partial() {
        let items: Vec<usize> = (0..30).collect();
        let page = paginate(&items, 3, 12);
        assert_eq!(page.items, &[24, 25, 26, 27, 28, 29]);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        let items: Vec<usize> = (0..5).collect();
        assert!(paginate(&items, 0, 12).items.is_empty());
        assert!(paginate(&items, 2, 12).items.is_empty());
    }
}
