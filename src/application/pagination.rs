//! Page-number pagination over ordered listings.
//!
//! Page numbers are 1-based and supplied externally; anything that fails to
//! parse falls back to page 1, and numbers beyond range clamp to the last
//! valid page. Page size is a per-listing configuration constant.

use std::num::NonZeroU32;

/// A requested page number, already normalized to be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber(u32);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    /// Parse an externally supplied `page` parameter. Absent, non-numeric,
    /// and zero values all fall back to the first page.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<u32>().ok())
            .and_then(NonZeroU32::new)
            .map(|n| PageNumber(n.get()))
            .unwrap_or(Self::FIRST)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Slices an ordered result set into fixed-size pages.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: NonZeroU32,
}

impl Paginator {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: NonZeroU32::new(page_size).unwrap_or(NonZeroU32::MIN),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    /// Resolve a requested page against the total item count.
    pub fn page(&self, total_items: u64, requested: PageNumber) -> Page {
        let size = u64::from(self.page_size.get());
        let total_pages = (total_items.div_ceil(size)).max(1) as u32;
        let number = requested.get().min(total_pages);
        Page {
            number,
            total_pages,
            offset: u64::from(number - 1) * size,
            limit: size,
            has_previous: number > 1,
            has_next: number < total_pages,
        }
    }
}

/// A resolved page: the window to fetch plus navigation metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub total_pages: u32,
    pub offset: u64,
    pub limit: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_items_at_size_ten_split_ten_three() {
        let paginator = Paginator::new(10);

        let first = paginator.page(13, PageNumber::parse(Some("1")));
        assert_eq!(first.offset, 0);
        assert_eq!(first.limit, 10);
        assert_eq!(first.total_pages, 2);
        assert!(first.has_next);
        assert!(!first.has_previous);

        let second = paginator.page(13, PageNumber::parse(Some("2")));
        assert_eq!(second.offset, 10);
        assert!(second.has_previous);
        assert!(!second.has_next);
        // Three items remain in the window; the store returns fewer than limit.
        assert_eq!(13 - second.offset, 3);
    }

    #[test]
    fn out_of_range_page_clamps_to_last() {
        let paginator = Paginator::new(5);
        let page = paginator.page(12, PageNumber::parse(Some("99")));
        assert_eq!(page.number, 3);
        assert_eq!(page.offset, 10);
        assert!(!page.has_next);
    }

    #[test]
    fn non_numeric_page_falls_back_to_first() {
        assert_eq!(PageNumber::parse(Some("abc")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("-2")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("0")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(None), PageNumber::FIRST);
    }

    #[test]
    fn empty_listing_still_has_one_page() {
        let paginator = Paginator::new(10);
        let page = paginator.page(0, PageNumber::FIRST);
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let paginator = Paginator::new(5);
        let page = paginator.page(10, PageNumber::parse(Some("2")));
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next);
    }

    #[test]
    fn zero_page_size_is_clamped_to_one() {
        let paginator = Paginator::new(0);
        assert_eq!(paginator.page_size(), 1);
    }
}
