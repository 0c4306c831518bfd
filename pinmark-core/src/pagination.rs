//! Splitting an ordered collection into numbered pages.
//!
//! Page numbers come straight from the query string, so resolution never fails:
//! anything that isn't a positive integer means the first page, and a page past
//! the end is either clamped to the last page or reported as an empty overflow.

use std::num::IntErrorKind;

pub const DEFAULT_PAGE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Serve the last page instead.
    Clamp,
    /// Serve nothing, used by clients loading pages one after another.
    Empty,
}

/// Reads a 1-based page number, falling back to 1 for missing or garbage input.
pub fn parse_page(requested: Option<&str>) -> u64 {
    match requested.map(|x| x.trim().parse::<u64>()) {
        Some(Ok(0)) | None => 1,
        Some(Ok(n)) => n,
        Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => u64::MAX,
        Some(Err(_)) => 1,
    }
}

/// A resolved page request over `total` items, before any item is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: u64,
    pub limit: u64,
    pub is_empty_overflow: bool,
}

impl PageWindow {
    pub fn resolve(
        total: u64,
        page_size: usize,
        requested: Option<&str>,
        policy: OverflowPolicy,
    ) -> Self {
        let page_size = page_size.max(1) as u64;
        // an empty collection still has one (empty) page
        let num_pages = ((total + page_size - 1) / page_size).max(1);
        let requested = parse_page(requested);
        if requested > num_pages && policy == OverflowPolicy::Empty {
            return Self {
                number: requested,
                num_pages,
                offset: total,
                limit: 0,
                is_empty_overflow: true,
            };
        }
        let number = requested.min(num_pages);
        Self {
            number,
            num_pages,
            offset: (number - 1) * page_size,
            limit: page_size,
            is_empty_overflow: false,
        }
    }

    pub fn has_next(&self) -> bool {
        !self.is_empty_overflow && self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        !self.is_empty_overflow && self.number > 1
    }

    /// Wraps the items loaded for this window.
    pub fn page<T>(&self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            has_next: self.has_next(),
            has_previous: self.has_previous(),
            is_empty_overflow: self.is_empty_overflow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub is_empty_overflow: bool,
}

impl<T> Page<T> {
    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next.then(|| self.number + 1)
    }
    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous.then(|| self.number - 1)
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn paginate<T>(
    items: Vec<T>,
    page_size: usize,
    requested: Option<&str>,
    policy: OverflowPolicy,
) -> Page<T> {
    let window = PageWindow::resolve(items.len() as u64, page_size, requested, policy);
    let items = items
        .into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect();
    window.page(items)
}

#[cfg(test)]
mod test {
    use super::*;

    fn items(n: u32) -> Vec<u32> {
        (1..=n).collect()
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(1, parse_page(None));
        assert_eq!(1, parse_page(Some("")));
        assert_eq!(1, parse_page(Some("abc")));
        assert_eq!(1, parse_page(Some("0")));
        assert_eq!(1, parse_page(Some("-3")));
        assert_eq!(1, parse_page(Some("2.5")));
        assert_eq!(3, parse_page(Some(" 3 ")));
        assert_eq!(u64::MAX, parse_page(Some("99999999999999999999999")));
    }

    #[test]
    fn test_garbage_page_is_first_page() {
        let page = paginate(items(20), 8, Some("abc"), OverflowPolicy::Clamp);
        assert_eq!(items(8), page.items);
        assert_eq!(1, page.number);
        assert_eq!(3, page.num_pages);
        assert!(page.has_next);
        assert!(!page.has_previous);
        assert!(!page.is_empty_overflow);
    }

    #[test]
    fn test_overflow_clamps() {
        let page = paginate(items(20), 8, Some("999"), OverflowPolicy::Clamp);
        assert_eq!(vec![17, 18, 19, 20], page.items);
        assert_eq!(3, page.number);
        assert!(!page.has_next);
        assert!(page.has_previous);
        assert_eq!(Some(2), page.previous_page_number());

        let page = paginate(
            items(20),
            8,
            Some("99999999999999999999999"),
            OverflowPolicy::Clamp,
        );
        assert_eq!(3, page.number);
    }

    #[test]
    fn test_overflow_empty() {
        let page = paginate(items(20), 8, Some("999"), OverflowPolicy::Empty);
        assert!(page.is_empty());
        assert!(page.is_empty_overflow);
        assert_eq!(999, page.number);
        assert_eq!(3, page.num_pages);
        assert_eq!(None, page.next_page_number());
        assert_eq!(None, page.previous_page_number());

        let page = paginate(items(20), 8, Some("3"), OverflowPolicy::Empty);
        assert_eq!(vec![17, 18, 19, 20], page.items);
        assert!(!page.is_empty_overflow);
    }

    #[test]
    fn test_empty_collection() {
        for policy in [OverflowPolicy::Clamp, OverflowPolicy::Empty] {
            let page = paginate(Vec::<u32>::new(), 8, None, policy);
            assert!(page.is_empty());
            assert!(!page.is_empty_overflow);
            assert_eq!(1, page.number);
            assert_eq!(1, page.num_pages);
            assert!(!page.has_next);
            assert!(!page.has_previous);
        }
        let page = paginate(Vec::<u32>::new(), 8, Some("2"), OverflowPolicy::Empty);
        assert!(page.is_empty_overflow);
    }

    #[test]
    fn test_zero_page_size() {
        let page = paginate(items(3), 0, Some("2"), OverflowPolicy::Clamp);
        assert_eq!(vec![2], page.items);
        assert_eq!(3, page.num_pages);
    }
}
