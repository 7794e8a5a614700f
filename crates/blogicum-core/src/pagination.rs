//! Page-number pagination over an already ordered sequence.

use std::num::IntErrorKind;

use serde::Serialize;

/// Items per page on every listing.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A bounded slice of a sequence plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based number of the page actually served.
    pub number: usize,
    pub num_pages: usize,
    /// Items across all pages.
    pub count: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<usize>,
    pub next_page_number: Option<usize>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous_page_number: self.previous_page_number,
            next_page_number: self.next_page_number,
        }
    }
}

/// Parse a raw `?page=` value. Anything but a positive integer yields `None`.
///
/// Integers too large for `usize` saturate so they clamp to the last page.
pub fn parse_page_number(raw: Option<&str>) -> Option<usize> {
    let parsed = match raw?.trim().parse::<usize>() {
        Ok(n) => n,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => usize::MAX,
        Err(_) => return None,
    };
    (parsed > 0).then_some(parsed)
}

/// Cut page `requested` out of `items`.
///
/// Never fails: an invalid request serves page 1, a request past the end
/// serves the last page, and an empty sequence yields one empty page.
pub fn get_page<T: Clone>(items: &[T], requested: Option<&str>, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let count = items.len();
    let num_pages = count.div_ceil(page_size).max(1);

    let number = parse_page_number(requested).unwrap_or(1).min(num_pages);

    let start = (number - 1) * page_size;
    let end = (start + page_size).min(count);
    let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    let has_previous = number > 1;
    let has_next = number < num_pages;

    Page {
        items,
        number,
        num_pages,
        count,
        has_previous,
        has_next,
        previous_page_number: has_previous.then(|| number - 1),
        next_page_number: has_next.then(|| number + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<u32> {
        (1..=25).collect()
    }

    #[test]
    fn missing_page_serves_first_page() {
        let page = get_page(&items(), None, 10);

        assert_eq!(page.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.count, 25);
        assert!(page.has_next);
        assert!(!page.has_previous);
        assert_eq!(page.next_page_number, Some(2));
        assert_eq!(page.previous_page_number, None);
    }

    #[test]
    fn last_page_is_partial() {
        let page = get_page(&items(), Some("3"), 10);

        assert_eq!(page.items, (21..=25).collect::<Vec<_>>());
        assert_eq!(page.len(), 5);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn out_of_range_clamps_to_last_page() {
        let page = get_page(&items(), Some("999"), 10);

        assert_eq!(page.number, 3);
        assert_eq!(page.items, (21..=25).collect::<Vec<_>>());
    }

    #[test]
    fn overflowing_number_clamps_to_last_page() {
        let page = get_page(&items(), Some("99999999999999999999999"), 10);

        assert_eq!(page.number, 3);
        assert_eq!(page.num_pages, 3);
        assert!(!page.has_next);
    }

    #[test]
    fn garbage_and_non_positive_numbers_serve_first_page() {
        for raw in ["abc", "", "0", "-2", "1.5"] {
            let page = get_page(&items(), Some(raw), 10);
            assert_eq!(page.number, 1, "input {raw:?}");
        }
    }

    #[test]
    fn empty_sequence_has_one_empty_page() {
        let page = get_page::<u32>(&[], Some("4"), 10);

        assert!(page.is_empty());
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn repeated_calls_are_identical_and_leave_source_untouched() {
        let source = items();
        let first = get_page(&source, Some("2"), 10);
        let second = get_page(&source, Some("2"), 10);

        assert_eq!(first, second);
        assert_eq!(source, items());
    }
}
