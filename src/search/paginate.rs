use serde::Serialize;

/// Page sizes used by the public views
pub const SEARCH_PAGE_SIZE: u64 = 12;
pub const LIST_PAGE_SIZE: u64 = 18;
pub const HOME_FEATURED: u64 = 6;

/// Splits `count` ordered rows into pages of `per_page`
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    count: u64,
    per_page: u64,
}

/// Navigation data for one page (1-indexed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub count: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub has_other_pages: bool,
    pub previous_page: Option<u64>,
    pub next_page: Option<u64>,
    /// 1-based position of the first and last row on this page, 0 when empty
    pub start_index: u64,
    pub end_index: u64,
}

impl PageInfo {
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl Paginator {
    pub fn new(count: u64, per_page: u64) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    /// Always at least one page, even for an empty collection
    pub fn num_pages(&self) -> u64 {
        self.count.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw `page` parameter. Missing or non-numeric values mean
    /// page 1; numbers outside the valid range clamp to the nearest page.
    pub fn page(&self, requested: Option<&str>) -> PageInfo {
        let num_pages = self.num_pages();
        let number = requested
            .and_then(parse_page_number)
            .unwrap_or(1)
            .clamp(1, num_pages as i64) as u64;

        let offset = (number - 1) * self.per_page;
        let on_page = self.count.saturating_sub(offset).min(self.per_page);
        let (start_index, end_index) = if on_page == 0 {
            (0, 0)
        } else {
            (offset + 1, offset + on_page)
        };

        PageInfo {
            number,
            num_pages,
            per_page: self.per_page,
            count: self.count,
            has_previous: number > 1,
            has_next: number < num_pages,
            has_other_pages: num_pages > 1,
            previous_page: (number > 1).then(|| number - 1),
            next_page: (number < num_pages).then(|| number + 1),
            start_index,
            end_index,
        }
    }
}

/// Integer page number; values too large for `i64` saturate so they still
/// clamp to the nearest end
fn parse_page_number(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_pages_clamp() {
        let paginator = Paginator::new(30, 12);
        assert_eq!(paginator.num_pages(), 3);
        assert_eq!(paginator.page(Some("999")).number, 3);
        assert_eq!(paginator.page(Some("0")).number, 1);
        assert_eq!(paginator.page(Some("-4")).number, 1);
    }

    #[test]
    fn overflowing_page_numbers_still_clamp() {
        let paginator = Paginator::new(30, 12);
        assert_eq!(paginator.page(Some("99999999999999999999")).number, 3);
        assert_eq!(paginator.page(Some(" +99999999999999999999 ")).number, 3);
        assert_eq!(paginator.page(Some("-99999999999999999999")).number, 1);
        assert_eq!(paginator.page(Some("9999999999999999999x")).number, 1);
    }

    #[test]
    fn missing_or_garbage_means_first_page() {
        let paginator = Paginator::new(30, 12);
        assert_eq!(paginator.page(None).number, 1);
        assert_eq!(paginator.page(Some("dos")).number, 1);
        assert_eq!(paginator.page(Some(" 2 ")).number, 2);
    }

    #[test]
    fn last_page_metadata() {
        let info = Paginator::new(30, 12).page(Some("3"));
        assert_eq!(info.offset(), 24);
        assert_eq!((info.start_index, info.end_index), (25, 30));
        assert!(info.has_previous);
        assert!(!info.has_next);
        assert_eq!(info.previous_page, Some(2));
        assert_eq!(info.next_page, None);
        assert!(info.has_other_pages);
    }

    #[test]
    fn empty_collection_has_one_empty_page() {
        let info = Paginator::new(0, 18).page(Some("5"));
        assert_eq!(info.number, 1);
        assert_eq!(info.num_pages, 1);
        assert!(!info.has_other_pages);
        assert_eq!((info.start_index, info.end_index), (0, 0));
    }
}
