/// Page number and page size of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSpec {
    page: u32,
    limit: u32,
}

impl PaginationSpec {
    pub const DEFAULT_PAGE: u32 = 1;

    pub fn new(page: u32, limit: u32) -> Self {
        PaginationSpec {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Parses raw `page` and `limit` values. Anything that is not a positive
    /// integer falls back to the defaults rather than failing the request.
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: u32) -> Self {
        let page = Self::positive(page).unwrap_or(Self::DEFAULT_PAGE);
        let limit = Self::positive(limit).unwrap_or(default_limit);
        Self::new(page, limit)
    }

    fn positive(value: Option<&str>) -> Option<u32> {
        value
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|v| *v >= 1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn skip(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Caps the page size, keeping the page number
    pub fn clamped(self, max_limit: u32) -> Self {
        Self::new(self.page, self.limit.min(max_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let spec = PaginationSpec::parse(None, None, 100);
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit(), 100);
        assert_eq!(spec.skip(), 0);
    }

    #[test]
    fn test_page_two_of_five() {
        let spec = PaginationSpec::parse(Some("2"), Some("5"), 100);
        assert_eq!(spec.skip(), 5);
        assert_eq!(spec.limit(), 5);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        for bad in ["", "abc", "0", "-3", "2.5", "NaN"] {
            let spec = PaginationSpec::parse(Some(bad), Some(bad), 10);
            assert_eq!(spec, PaginationSpec::new(1, 10), "value {bad:?}");
        }
        let spec = PaginationSpec::parse(Some(" 3 "), Some(" 7"), 10);
        assert_eq!(spec, PaginationSpec::new(3, 7));
    }

    #[test]
    fn test_clamped() {
        let spec = PaginationSpec::parse(Some("4"), Some("1000000"), 100).clamped(500);
        assert_eq!(spec.limit(), 500);
        assert_eq!(spec.page, 4);
        assert_eq!(spec.skip(), 1500);
    }

    proptest! {
        #[test]
        fn prop_skip_is_previous_pages(page in 1u32..100_000, limit in 1u32..10_000) {
            let spec = PaginationSpec::parse(Some(&page.to_string()), Some(&limit.to_string()), 100);
            prop_assert_eq!(spec.skip(), (page as u64 - 1) * limit as u64);
        }
    }
}
