use serde::Deserialize;

use crate::error::ValidationError;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// `?page=&limit=` as sent by the client
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Validated window into a listing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl TryFrom<&PageParams> for Page {
    type Error = ValidationError;

    fn try_from(params: &PageParams) -> Result<Self, Self::Error> {
        let page = params.page.unwrap_or(DEFAULT_PAGE);
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(ValidationError::OutOfRange("invalid page number".to_string()));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ValidationError::OutOfRange(format!(
                "invalid limit number (1..={})",
                MAX_LIMIT
            )));
        }

        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| ValidationError::OutOfRange("invalid page number".to_string()))?;

        Ok(Page { offset, limit })
    }
}

impl Page {
    /// Slice helper for in-memory listings
    pub fn window<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = Page::try_from(&PageParams::default()).unwrap();
        assert_eq!(page, Page { offset: 0, limit: 10 });
    }

    #[test]
    fn test_offset_from_page_and_limit() {
        let params = PageParams { page: Some(3), limit: Some(20) };
        assert_eq!(Page::try_from(&params).unwrap(), Page { offset: 40, limit: 20 });
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        for (page, limit) in [(0, 10), (-1, 10), (1, 0), (1, MAX_LIMIT + 1)] {
            let params = PageParams { page: Some(page), limit: Some(limit) };
            assert!(Page::try_from(&params).is_err(), "page={} limit={}", page, limit);
        }
    }

    #[test]
    fn test_huge_page_is_rejected_instead_of_overflowing() {
        let params = PageParams { page: Some(i64::MAX), limit: Some(MAX_LIMIT) };
        assert!(matches!(
            Page::try_from(&params),
            Err(ValidationError::OutOfRange(_))
        ));

        // Largest page whose offset still fits
        let params = PageParams { page: Some(i64::MAX / MAX_LIMIT), limit: Some(MAX_LIMIT) };
        assert!(Page::try_from(&params).is_ok());
    }

    #[test]
    fn test_window() {
        let items: Vec<i32> = (1..=25).collect();
        let page = Page { offset: 20, limit: 10 };
        assert_eq!(page.window(&items), vec![21, 22, 23, 24, 25]);
    }
}
