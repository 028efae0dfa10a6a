//! Page/size pagination shared by every list operation.

use crate::{EngineError, ResultEngine};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    size: u64,
}

impl Pagination {
    /// Validates `page >= 1`, `1 <= size <= MAX_PAGE_SIZE` and that the row
    /// offset fits a signed 64-bit SQL integer.
    pub fn new(page: u64, size: u64) -> ResultEngine<Self> {
        if page == 0 {
            return Err(EngineError::Validation("page must be >= 1".to_string()));
        }
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(EngineError::Validation(format!(
                "size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        let offset_fits = (page - 1)
            .checked_mul(size)
            .is_some_and(|offset| i64::try_from(offset).is_ok());
        if !offset_fits {
            return Err(EngineError::Validation("page is too large".to_string()));
        }
        Ok(Self { page, size })
    }

    pub fn page(self) -> u64 {
        self.page
    }

    pub fn size(self) -> u64 {
        self.size
    }

    pub(crate) fn offset(self) -> u64 {
        (self.page - 1) * self.size
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}

impl<T> Paginated<T> {
    pub(crate) fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page(),
            size: pagination.size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(Pagination::new(1, 10).unwrap().offset(), 0);
        assert_eq!(Pagination::new(3, 20).unwrap().offset(), 40);
    }

    #[test]
    fn rejects_out_of_range_requests() {
        assert!(Pagination::new(0, 10).is_err());
        assert!(Pagination::new(1, 0).is_err());
        assert!(Pagination::new(1, MAX_PAGE_SIZE + 1).is_err());
        assert!(Pagination::new(1, MAX_PAGE_SIZE).is_ok());
    }

    #[test]
    fn rejects_pages_whose_offset_overflows() {
        assert!(Pagination::new(u64::MAX, MAX_PAGE_SIZE).is_err());
        assert!(Pagination::new(u64::MAX / 2, 10).is_err());

        let last = i64::MAX as u64 / MAX_PAGE_SIZE + 1;
        let page = Pagination::new(last, MAX_PAGE_SIZE).unwrap();
        assert!(page.offset() <= i64::MAX as u64);
    }
}
