//! Input checks performed before any engine call.

use engine::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Money, Pagination};
use uuid::Uuid;

use crate::ServerError;

pub(crate) fn parse_uuid(value: &str, label: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| ServerError::Generic(format!("{label} must be a valid UUID")))
}

/// Missing values default to page 1 of 10.
pub(crate) fn pagination(page: Option<u64>, size: Option<u64>) -> Result<Pagination, ServerError> {
    let page = page.unwrap_or(1);
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page < 1 {
        return Err(ServerError::Generic("page must be >= 1".to_string()));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(ServerError::Generic(format!(
            "size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(Pagination::new(page, size)?)
}

/// A strictly positive decimal amount with at most two decimals.
pub(crate) fn parse_amount(value: &str, label: &str) -> Result<Money, ServerError> {
    let amount: Money = value
        .parse()
        .map_err(|_| ServerError::Generic(format!("{label} must be a decimal amount")))?;
    if !amount.is_positive() {
        return Err(ServerError::Generic(format!("{label} must be > 0")));
    }
    Ok(amount)
}

pub(crate) fn require_quantity(quantity: i64) -> Result<i64, ServerError> {
    if quantity < 1 {
        return Err(ServerError::Generic("quantity must be >= 1".to_string()));
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_bounds() {
        let default = pagination(None, None).unwrap();
        assert_eq!((default.page(), default.size()), (1, 10));
        assert!(pagination(Some(0), None).is_err());
        assert!(pagination(None, Some(0)).is_err());
        assert!(pagination(None, Some(101)).is_err());
        assert!(pagination(Some(3), Some(100)).is_ok());
    }

    #[test]
    fn amounts_must_be_positive_decimals() {
        assert_eq!(parse_amount("25.00", "amount_paid").unwrap().minor(), 2500);
        assert!(parse_amount("0", "amount_paid").is_err());
        assert!(parse_amount("-1", "amount_paid").is_err());
        assert!(parse_amount("1.234", "amount_paid").is_err());
        assert!(parse_amount("ten", "amount_paid").is_err());
    }

    #[test]
    fn uuids_are_checked() {
        assert!(parse_uuid("not-a-uuid", "user_id").is_err());
        assert!(parse_uuid(&Uuid::new_v4().to_string(), "user_id").is_ok());
    }
}
