//! The module contains the errors the engine can throw.
//!
//! The taxonomy follows the moment a failure is detected:
//!
//! - [`Validation`] malformed input, rejected before any lock is taken.
//! - [`NotFound`] a referenced row does not exist, nothing was mutated.
//! - [`InvalidState`] / [`Conflict`] a business rule failed after locking; the
//!   unit of work was rolled back as a whole.
//! - [`Transient`] the store was unreachable or the deadline expired; the call
//!   can be retried because no partial effect exists.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NotFound`]: EngineError::NotFound
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`Conflict`]: EngineError::Conflict
//!  [`Transient`]: EngineError::Transient
use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;

/// Rows the engine can fail to find.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    CreditPackage,
    Product,
    User,
    Category,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreditPackage => "package",
            Self::Product => "product",
            Self::User => "user",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog rows that exist but cannot take part in a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidState {
    PackageInactive,
    ProductInactive,
    ProductNotOffered,
}

impl InvalidState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PackageInactive => "package_inactive",
            Self::ProductInactive => "product_inactive",
            Self::ProductNotOffered => "product_not_offered",
        }
    }
}

impl fmt::Display for InvalidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business rule violations discovered while holding the row locks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conflict {
    AmountMismatch,
    InsufficientStock,
    InsufficientPoints,
    DuplicateEmail,
}

impl Conflict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AmountMismatch => "amount_mismatch",
            Self::InsufficientStock => "insufficient_stock",
            Self::InsufficientPoints => "insufficient_points",
            Self::DuplicateEmail => "duplicate_email",
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transient {
    StoreUnavailable(String),
    DeadlineExceeded,
}

impl fmt::Display for Transient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreUnavailable(reason) => write!(f, "store_unavailable ({reason})"),
            Self::DeadlineExceeded => f.write_str("deadline_exceeded"),
        }
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(Resource),
    #[error("Invalid state: {0}")]
    InvalidState(InvalidState),
    #[error("Conflict: {0}")]
    Conflict(Conflict),
    #[error("Transient failure: {0}")]
    Transient(Transient),
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// Stable machine-readable code, used by the HTTP boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::NotFound(Resource::CreditPackage) => "PACKAGE_NOT_FOUND",
            Self::NotFound(Resource::Product) => "PRODUCT_NOT_FOUND",
            Self::NotFound(Resource::User) => "USER_NOT_FOUND",
            Self::NotFound(Resource::Category) => "CATEGORY_NOT_FOUND",
            Self::InvalidState(InvalidState::PackageInactive) => "PACKAGE_INACTIVE",
            Self::InvalidState(InvalidState::ProductInactive) => "PRODUCT_INACTIVE",
            Self::InvalidState(InvalidState::ProductNotOffered) => "PRODUCT_NOT_OFFERED",
            Self::Conflict(Conflict::AmountMismatch) => "AMOUNT_MISMATCH",
            Self::Conflict(Conflict::InsufficientStock) => "INSUFFICIENT_STOCK",
            Self::Conflict(Conflict::InsufficientPoints) => "INSUFFICIENT_POINTS",
            Self::Conflict(Conflict::DuplicateEmail) => "DUPLICATE_EMAIL",
            Self::Transient(Transient::StoreUnavailable(_)) => "STORE_UNAVAILABLE",
            Self::Transient(Transient::DeadlineExceeded) => "DEADLINE_EXCEEDED",
            Self::Database(_) => "INTERNAL_ERROR",
        }
    }

    /// Only transient failures are safe to retry blindly.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<DbErr> for EngineError {
    fn from(value: DbErr) -> Self {
        match value {
            DbErr::ConnectionAcquire(err) => {
                Self::Transient(Transient::StoreUnavailable(err.to_string()))
            }
            DbErr::Conn(err) => Self::Transient(Transient::StoreUnavailable(err.to_string())),
            other => Self::Database(other),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Transient(a), Self::Transient(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
