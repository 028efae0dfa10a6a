use std::{fmt, str::FromStr};

use crate::EngineError;

/// Cash amount represented as **integer minor units** (cents).
///
/// Package prices and paid amounts go through this type so the
/// `amount_paid == price` check is an exact integer comparison, never a
/// floating-point one.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let price = Money::from_minor(25_00);
/// assert_eq!(price.minor(), 2500);
/// assert_eq!(price.to_string(), "25.00");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("25".parse::<Money>().unwrap().minor(), 2500);
/// assert_eq!("24,99".parse::<Money>().unwrap().minor(), 2499);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::Validation("empty amount".to_string());
        let invalid = || EngineError::Validation(format!("invalid amount: {s}"));
        let overflow = || EngineError::Validation("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim().replace(',', ".");
        if rest.is_empty() {
            return Err(empty());
        }

        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let fraction_str = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let fraction: i64 = match fraction_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::Validation("too many decimals".to_string())),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(fraction))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -total } else { total }))
    }
}
