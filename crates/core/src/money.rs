//! Money as integer minor-currency units.
//!
//! Everything that affects persisted totals happens on the integer
//! representation. Decimals exist only for display and must round-trip
//! back to cents exactly before being compared or stored.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A unit price in the smallest currency unit (e.g. cents).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    /// Display value: an exact decimal with two fraction digits
    /// (`1299` → `12.99`).
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), 2)
    }

    /// Convert a display decimal back to cents.
    ///
    /// Rounds the half-cent away from zero; rejects negative values and
    /// values too large to represent.
    pub fn from_decimal(value: Decimal) -> DomainResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::validation("price cannot be negative"));
        }
        let cents = (value * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        cents
            .to_u64()
            .map(Self::from_cents)
            .ok_or_else(|| DomainError::validation("price out of range"))
    }

    /// Total for `quantity` units, in cents. Computed once at purchase
    /// time and stored; never recomputed from catalog state.
    pub fn line_total(&self, quantity: i64) -> DomainResult<u64> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        self.0
            .checked_mul(quantity as u64)
            .ok_or_else(|| DomainError::invariant("line total overflows"))
    }
}

impl ValueObject for Price {}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.as_decimal(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_decimal_is_exact() {
        assert_eq!(Price::from_cents(1299).as_decimal().to_string(), "12.99");
        assert_eq!(Price::from_cents(0).as_decimal().to_string(), "0.00");
        assert_eq!(Price::from_cents(100).as_decimal().to_string(), "1.00");
    }

    #[test]
    fn decimal_round_trips_to_cents() {
        for cents in [0u64, 1, 99, 100, 1299, 250_000] {
            let price = Price::from_cents(cents);
            assert_eq!(Price::from_decimal(price.as_decimal()).unwrap(), price);
        }
    }

    #[test]
    fn from_decimal_rounds_half_cents_away_from_zero() {
        let value = Decimal::new(12_995, 3); // 12.995
        assert_eq!(Price::from_decimal(value).unwrap().cents(), 1300);
    }

    #[test]
    fn from_decimal_rejects_negative() {
        let err = Price::from_decimal(Decimal::new(-1, 2)).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn line_total_multiplies_cents() {
        assert_eq!(Price::from_cents(250).line_total(3).unwrap(), 750);
    }

    #[test]
    fn line_total_rejects_non_positive_quantity() {
        assert!(Price::from_cents(250).line_total(0).is_err());
        assert!(Price::from_cents(250).line_total(-2).is_err());
    }

    #[test]
    fn line_total_reports_overflow() {
        let err = Price::from_cents(u64::MAX).line_total(2).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation error"),
        }
    }
}
