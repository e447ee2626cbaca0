//! Fixed-point currency arithmetic.
//!
//! Every amount that reaches an order is rounded to cents at the point it is
//! computed. Rounded values are combined afterwards, never the raw products.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Zero};

use super::errors::DomainError;

pub const CURRENCY: &str = "USD";

/// Substituted whenever the rate oracle cannot answer.
pub const DEFAULT_TAX_RATE: &str = "0.10";

pub fn default_tax_rate() -> BigDecimal {
    BigDecimal::from_str(DEFAULT_TAX_RATE).unwrap_or_else(|_| BigDecimal::zero())
}

/// Round half-up to two decimal places.
pub fn round_cents(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

pub fn line_subtotal(unit_price: &BigDecimal, quantity: i32) -> BigDecimal {
    round_cents(&(unit_price * BigDecimal::from(quantity)))
}

/// Amounts are stored as NUMERIC(10, 2): at most eight integer digits.
fn max_storable() -> BigDecimal {
    BigDecimal::from(100_000_000)
}

/// A usable tax rate lies in `[0, 1]`.
pub fn is_valid_rate(rate: &BigDecimal) -> bool {
    rate >= &BigDecimal::zero() && rate <= &BigDecimal::from(1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub subtotal: BigDecimal,
    pub discount: BigDecimal,
    pub tax: BigDecimal,
    pub total: BigDecimal,
    pub tax_rate: BigDecimal,
}

impl Totals {
    pub fn compute(subtotal: &BigDecimal, percent_off: Option<i32>, rate: &BigDecimal) -> Self {
        let subtotal = round_cents(subtotal);
        let discount = match percent_off {
            Some(percent) => round_cents(&(&subtotal * BigDecimal::from(percent) / BigDecimal::from(100))),
            None => round_cents(&BigDecimal::zero()),
        };
        let after_discount = &subtotal - &discount;
        let tax = round_cents(&(&after_discount * rate));
        let total = round_cents(&(&after_discount + &tax));

        Self {
            subtotal,
            discount,
            tax,
            total,
            tax_rate: rate.clone(),
        }
    }

    /// Rejects orders whose subtotal or total cannot be recorded. Every
    /// other amount is bounded by one of the two.
    pub fn ensure_storable(&self) -> Result<(), DomainError> {
        let max = max_storable();
        if self.subtotal >= max || self.total >= max {
            return Err(DomainError::InvalidInput(format!(
                "order total {} exceeds the maximum amount",
                self.total
            )));
        }
        Ok(())
    }
}
