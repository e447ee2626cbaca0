use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountStatus {
    Active,
    Used,
    Expired,
    Disabled,
}

impl DiscountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountStatus::Active => "active",
            DiscountStatus::Used => "used",
            DiscountStatus::Expired => "expired",
            DiscountStatus::Disabled => "disabled",
        }
    }
}

impl fmt::Display for DiscountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DiscountStatus::Active),
            "used" => Ok(DiscountStatus::Used),
            "expired" => Ok(DiscountStatus::Expired),
            "disabled" => Ok(DiscountStatus::Disabled),
            other => Err(DomainError::InvalidInput(format!(
                "unknown discount status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscountCode {
    pub id: i64,
    pub code: String,
    pub percent_off: i32,
    pub status: DiscountStatus,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub used_on_order: Option<String>,
}

impl DiscountCode {
    /// Percent off if the code can still be applied to a new order.
    pub fn redeemable_percent(&self) -> Result<i32, DomainError> {
        if self.status != DiscountStatus::Active {
            return Err(DomainError::DiscountNotActive {
                status: self.status,
            });
        }
        Ok(self.percent_off)
    }
}

#[derive(Debug, Clone)]
pub struct NewDiscountCode {
    pub code: String,
    pub percent_off: i32,
    pub created_by: Option<i64>,
}

impl NewDiscountCode {
    pub fn new(code: &str, percent_off: i32, created_by: Option<i64>) -> Result<Self, DomainError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(DomainError::InvalidInput("discount code is required".into()));
        }
        if !(0..=100).contains(&percent_off) {
            return Err(DomainError::InvalidInput(format!(
                "percent_off must be between 0 and 100, got {percent_off}"
            )));
        }
        Ok(Self {
            code,
            percent_off,
            created_by,
        })
    }
}

/// The code and rate frozen into a checkout once validation passed.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount {
    pub code: String,
    pub percent_off: i32,
}

pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Administrators may retire an active code; nothing else moves by hand.
pub fn ensure_admin_transition(
    current: DiscountStatus,
    target: DiscountStatus,
) -> Result<(), DomainError> {
    match target {
        DiscountStatus::Expired | DiscountStatus::Disabled => {}
        other => {
            return Err(DomainError::InvalidInput(format!(
                "discount codes cannot be set to {other}"
            )))
        }
    }
    if current != DiscountStatus::Active {
        return Err(DomainError::DiscountNotActive { status: current });
    }
    Ok(())
}
