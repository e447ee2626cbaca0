use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockKeyStatus {
    Available,
    Reserved,
    Sold,
}

impl StockKeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockKeyStatus::Available => "available",
            StockKeyStatus::Reserved => "reserved",
            StockKeyStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for StockKeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockKeyStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(StockKeyStatus::Available),
            "reserved" => Ok(StockKeyStatus::Reserved),
            "sold" => Ok(StockKeyStatus::Sold),
            other => Err(DomainError::InvalidInput(format!(
                "unknown stock key status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StockKey {
    pub id: i64,
    pub product_id: i64,
    pub game_key: String,
    pub status: StockKeyStatus,
    pub order_id: Option<i64>,
    pub order_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl StockKey {
    pub fn ensure_assignable(&self) -> Result<(), DomainError> {
        if self.status != StockKeyStatus::Available {
            return Err(DomainError::KeyNotAvailable {
                status: self.status,
            });
        }
        Ok(())
    }

    pub fn ensure_deletable(&self) -> Result<(), DomainError> {
        if self.status == StockKeyStatus::Sold {
            return Err(DomainError::CannotDeleteSoldKey);
        }
        Ok(())
    }

    /// Sold keys are frozen; `sold` is only reachable through assignment.
    pub fn ensure_patchable(&self, patch: &StockKeyPatch) -> Result<(), DomainError> {
        if self.status == StockKeyStatus::Sold {
            return Err(DomainError::KeyNotAvailable {
                status: self.status,
            });
        }
        if patch.status == Some(StockKeyStatus::Sold) {
            return Err(DomainError::InvalidInput(
                "keys are marked sold by assigning them to an order".into(),
            ));
        }
        Ok(())
    }
}

/// How an admin names the order a key is being bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderRef {
    Id(i64),
    Number(String),
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderRef::Id(id) => write!(f, "#{id}"),
            OrderRef::Number(number) => f.write_str(number),
        }
    }
}

/// The target order as seen by key assignment.
#[derive(Debug, Clone)]
pub struct OrderBinding {
    pub order_id: i64,
    pub order_number: String,
    pub product_ids: Vec<i64>,
}

impl OrderBinding {
    pub fn ensure_contains(&self, product_id: i64) -> Result<(), DomainError> {
        if self.product_ids.contains(&product_id) {
            Ok(())
        } else {
            Err(DomainError::ProductMismatch {
                product_id,
                order_number: self.order_number.clone(),
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStockKey {
    pub product_id: i64,
    pub game_key: String,
    pub notes: Option<String>,
}

impl NewStockKey {
    pub fn new(product_id: i64, game_key: &str, notes: Option<String>) -> Result<Self, DomainError> {
        let game_key = game_key.trim();
        if game_key.is_empty() {
            return Err(DomainError::InvalidInput("game_key is required".into()));
        }
        Ok(Self {
            product_id,
            game_key: game_key.to_string(),
            notes,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct StockKeyPatch {
    pub game_key: Option<String>,
    pub status: Option<StockKeyStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StockKeyFilter {
    pub product_id: Option<i64>,
    pub status: Option<StockKeyStatus>,
}
