use async_trait::async_trait;
use bigdecimal::BigDecimal;

use super::checkout::CheckoutDraft;
use super::discount::{DiscountCode, DiscountStatus, NewDiscountCode};
use super::errors::DomainError;
use super::order::{CheckoutReceipt, ListResult, OrderView};
use super::product::Product;
use super::stock_key::{NewStockKey, OrderRef, StockKey, StockKeyFilter, StockKeyPatch};

pub trait InventoryLedger: Send + Sync + 'static {
    /// Batch read; unknown ids are simply absent from the result.
    fn load_products(&self, ids: &[i64]) -> Result<Vec<Product>, DomainError>;
    fn get_stock(&self, product_id: i64) -> Result<i32, DomainError>;
    /// Returns the remaining stock.
    fn decrement_stock(&self, product_id: i64, quantity: i32) -> Result<i32, DomainError>;
    /// Returns the new stock.
    fn restock(&self, product_id: i64, quantity: i32) -> Result<i32, DomainError>;
}

pub trait DiscountLedger: Send + Sync + 'static {
    /// `code` must already be normalized.
    fn find_discount(&self, code: &str) -> Result<Option<DiscountCode>, DomainError>;
    fn create_discount(&self, new: NewDiscountCode) -> Result<DiscountCode, DomainError>;
    fn set_discount_status(
        &self,
        code: &str,
        status: DiscountStatus,
    ) -> Result<DiscountCode, DomainError>;
}

pub trait UserDirectory: Send + Sync + 'static {
    /// `Some(id)` only for an existing, active account.
    fn find_active_user(&self, user_id: i64) -> Result<Option<i64>, DomainError>;
    /// Case-insensitive match on the account e-mail.
    fn find_user_by_email(&self, email: &str) -> Result<Option<i64>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Writes the order, its items, the stock decrements, the discount
    /// consumption and the payment transaction as one unit.
    fn commit_checkout(&self, draft: CheckoutDraft) -> Result<CheckoutReceipt, DomainError>;
    fn find_order(&self, order: &OrderRef) -> Result<Option<OrderView>, DomainError>;
    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult<OrderView>, DomainError>;
}

pub trait StockKeyRepository: Send + Sync + 'static {
    fn create_key(&self, new: NewStockKey) -> Result<StockKey, DomainError>;
    /// Returns how many keys were inserted; duplicates are skipped.
    fn bulk_create_keys(&self, keys: Vec<NewStockKey>) -> Result<usize, DomainError>;
    fn find_key(&self, key_id: i64) -> Result<Option<StockKey>, DomainError>;
    fn assign_key(&self, key_id: i64, order: &OrderRef) -> Result<StockKey, DomainError>;
    fn update_key(&self, key_id: i64, patch: StockKeyPatch) -> Result<StockKey, DomainError>;
    fn delete_key(&self, key_id: i64) -> Result<(), DomainError>;
    fn list_keys(
        &self,
        filter: &StockKeyFilter,
        page: i64,
        limit: i64,
    ) -> Result<ListResult<StockKey>, DomainError>;
}

/// The persistence handle threaded through every service.
pub trait Store:
    InventoryLedger + DiscountLedger + UserDirectory + OrderRepository + StockKeyRepository
{
}

impl<T> Store for T where
    T: InventoryLedger + DiscountLedger + UserDirectory + OrderRepository + StockKeyRepository
{
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("rate oracle request failed: {0}")]
    Transport(String),
    #[error("rate oracle returned an unusable answer: {0}")]
    BadResponse(String),
}

/// Maps a postal code to a sales-tax rate.
#[async_trait]
pub trait RateOracle: Send + Sync + 'static {
    async fn rate_for(&self, zip: &str) -> Result<BigDecimal, OracleError>;
}
