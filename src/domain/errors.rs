use thiserror::Error;

use super::discount::DiscountStatus;
use super::stock_key::StockKeyStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Product {product_id} is not available")]
    ProductUnavailable { product_id: i64 },

    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: i64, quantity: i32 },

    #[error("Insufficient stock for product {product_id}: {available} available")]
    InsufficientStock { product_id: i64, available: i32 },

    /// The stock re-check inside the commit found less stock than the
    /// validation pass did.
    #[error("Stock for product {product_id} changed during checkout: {available} available")]
    StockRaceLost { product_id: i64, available: i32 },

    #[error("Discount code {0} not found")]
    DiscountNotFound(String),

    #[error("Discount code is {status}")]
    DiscountNotActive { status: DiscountStatus },

    #[error("Discount code {0} already exists")]
    DuplicateCode(String),

    #[error("Discount code {0} has already been used")]
    DiscountAlreadyUsed(String),

    #[error("Stock key not found")]
    KeyNotFound,

    #[error("Stock key is {status}")]
    KeyNotAvailable { status: StockKeyStatus },

    #[error("Game key already exists")]
    DuplicateKey,

    #[error("Cannot delete a sold key")]
    CannotDeleteSoldKey,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Product {product_id} is not part of order {order_number}")]
    ProductMismatch {
        product_id: i64,
        order_number: String,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
