pub mod checkout;
pub mod discount;
pub mod errors;
pub mod identity;
pub mod money;
pub mod order;
pub mod ports;
pub mod product;
pub mod stock_key;
