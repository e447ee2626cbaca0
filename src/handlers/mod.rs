pub mod admin;
pub mod checkout;
pub mod orders;
pub mod stock_keys;
