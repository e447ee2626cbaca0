pub mod blocking;
pub mod checkout_service;
pub mod discount_service;
pub mod identity;
pub mod inventory_service;
pub mod order_service;
pub mod stock_key_service;
