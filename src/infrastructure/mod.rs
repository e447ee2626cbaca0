mod discount_repo;
mod inventory_repo;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod rate_oracle;
mod order_repo;
mod stock_key_repo;
mod store;
#[cfg(test)]
mod test_db;
mod user_repo;

pub use rate_oracle::{FlatRateOracle, HttpRateOracle};
pub use store::DieselStore;
