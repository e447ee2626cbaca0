use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::ports::InventoryLedger;

pub struct InventoryService<L: ?Sized> {
    ledger: Arc<L>,
}

impl<L: InventoryLedger + ?Sized> InventoryService<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    pub fn stock(&self, product_id: i64) -> Result<i32, DomainError> {
        self.ledger.get_stock(product_id)
    }

    pub fn restock(&self, product_id: i64, quantity: i32) -> Result<i32, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidInput(format!(
                "restock quantity must be at least 1, got {quantity}"
            )));
        }
        let stock = self.ledger.restock(product_id, quantity)?;
        log::info!("Restocked product {product_id} by {quantity}, stock now {stock}");
        Ok(stock)
    }
}
