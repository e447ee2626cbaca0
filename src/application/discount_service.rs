use std::sync::Arc;

use crate::domain::discount::{
    ensure_admin_transition, normalize_code, DiscountCode, DiscountStatus, NewDiscountCode,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::DiscountLedger;

/// Administrative side of the discount ledger. Consumption happens only
/// inside the checkout commit.
pub struct DiscountService<L: ?Sized> {
    ledger: Arc<L>,
}

impl<L: DiscountLedger + ?Sized> DiscountService<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    pub fn create(
        &self,
        code: &str,
        percent_off: i32,
        created_by: Option<i64>,
    ) -> Result<DiscountCode, DomainError> {
        let created = self
            .ledger
            .create_discount(NewDiscountCode::new(code, percent_off, created_by)?)?;
        log::info!("Discount code {} created ({}% off)", created.code, created.percent_off);
        Ok(created)
    }

    pub fn retire(&self, code: &str, status: DiscountStatus) -> Result<DiscountCode, DomainError> {
        let code = normalize_code(code);
        let current = self
            .ledger
            .find_discount(&code)?
            .ok_or_else(|| DomainError::DiscountNotFound(code.clone()))?;
        ensure_admin_transition(current.status, status)?;
        self.ledger.set_discount_status(&code, status)
    }
}
