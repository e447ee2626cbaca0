use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, OrderView};
use crate::domain::ports::OrderRepository;
use crate::domain::stock_key::OrderRef;

pub struct OrderService<R: ?Sized> {
    repo: Arc<R>,
}

impl<R: OrderRepository + ?Sized> OrderService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn get_order(&self, id: i64) -> Result<Option<OrderView>, DomainError> {
        self.repo.find_order(&OrderRef::Id(id))
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult<OrderView>, DomainError> {
        self.repo.list_orders(page.max(1), limit.clamp(1, 100))
    }
}
