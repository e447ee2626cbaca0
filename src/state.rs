use std::sync::Arc;

use crate::application::checkout_service::{CheckoutService, TaxPolicy};
use crate::application::discount_service::DiscountService;
use crate::application::inventory_service::InventoryService;
use crate::application::order_service::OrderService;
use crate::application::stock_key_service::StockKeyService;
use crate::domain::ports::{RateOracle, Store};

/// Services shared by every worker, all backed by the same store.
pub struct AppState {
    pub checkout: CheckoutService<dyn Store>,
    pub orders: OrderService<dyn Store>,
    pub inventory: InventoryService<dyn Store>,
    pub discounts: DiscountService<dyn Store>,
    pub stock_keys: StockKeyService<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, oracle: Arc<dyn RateOracle>, tax: TaxPolicy) -> Self {
        Self {
            checkout: CheckoutService::new(Arc::clone(&store), oracle, tax),
            orders: OrderService::new(Arc::clone(&store)),
            inventory: InventoryService::new(Arc::clone(&store)),
            discounts: DiscountService::new(Arc::clone(&store)),
            stock_keys: StockKeyService::new(store),
        }
    }
}
