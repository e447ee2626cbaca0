//! Mutex-guarded store used by service and HTTP tests. A checkout commit
//! works on a copy of the state and swaps it in only on success.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::domain::checkout::{generate_order_number, generate_transaction_id, CheckoutDraft};
use crate::domain::discount::{DiscountCode, DiscountStatus, NewDiscountCode};
use crate::domain::errors::DomainError;
use crate::domain::identity::{normalize_email, Purchaser};
use crate::domain::money::CURRENCY;
use crate::domain::order::{
    page_offset, CheckoutReceipt, ListResult, OrderItemView, OrderStatus, OrderView, PaymentStatus,
    TransactionView,
};
use crate::domain::ports::{
    DiscountLedger, InventoryLedger, OrderRepository, StockKeyRepository, UserDirectory,
};
use crate::domain::product::Product;
use crate::domain::stock_key::{
    NewStockKey, OrderBinding, OrderRef, StockKey, StockKeyFilter, StockKeyPatch, StockKeyStatus,
};

#[derive(Debug, Clone)]
struct UserRecord {
    id: i64,
    email: String,
    is_active: bool,
}

#[derive(Debug, Clone, Default)]
struct State {
    next_id: i64,
    users: Vec<UserRecord>,
    products: BTreeMap<i64, Product>,
    discounts: BTreeMap<String, DiscountCode>,
    orders: Vec<OrderView>,
    transactions: Vec<TransactionView>,
    keys: BTreeMap<i64, StockKey>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn product_mut(&mut self, product_id: i64) -> Result<&mut Product, DomainError> {
        self.products
            .get_mut(&product_id)
            .ok_or_else(|| DomainError::NotFound(format!("Product {product_id}")))
    }

    fn decrement_stock(&mut self, product_id: i64, quantity: i32) -> Result<i32, DomainError> {
        let product = self.product_mut(product_id)?;
        if product.stock < quantity {
            return Err(DomainError::InsufficientStock {
                product_id,
                available: product.stock,
            });
        }
        product.stock -= quantity;
        Ok(product.stock)
    }

    fn resolve_purchaser(&mut self, purchaser: &Purchaser) -> i64 {
        match purchaser {
            Purchaser::Registered(id) | Purchaser::ReturningGuest(id) => *id,
            Purchaser::Guest(profile) => {
                if let Some(user) = self
                    .users
                    .iter()
                    .find(|u| normalize_email(&u.email) == profile.email)
                {
                    return user.id;
                }
                let id = self.next_id();
                self.users.push(UserRecord {
                    id,
                    email: profile.email.clone(),
                    is_active: true,
                });
                id
            }
        }
    }

    fn apply_checkout(&mut self, draft: CheckoutDraft) -> Result<CheckoutReceipt, DomainError> {
        let user_id = self.resolve_purchaser(&draft.purchaser);
        let order_id = self.next_id();
        let order_number = generate_order_number();
        let now = Utc::now();

        let mut items = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            self.decrement_stock(line.product_id, line.quantity)
                .map_err(|e| match e {
                    DomainError::InsufficientStock {
                        product_id,
                        available,
                    } => DomainError::StockRaceLost {
                        product_id,
                        available,
                    },
                    other => other,
                })?;
            let item_id = self.next_id();
            items.push(OrderItemView {
                id: item_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price.clone(),
                subtotal: line.subtotal.clone(),
            });
        }

        if let Some(applied) = &draft.discount {
            let code = self
                .discounts
                .get_mut(&applied.code)
                .filter(|d| d.status == DiscountStatus::Active)
                .ok_or_else(|| DomainError::DiscountAlreadyUsed(applied.code.clone()))?;
            code.status = DiscountStatus::Used;
            code.used_at = Some(now);
            code.used_on_order = Some(order_number.clone());
        }

        let order = OrderView {
            id: order_id,
            user_id,
            order_number,
            status: OrderStatus::Completed,
            subtotal: draft.totals.subtotal.clone(),
            tax: draft.totals.tax.clone(),
            discount: draft.totals.discount.clone(),
            total: draft.totals.total.clone(),
            discount_code: draft.discount.as_ref().map(|d| d.code.clone()),
            payment_method: draft.payment_method.clone(),
            payment_status: PaymentStatus::Paid,
            billing_name: draft.billing.name.clone(),
            billing_email: draft.billing.email.clone(),
            completed_at: Some(now),
            created_at: now,
            items,
        };
        let transaction_row_id = self.next_id();
        let transaction = TransactionView {
            id: transaction_row_id,
            user_id,
            order_id: Some(order_id),
            transaction_id: generate_transaction_id(),
            kind: "payment".into(),
            amount: draft.totals.total.clone(),
            currency: CURRENCY.into(),
            status: "success".into(),
            payment_method: draft.payment_method.clone(),
            metadata: draft.metadata(),
            created_at: now,
        };
        self.orders.push(order.clone());
        self.transactions.push(transaction.clone());

        Ok(CheckoutReceipt {
            order,
            transaction,
            totals: draft.totals,
            guest: draft.purchaser.is_guest(),
        })
    }

    fn binding(&self, order: &OrderRef) -> Option<OrderBinding> {
        self.orders
            .iter()
            .find(|o| match order {
                OrderRef::Id(id) => o.id == *id,
                OrderRef::Number(number) => &o.order_number == number,
            })
            .map(|o| OrderBinding {
                order_id: o.id,
                order_number: o.order_number.clone(),
                product_ids: o.items.iter().map(|i| i.product_id).collect(),
            })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store lock poisoned")
    }

    pub fn add_product(&self, title: &str, price: &str, stock: i32) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.products.insert(
            id,
            Product {
                id,
                title: title.into(),
                price: BigDecimal::from_str(price).expect("valid price"),
                stock,
                is_active: true,
            },
        );
        id
    }

    pub fn set_product_active(&self, product_id: i64, active: bool) {
        if let Some(p) = self.lock().products.get_mut(&product_id) {
            p.is_active = active;
        }
    }

    pub fn add_user(&self, email: &str, _role: &str, active: bool) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.users.push(UserRecord {
            id,
            email: email.into(),
            is_active: active,
        });
        id
    }

    pub fn add_discount(&self, code: &str, percent_off: i32, status: DiscountStatus) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.discounts.insert(
            code.into(),
            DiscountCode {
                id,
                code: code.into(),
                percent_off,
                status,
                created_by: None,
                created_at: Utc::now(),
                used_at: None,
                used_on_order: None,
            },
        );
        id
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn order_item_count(&self) -> usize {
        self.lock().orders.iter().map(|o| o.items.len()).sum()
    }

    pub fn transaction_count(&self) -> usize {
        self.lock().transactions.len()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }
}

impl InventoryLedger for InMemoryStore {
    fn load_products(&self, ids: &[i64]) -> Result<Vec<Product>, DomainError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    fn get_stock(&self, product_id: i64) -> Result<i32, DomainError> {
        self.lock()
            .products
            .get(&product_id)
            .map(|p| p.stock)
            .ok_or_else(|| DomainError::NotFound(format!("Product {product_id}")))
    }

    fn decrement_stock(&self, product_id: i64, quantity: i32) -> Result<i32, DomainError> {
        self.lock().decrement_stock(product_id, quantity)
    }

    fn restock(&self, product_id: i64, quantity: i32) -> Result<i32, DomainError> {
        let mut state = self.lock();
        let product = state.product_mut(product_id)?;
        product.stock += quantity;
        Ok(product.stock)
    }
}

impl DiscountLedger for InMemoryStore {
    fn find_discount(&self, code: &str) -> Result<Option<DiscountCode>, DomainError> {
        Ok(self.lock().discounts.get(code).cloned())
    }

    fn create_discount(&self, new: NewDiscountCode) -> Result<DiscountCode, DomainError> {
        let mut state = self.lock();
        if state.discounts.contains_key(&new.code) {
            return Err(DomainError::DuplicateCode(new.code));
        }
        let id = state.next_id();
        let code = DiscountCode {
            id,
            code: new.code.clone(),
            percent_off: new.percent_off,
            status: DiscountStatus::Active,
            created_by: new.created_by,
            created_at: Utc::now(),
            used_at: None,
            used_on_order: None,
        };
        state.discounts.insert(new.code, code.clone());
        Ok(code)
    }

    fn set_discount_status(
        &self,
        code: &str,
        status: DiscountStatus,
    ) -> Result<DiscountCode, DomainError> {
        let mut state = self.lock();
        let discount = state
            .discounts
            .get_mut(code)
            .filter(|d| d.status == DiscountStatus::Active)
            .ok_or_else(|| DomainError::DiscountNotFound(code.into()))?;
        discount.status = status;
        Ok(discount.clone())
    }
}

impl UserDirectory for InMemoryStore {
    fn find_active_user(&self, user_id: i64) -> Result<Option<i64>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.id == user_id && u.is_active)
            .map(|u| u.id))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<i64>, DomainError> {
        let email = normalize_email(email);
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| normalize_email(&u.email) == email)
            .map(|u| u.id))
    }
}

impl OrderRepository for InMemoryStore {
    fn commit_checkout(&self, draft: CheckoutDraft) -> Result<CheckoutReceipt, DomainError> {
        let mut state = self.lock();
        let mut work = state.clone();
        let receipt = work.apply_checkout(draft)?;
        *state = work;
        Ok(receipt)
    }

    fn find_order(&self, order: &OrderRef) -> Result<Option<OrderView>, DomainError> {
        let state = self.lock();
        Ok(state
            .orders
            .iter()
            .find(|o| match order {
                OrderRef::Id(id) => o.id == *id,
                OrderRef::Number(number) => &o.order_number == number,
            })
            .cloned())
    }

    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult<OrderView>, DomainError> {
        let offset = page_offset(page, limit)?;
        let state = self.lock();
        let items = state
            .orders
            .iter()
            .rev()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .map(|o| OrderView {
                items: vec![],
                ..o.clone()
            })
            .collect();
        Ok(ListResult {
            items,
            total: state.orders.len() as i64,
        })
    }
}

impl StockKeyRepository for InMemoryStore {
    fn create_key(&self, new: NewStockKey) -> Result<StockKey, DomainError> {
        let mut state = self.lock();
        if !state.products.contains_key(&new.product_id) {
            return Err(DomainError::NotFound(format!("Product {}", new.product_id)));
        }
        if state.keys.values().any(|k| k.game_key == new.game_key) {
            return Err(DomainError::DuplicateKey);
        }
        let id = state.next_id();
        let key = StockKey {
            id,
            product_id: new.product_id,
            game_key: new.game_key,
            status: StockKeyStatus::Available,
            order_id: None,
            order_number: None,
            notes: new.notes,
            created_at: Utc::now(),
            assigned_at: None,
        };
        state.keys.insert(id, key.clone());
        Ok(key)
    }

    fn bulk_create_keys(&self, keys: Vec<NewStockKey>) -> Result<usize, DomainError> {
        let mut inserted = 0;
        for key in keys {
            match self.create_key(key) {
                Ok(_) => inserted += 1,
                Err(DomainError::DuplicateKey) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(inserted)
    }

    fn find_key(&self, key_id: i64) -> Result<Option<StockKey>, DomainError> {
        Ok(self.lock().keys.get(&key_id).cloned())
    }

    fn assign_key(&self, key_id: i64, order: &OrderRef) -> Result<StockKey, DomainError> {
        let mut state = self.lock();
        let key = state.keys.get(&key_id).ok_or(DomainError::KeyNotFound)?;
        key.ensure_assignable()?;
        let binding = state.binding(order).ok_or(DomainError::OrderNotFound)?;
        binding.ensure_contains(key.product_id)?;

        let key = state
            .keys
            .get_mut(&key_id)
            .ok_or(DomainError::KeyNotFound)?;
        key.status = StockKeyStatus::Sold;
        key.order_id = Some(binding.order_id);
        key.order_number = Some(binding.order_number);
        key.assigned_at = Some(Utc::now());
        Ok(key.clone())
    }

    fn update_key(&self, key_id: i64, patch: StockKeyPatch) -> Result<StockKey, DomainError> {
        let mut state = self.lock();
        let key = state.keys.get(&key_id).ok_or(DomainError::KeyNotFound)?;
        key.ensure_patchable(&patch)?;
        if let Some(game_key) = &patch.game_key {
            if state
                .keys
                .values()
                .any(|k| k.id != key_id && &k.game_key == game_key)
            {
                return Err(DomainError::DuplicateKey);
            }
        }

        let key = state
            .keys
            .get_mut(&key_id)
            .ok_or(DomainError::KeyNotFound)?;
        if let Some(game_key) = patch.game_key {
            key.game_key = game_key;
        }
        if let Some(status) = patch.status {
            key.status = status;
        }
        if let Some(notes) = patch.notes {
            key.notes = Some(notes);
        }
        Ok(key.clone())
    }

    fn delete_key(&self, key_id: i64) -> Result<(), DomainError> {
        let mut state = self.lock();
        let key = state.keys.get(&key_id).ok_or(DomainError::KeyNotFound)?;
        key.ensure_deletable()?;
        state.keys.remove(&key_id);
        Ok(())
    }

    fn list_keys(
        &self,
        filter: &StockKeyFilter,
        page: i64,
        limit: i64,
    ) -> Result<ListResult<StockKey>, DomainError> {
        let offset = page_offset(page, limit)?;
        let state = self.lock();
        let matching: Vec<&StockKey> = state
            .keys
            .values()
            .rev()
            .filter(|k| filter.product_id.map_or(true, |p| k.product_id == p))
            .filter(|k| filter.status.map_or(true, |s| k.status == s))
            .collect();
        Ok(ListResult {
            total: matching.len() as i64,
            items: matching
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(limit as usize)
                .cloned()
                .collect(),
        })
    }
}
