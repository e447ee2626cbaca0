use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::domain::discount::DiscountCode;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderItemView, OrderView, TransactionView};
use crate::domain::product::Product;
use crate::domain::stock_key::StockKey;
use crate::schema::{
    discount_codes, order_items, orders, products, stock_keys, transactions, users,
};

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub is_guest: bool,
}

// ── Products ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i64,
    pub title: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub is_active: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            title: row.title,
            price: row.price,
            stock: row.stock,
            is_active: row.is_active,
        }
    }
}

// ── Discount codes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = discount_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DiscountCodeRow {
    pub id: i64,
    pub code: String,
    pub percent_off: i32,
    pub status: String,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub used_on_order: Option<String>,
}

impl TryFrom<DiscountCodeRow> for DiscountCode {
    type Error = DomainError;

    fn try_from(row: DiscountCodeRow) -> Result<Self, Self::Error> {
        Ok(DiscountCode {
            id: row.id,
            code: row.code,
            percent_off: row.percent_off,
            status: row.status.parse()?,
            created_by: row.created_by,
            created_at: row.created_at,
            used_at: row.used_at,
            used_on_order: row.used_on_order,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = discount_codes)]
pub struct NewDiscountCodeRow<'a> {
    pub code: &'a str,
    pub percent_off: i32,
    pub status: &'a str,
    pub created_by: Option<i64>,
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub order_number: String,
    pub status: String,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub discount: BigDecimal,
    pub total: BigDecimal,
    pub discount_code: Option<String>,
    pub payment_method: String,
    pub payment_status: String,
    pub billing_name: String,
    pub billing_email: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_view(self, items: Vec<OrderItemRow>) -> Result<OrderView, DomainError> {
        Ok(OrderView {
            id: self.id,
            user_id: self.user_id,
            order_number: self.order_number,
            status: self.status.parse()?,
            subtotal: self.subtotal,
            tax: self.tax,
            discount: self.discount,
            total: self.total,
            discount_code: self.discount_code,
            payment_method: self.payment_method,
            payment_status: self.payment_status.parse()?,
            billing_name: self.billing_name,
            billing_email: self.billing_email,
            completed_at: self.completed_at,
            created_at: self.created_at,
            items: items.into_iter().map(OrderItemView::from).collect(),
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub user_id: i64,
    pub order_number: &'a str,
    pub status: &'a str,
    pub subtotal: &'a BigDecimal,
    pub tax: &'a BigDecimal,
    pub discount: &'a BigDecimal,
    pub total: &'a BigDecimal,
    pub discount_code: Option<&'a str>,
    pub payment_method: &'a str,
    pub payment_status: &'a str,
    pub billing_name: &'a str,
    pub billing_email: &'a str,
    pub billing_zip: &'a str,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
}

impl From<OrderItemRow> for OrderItemView {
    fn from(row: OrderItemRow) -> Self {
        OrderItemView {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            subtotal: row.subtotal,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow<'a> {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: &'a BigDecimal,
    pub subtotal: &'a BigDecimal,
}

// ── Transactions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransactionRow {
    pub id: i64,
    pub user_id: i64,
    pub order_id: Option<i64>,
    pub transaction_id: String,
    pub kind: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub status: String,
    pub payment_method: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionRow> for TransactionView {
    fn from(row: TransactionRow) -> Self {
        TransactionView {
            id: row.id,
            user_id: row.user_id,
            order_id: row.order_id,
            transaction_id: row.transaction_id,
            kind: row.kind,
            amount: row.amount,
            currency: row.currency,
            status: row.status,
            payment_method: row.payment_method,
            metadata: row.metadata,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = transactions)]
pub struct NewTransactionRow<'a> {
    pub user_id: i64,
    pub order_id: Option<i64>,
    pub transaction_id: &'a str,
    pub kind: &'a str,
    pub amount: &'a BigDecimal,
    pub currency: &'a str,
    pub status: &'a str,
    pub payment_method: &'a str,
    pub payment_gateway: Option<&'a str>,
    pub metadata: Value,
}

// ── Stock keys ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = stock_keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StockKeyRow {
    pub id: i64,
    pub product_id: i64,
    pub game_key: String,
    pub status: String,
    pub order_id: Option<i64>,
    pub order_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
}

impl TryFrom<StockKeyRow> for StockKey {
    type Error = DomainError;

    fn try_from(row: StockKeyRow) -> Result<Self, Self::Error> {
        Ok(StockKey {
            id: row.id,
            product_id: row.product_id,
            game_key: row.game_key,
            status: row.status.parse()?,
            order_id: row.order_id,
            order_number: row.order_number,
            notes: row.notes,
            created_at: row.created_at,
            assigned_at: row.assigned_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = stock_keys)]
pub struct NewStockKeyRow<'a> {
    pub product_id: i64,
    pub game_key: &'a str,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = stock_keys)]
pub struct StockKeyChangeset<'a> {
    pub game_key: Option<&'a str>,
    pub status: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub updated_at: Option<DateTime<Utc>>,
}
