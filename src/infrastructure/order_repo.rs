use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use super::models::{
    NewOrderItemRow, NewOrderRow, NewTransactionRow, OrderItemRow, OrderRow, TransactionRow,
};
use super::store::DieselStore;
use super::{discount_repo, inventory_repo, user_repo};
use crate::domain::checkout::{generate_order_number, generate_transaction_id, CheckoutDraft};
use crate::domain::errors::DomainError;
use crate::domain::money::CURRENCY;
use crate::domain::order::{
    page_offset, CheckoutReceipt, ListResult, OrderStatus, OrderView, PaymentStatus,
};
use crate::domain::ports::OrderRepository;
use crate::domain::stock_key::OrderRef;
use crate::schema::{order_items, orders, transactions};

/// Payments are recorded, not processed; every committed checkout is paid.
const PAYMENT_GATEWAY: &str = "internal";

pub(super) fn find_order_row(
    conn: &mut PgConnection,
    order: &OrderRef,
) -> Result<Option<OrderRow>, DomainError> {
    let query = orders::table.select(OrderRow::as_select()).into_boxed();
    let query = match order {
        OrderRef::Id(id) => query.filter(orders::id.eq(*id)),
        OrderRef::Number(number) => query.filter(orders::order_number.eq(number.clone())),
    };
    Ok(query.first(conn).optional()?)
}

fn commit(conn: &mut PgConnection, draft: &CheckoutDraft) -> Result<CheckoutReceipt, DomainError> {
    // 1. Owner of the order
    let user_id = user_repo::resolve_purchaser(conn, &draft.purchaser)?;

    // 2. Order row
    let order_number = generate_order_number();
    let now = Utc::now();
    let order = diesel::insert_into(orders::table)
        .values(&NewOrderRow {
            user_id,
            order_number: &order_number,
            status: OrderStatus::Completed.as_str(),
            subtotal: &draft.totals.subtotal,
            tax: &draft.totals.tax,
            discount: &draft.totals.discount,
            total: &draft.totals.total,
            discount_code: draft.discount.as_ref().map(|d| d.code.as_str()),
            payment_method: &draft.payment_method,
            payment_status: PaymentStatus::Paid.as_str(),
            billing_name: draft.billing.name.trim(),
            billing_email: draft.billing.email.trim(),
            billing_zip: draft.billing.zip.trim(),
            ip_address: draft.client.ip_address.as_deref(),
            user_agent: draft.client.user_agent.as_deref(),
            completed_at: Some(now),
        })
        .returning(OrderRow::as_returning())
        .get_result(conn)?;

    // 3. Line items with frozen prices
    let new_items: Vec<NewOrderItemRow> = draft
        .lines
        .iter()
        .map(|l| NewOrderItemRow {
            order_id: order.id,
            product_id: l.product_id,
            quantity: l.quantity,
            unit_price: &l.unit_price,
            subtotal: &l.subtotal,
        })
        .collect();
    let items = diesel::insert_into(order_items::table)
        .values(&new_items)
        .returning(OrderItemRow::as_returning())
        .get_results(conn)?;

    // 4. Stock, re-checked against the locked rows
    inventory_repo::lock_products(conn, &draft.lock_order())?;
    for line in &draft.lines {
        inventory_repo::decrement_stock(conn, line.product_id, line.quantity).map_err(|e| {
            match e {
                DomainError::InsufficientStock {
                    product_id,
                    available,
                } => DomainError::StockRaceLost {
                    product_id,
                    available,
                },
                other => other,
            }
        })?;
    }

    // 5. Discount consumption
    if let Some(applied) = &draft.discount {
        discount_repo::consume(conn, &applied.code, &order_number, now)?;
    }

    // 6. Payment ledger entry
    let transaction_id = generate_transaction_id();
    let transaction = diesel::insert_into(transactions::table)
        .values(&NewTransactionRow {
            user_id,
            order_id: Some(order.id),
            transaction_id: &transaction_id,
            kind: "payment",
            amount: &draft.totals.total,
            currency: CURRENCY,
            status: "success",
            payment_method: &draft.payment_method,
            payment_gateway: Some(PAYMENT_GATEWAY),
            metadata: draft.metadata(),
        })
        .returning(TransactionRow::as_returning())
        .get_result(conn)?;

    Ok(CheckoutReceipt {
        order: order.into_view(items)?,
        transaction: transaction.into(),
        totals: draft.totals.clone(),
        guest: draft.purchaser.is_guest(),
    })
}

impl OrderRepository for DieselStore {
    fn commit_checkout(&self, draft: CheckoutDraft) -> Result<CheckoutReceipt, DomainError> {
        let mut conn = self.conn()?;
        conn.transaction::<_, DomainError, _>(|conn| commit(conn, &draft))
    }

    fn find_order(&self, order: &OrderRef) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.conn()?;

        let Some(order) = find_order_row(&mut conn, order)? else {
            return Ok(None);
        };

        let items = OrderItemRow::belonging_to(&order)
            .select(OrderItemRow::as_select())
            .order(order_items::id.asc())
            .load(&mut conn)?;

        order.into_view(items).map(Some)
    }

    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult<OrderView>, DomainError> {
        let mut conn = self.conn()?;

        let offset = page_offset(page, limit)?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.desc()))
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(|o| o.into_view(vec![]))
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }
}
