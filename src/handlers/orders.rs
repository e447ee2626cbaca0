use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::AdminSession;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderItemView, OrderView, TransactionView};
use crate::errors::AppError;
use crate::state::AppState;

// ── Response DTOs ────────────────────────────────────────────────────────────

/// Money is rendered as decimal strings, e.g. "107.98".
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            subtotal: item.subtotal.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    pub order_number: String,
    pub status: String,
    pub subtotal: String,
    pub tax: String,
    pub discount: String,
    pub total: String,
    pub discount_code: Option<String>,
    pub payment_method: String,
    pub payment_status: String,
    pub billing_name: String,
    pub billing_email: String,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        Self {
            id: o.id,
            user_id: o.user_id,
            order_number: o.order_number,
            status: o.status.to_string(),
            subtotal: o.subtotal.to_string(),
            tax: o.tax.to_string(),
            discount: o.discount.to_string(),
            total: o.total.to_string(),
            discount_code: o.discount_code,
            payment_method: o.payment_method,
            payment_status: o.payment_status.to_string(),
            billing_name: o.billing_name,
            billing_email: o.billing_email,
            completed_at: o.completed_at.map(|t| t.to_rfc3339()),
            created_at: o.created_at.to_rfc3339(),
            items: o.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i64,
    pub transaction_id: String,
    pub order_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub currency: String,
    pub status: String,
    pub payment_method: String,
    pub created_at: String,
}

impl From<TransactionView> for TransactionResponse {
    fn from(t: TransactionView) -> Self {
        Self {
            id: t.id,
            transaction_id: t.transaction_id,
            order_id: t.order_id,
            kind: t.kind,
            amount: t.amount.to_string(),
            currency: t.currency,
            status: t.status,
            payment_method: t.payment_method,
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub(crate) fn default_page() -> i64 {
    1
}

pub(crate) fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /admin/orders/{id}
///
/// Returns the order together with its line items.
#[utoipa::path(
    get,
    path = "/admin/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Order not found"),
    ),
    tag = "admin"
)]
pub async fn get_order(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || state.orders.get_order(order_id))
        .await??
        .ok_or(DomainError::OrderNotFound)?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /admin/orders
///
/// Returns a paginated list of orders (without their items), newest first.
#[utoipa::path(
    get,
    path = "/admin/orders",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin"),
    ),
    tag = "admin"
)]
pub async fn list_orders(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || state.orders.list_orders(page, limit)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}
