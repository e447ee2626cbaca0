use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AdminSession;
use crate::domain::discount::{DiscountCode, DiscountStatus};
use crate::domain::errors::DomainError;
use crate::errors::AppError;
use crate::state::AppState;

// ── Inventory ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct StockResponse {
    #[serde(rename = "productId")]
    pub product_id: i64,
    pub stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestockRequest {
    pub quantity: i32,
}

/// GET /admin/products/{id}/stock
#[utoipa::path(
    get,
    path = "/admin/products/{id}/stock",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Current stock", body = StockResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "admin"
)]
pub async fn product_stock(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let stock = web::block(move || state.inventory.stock(product_id)).await??;
    Ok(HttpResponse::Ok().json(StockResponse { product_id, stock }))
}

/// POST /admin/products/{id}/restock
#[utoipa::path(
    post,
    path = "/admin/products/{id}/restock",
    params(("id" = i64, Path, description = "Product id")),
    request_body = RestockRequest,
    responses(
        (status = 200, description = "Stock after restocking", body = StockResponse),
        (status = 400, description = "Quantity below 1"),
        (status = 404, description = "Product not found"),
    ),
    tag = "admin"
)]
pub async fn restock(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<RestockRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let quantity = body.into_inner().quantity;
    let stock = web::block(move || state.inventory.restock(product_id, quantity)).await??;
    Ok(HttpResponse::Ok().json(StockResponse { product_id, stock }))
}

// ── Discount codes ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDiscountRequest {
    pub code: String,
    pub percent_off: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DiscountStatusRequest {
    /// `expired` or `disabled`
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountResponse {
    pub id: i64,
    pub code: String,
    pub percent_off: i32,
    pub status: String,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub used_at: Option<String>,
    pub used_on_order: Option<String>,
}

impl From<DiscountCode> for DiscountResponse {
    fn from(d: DiscountCode) -> Self {
        Self {
            id: d.id,
            code: d.code,
            percent_off: d.percent_off,
            status: d.status.to_string(),
            created_by: d.created_by,
            created_at: d.created_at.to_rfc3339(),
            used_at: d.used_at.map(|t| t.to_rfc3339()),
            used_on_order: d.used_on_order,
        }
    }
}

/// POST /admin/discount-codes
#[utoipa::path(
    post,
    path = "/admin/discount-codes",
    request_body = CreateDiscountRequest,
    responses(
        (status = 201, description = "Code created", body = DiscountResponse),
        (status = 400, description = "Blank code or percent outside 0-100"),
        (status = 409, description = "Code already exists"),
    ),
    tag = "admin"
)]
pub async fn create_discount(
    admin: AdminSession,
    state: web::Data<AppState>,
    body: web::Json<CreateDiscountRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let created = web::block(move || {
        state
            .discounts
            .create(&body.code, body.percent_off, Some(admin.user_id))
    })
    .await??;
    Ok(HttpResponse::Created().json(DiscountResponse::from(created)))
}

/// PUT /admin/discount-codes/{code}/status
///
/// Retires an active code.
#[utoipa::path(
    put,
    path = "/admin/discount-codes/{code}/status",
    params(("code" = String, Path, description = "Discount code")),
    request_body = DiscountStatusRequest,
    responses(
        (status = 200, description = "Code retired", body = DiscountResponse),
        (status = 400, description = "Unknown target status or code not active"),
        (status = 404, description = "Code not found"),
    ),
    tag = "admin"
)]
pub async fn set_discount_status(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<DiscountStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();
    let status: DiscountStatus = body.into_inner().status.trim().parse()?;
    let updated = web::block(move || state.discounts.retire(&code, status))
        .await?
        .map_err(|e| match e {
            DomainError::DiscountNotFound(_) => AppError::NotFound(e.to_string()),
            other => other.into(),
        })?;
    Ok(HttpResponse::Ok().json(DiscountResponse::from(updated)))
}
