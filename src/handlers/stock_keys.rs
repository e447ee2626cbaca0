use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::orders::{default_limit, default_page};
use crate::application::stock_key_service::BulkOutcome;
use crate::auth::AdminSession;
use crate::domain::stock_key::{OrderRef, StockKey, StockKeyFilter, StockKeyPatch, StockKeyStatus};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStockKeyRequest {
    pub product_id: i64,
    pub game_key: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkStockKeysRequest {
    pub product_id: i64,
    pub game_keys: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkStockKeysResponse {
    pub inserted: usize,
    pub skipped: usize,
}

impl From<BulkOutcome> for BulkStockKeysResponse {
    fn from(o: BulkOutcome) -> Self {
        Self {
            inserted: o.inserted,
            skipped: o.skipped,
        }
    }
}

/// Exactly one of the two must be given.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignStockKeyRequest {
    pub order_id: Option<i64>,
    pub order_number: Option<String>,
}

impl AssignStockKeyRequest {
    fn target(self) -> Result<OrderRef, AppError> {
        match (self.order_id, self.order_number) {
            (Some(id), None) => Ok(OrderRef::Id(id)),
            (None, Some(number)) if !number.trim().is_empty() => {
                Ok(OrderRef::Number(number.trim().to_string()))
            }
            _ => Err(AppError::BadRequest(
                "Provide either order_id or order_number".into(),
            )),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStockKeyRequest {
    pub game_key: Option<String>,
    /// `available` or `reserved`
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListStockKeysParams {
    pub product_id: Option<i64>,
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockKeyResponse {
    pub id: i64,
    pub product_id: i64,
    pub game_key: String,
    pub status: String,
    pub order_id: Option<i64>,
    pub order_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub assigned_at: Option<String>,
}

impl From<StockKey> for StockKeyResponse {
    fn from(k: StockKey) -> Self {
        Self {
            id: k.id,
            product_id: k.product_id,
            game_key: k.game_key,
            status: k.status.to_string(),
            order_id: k.order_id,
            order_number: k.order_number,
            notes: k.notes,
            created_at: k.created_at.to_rfc3339(),
            assigned_at: k.assigned_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListStockKeysResponse {
    pub items: Vec<StockKeyResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

fn parse_status(raw: Option<String>) -> Result<Option<StockKeyStatus>, AppError> {
    Ok(raw
        .map(|s| s.trim().parse::<StockKeyStatus>())
        .transpose()?)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /admin/stock-keys
#[utoipa::path(
    post,
    path = "/admin/stock-keys",
    request_body = CreateStockKeyRequest,
    responses(
        (status = 201, description = "Key created", body = StockKeyResponse),
        (status = 400, description = "Blank game key"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Game key already exists"),
    ),
    tag = "stock-keys"
)]
pub async fn create_key(
    _admin: AdminSession,
    state: web::Data<AppState>,
    body: web::Json<CreateStockKeyRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let key = web::block(move || {
        state
            .stock_keys
            .create(body.product_id, &body.game_key, body.notes)
    })
    .await??;
    Ok(HttpResponse::Created().json(StockKeyResponse::from(key)))
}

/// POST /admin/stock-keys/bulk
///
/// Keys that already exist, repeat within the batch, or are blank are
/// skipped.
#[utoipa::path(
    post,
    path = "/admin/stock-keys/bulk",
    request_body = BulkStockKeysRequest,
    responses(
        (status = 201, description = "Keys inserted", body = BulkStockKeysResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "stock-keys"
)]
pub async fn bulk_create_keys(
    _admin: AdminSession,
    state: web::Data<AppState>,
    body: web::Json<BulkStockKeysRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let outcome = web::block(move || {
        state
            .stock_keys
            .bulk_create(body.product_id, &body.game_keys)
    })
    .await??;
    Ok(HttpResponse::Created().json(BulkStockKeysResponse::from(outcome)))
}

/// GET /admin/stock-keys/{id}
#[utoipa::path(
    get,
    path = "/admin/stock-keys/{id}",
    params(("id" = i64, Path, description = "Stock key id")),
    responses(
        (status = 200, description = "Key found", body = StockKeyResponse),
        (status = 404, description = "Key not found"),
    ),
    tag = "stock-keys"
)]
pub async fn get_key(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let key_id = path.into_inner();
    let key = web::block(move || state.stock_keys.get(key_id)).await??;
    Ok(HttpResponse::Ok().json(StockKeyResponse::from(key)))
}

/// PUT /admin/stock-keys/{id}/assign
///
/// Marks an available key as sold on an order that contains its product.
#[utoipa::path(
    put,
    path = "/admin/stock-keys/{id}/assign",
    params(("id" = i64, Path, description = "Stock key id")),
    request_body = AssignStockKeyRequest,
    responses(
        (status = 200, description = "Key assigned", body = StockKeyResponse),
        (status = 400, description = "Order does not contain the key's product"),
        (status = 404, description = "Key or order not found"),
        (status = 409, description = "Key is not available"),
    ),
    tag = "stock-keys"
)]
pub async fn assign_key(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<AssignStockKeyRequest>,
) -> Result<HttpResponse, AppError> {
    let key_id = path.into_inner();
    let target = body.into_inner().target()?;
    let key = web::block(move || state.stock_keys.assign(key_id, &target)).await??;
    Ok(HttpResponse::Ok().json(StockKeyResponse::from(key)))
}

/// PUT /admin/stock-keys/{id}
#[utoipa::path(
    put,
    path = "/admin/stock-keys/{id}",
    params(("id" = i64, Path, description = "Stock key id")),
    request_body = UpdateStockKeyRequest,
    responses(
        (status = 200, description = "Key updated", body = StockKeyResponse),
        (status = 400, description = "Invalid status or blank game key"),
        (status = 404, description = "Key not found"),
        (status = 409, description = "Key already sold, or game key taken"),
    ),
    tag = "stock-keys"
)]
pub async fn update_key(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateStockKeyRequest>,
) -> Result<HttpResponse, AppError> {
    let key_id = path.into_inner();
    let body = body.into_inner();
    let patch = StockKeyPatch {
        game_key: body.game_key,
        status: parse_status(body.status)?,
        notes: body.notes,
    };
    let key = web::block(move || state.stock_keys.update(key_id, patch)).await??;
    Ok(HttpResponse::Ok().json(StockKeyResponse::from(key)))
}

/// DELETE /admin/stock-keys/{id}
#[utoipa::path(
    delete,
    path = "/admin/stock-keys/{id}",
    params(("id" = i64, Path, description = "Stock key id")),
    responses(
        (status = 204, description = "Key deleted"),
        (status = 400, description = "Key is sold"),
        (status = 404, description = "Key not found"),
    ),
    tag = "stock-keys"
)]
pub async fn delete_key(
    _admin: AdminSession,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let key_id = path.into_inner();
    web::block(move || state.stock_keys.delete(key_id)).await??;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /admin/stock-keys
///
/// Paginated, newest first, optionally filtered by product and status.
#[utoipa::path(
    get,
    path = "/admin/stock-keys",
    params(ListStockKeysParams),
    responses(
        (status = 200, description = "Paginated list of keys", body = ListStockKeysResponse),
        (status = 400, description = "Unknown status filter"),
    ),
    tag = "stock-keys"
)]
pub async fn list_keys(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<ListStockKeysParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    let filter = StockKeyFilter {
        product_id: params.product_id,
        status: parse_status(params.status)?,
    };

    let result = web::block(move || state.stock_keys.list(&filter, page, limit)).await??;

    Ok(HttpResponse::Ok().json(ListStockKeysResponse {
        items: result.items.into_iter().map(StockKeyResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}
