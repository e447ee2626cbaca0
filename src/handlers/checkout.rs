use actix_web::http::header::USER_AGENT;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use super::orders::{OrderResponse, TransactionResponse};
use crate::auth::Session;
use crate::domain::checkout::{BillingDetails, CartLine, CheckoutRequest, ClientMeta};
use crate::domain::errors::DomainError;
use crate::domain::money::Totals;
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemRequest {
    #[serde(rename = "productId")]
    pub product_id: i64,
    pub quantity: i32,
}

/// Missing fields deserialize to empty values and are reported together by
/// checkout validation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutBody {
    #[serde(rename = "cartItems", default)]
    pub cart_items: Vec<CartItemRequest>,
    #[serde(rename = "paymentMethod", default)]
    pub payment_method: String,
    #[serde(default)]
    pub billing_name: String,
    #[serde(default)]
    pub billing_email: String,
    #[serde(default)]
    pub billing_zip: String,
    #[serde(default)]
    pub discount_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalsResponse {
    pub subtotal: String,
    pub discount: String,
    pub tax: String,
    pub total: String,
    pub tax_rate: String,
}

impl From<Totals> for TotalsResponse {
    fn from(t: Totals) -> Self {
        Self {
            subtotal: t.subtotal.to_string(),
            discount: t.discount.to_string(),
            tax: t.tax.to_string(),
            total: t.total.to_string(),
            tax_rate: t.tax_rate.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub message: String,
    pub order: OrderResponse,
    pub transaction: TransactionResponse,
    pub totals: TotalsResponse,
    #[serde(rename = "isGuestCheckout")]
    pub is_guest_checkout: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaxParams {
    pub zip: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaxResponse {
    pub zip: String,
    pub rate: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DiscountParams {
    pub code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountValidResponse {
    pub valid: bool,
    pub code: String,
    pub percent_off: i32,
}

/// Width of `orders.ip_address`. Forwarded headers are client supplied.
const MAX_IP_LEN: usize = 64;

fn client_meta(req: &HttpRequest) -> ClientMeta {
    ClientMeta {
        ip_address: req
            .connection_info()
            .realip_remote_addr()
            .map(|ip| ip.chars().take(MAX_IP_LEN).collect()),
        user_agent: req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /checkout
///
/// Validates the cart, prices it, fetches the tax rate and commits the order,
/// its items, the stock decrements, the discount consumption and the payment
/// transaction as one unit. Callers without a valid session check out as
/// guests.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutBody,
    responses(
        (status = 201, description = "Order placed", body = CheckoutResponse),
        (status = 400, description = "Invalid cart, billing details or discount code"),
        (status = 409, description = "Not enough stock; body carries productId and availableStock"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "checkout"
)]
pub async fn checkout(
    req: HttpRequest,
    session: Session,
    state: web::Data<AppState>,
    body: web::Json<CheckoutBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let request = CheckoutRequest {
        lines: body
            .cart_items
            .iter()
            .map(|i| CartLine {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect(),
        payment_method: body.payment_method,
        billing: BillingDetails {
            name: body.billing_name,
            email: body.billing_email,
            zip: body.billing_zip,
        },
        discount_code: body.discount_code,
        requester: session.0,
        client: client_meta(&req),
    };

    let receipt = state.checkout.place_order(request).await?;

    Ok(HttpResponse::Created().json(CheckoutResponse {
        message: "Order placed successfully".to_string(),
        order: receipt.order.into(),
        transaction: receipt.transaction.into(),
        totals: receipt.totals.into(),
        is_guest_checkout: receipt.guest,
    }))
}

/// GET /checkout/tax?zip=
///
/// Always answers with a rate; oracle failures fall back to the default.
#[utoipa::path(
    get,
    path = "/checkout/tax",
    params(TaxParams),
    responses(
        (status = 200, description = "Tax rate for the postal code", body = TaxResponse),
        (status = 400, description = "zip is missing"),
    ),
    tag = "checkout"
)]
pub async fn tax_rate(
    state: web::Data<AppState>,
    query: web::Query<TaxParams>,
) -> Result<HttpResponse, AppError> {
    let zip = query
        .into_inner()
        .zip
        .map(|z| z.trim().to_string())
        .filter(|z| !z.is_empty())
        .ok_or_else(|| AppError::BadRequest("zip is required".into()))?;

    let rate = state.checkout.tax_rate(&zip).await;

    Ok(HttpResponse::Ok().json(TaxResponse {
        zip,
        rate: rate.to_string(),
    }))
}

/// GET /checkout/validate-discount?code=
///
/// Read-only: the code is not consumed.
#[utoipa::path(
    get,
    path = "/checkout/validate-discount",
    params(DiscountParams),
    responses(
        (status = 200, description = "Code can be applied", body = DiscountValidResponse),
        (status = 400, description = "Code missing or no longer active"),
        (status = 404, description = "Code not found"),
    ),
    tag = "checkout"
)]
pub async fn validate_discount(
    state: web::Data<AppState>,
    query: web::Query<DiscountParams>,
) -> Result<HttpResponse, AppError> {
    let code = query.into_inner().code.unwrap_or_default();

    match state.checkout.validate_discount(&code).await {
        Ok(discount) => Ok(HttpResponse::Ok().json(DiscountValidResponse {
            valid: true,
            code: discount.code,
            percent_off: discount.percent_off,
        })),
        Err(e @ DomainError::DiscountNotFound(_)) => {
            Ok(HttpResponse::NotFound().json(json!({ "valid": false, "error": e.to_string() })))
        }
        Err(e @ (DomainError::DiscountNotActive { .. } | DomainError::InvalidInput(_))) => {
            Ok(HttpResponse::BadRequest().json(json!({ "valid": false, "error": e.to_string() })))
        }
        Err(e) => Err(e.into()),
    }
}
