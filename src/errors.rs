use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Admin access required")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Rendered with the product and the stock left so the client can
    /// refresh its cart.
    #[error("{message}")]
    OutOfStock {
        message: String,
        product_id: i64,
        available: i32,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let message = e.to_string();
        match e {
            DomainError::InvalidInput(msg) => AppError::BadRequest(msg),
            DomainError::ProductUnavailable { .. }
            | DomainError::InvalidQuantity { .. }
            | DomainError::DiscountNotActive { .. }
            | DomainError::ProductMismatch { .. }
            | DomainError::CannotDeleteSoldKey => AppError::BadRequest(message),
            // An unknown code is bad checkout input; the validate endpoint
            // renders it as 404 itself.
            DomainError::DiscountNotFound(_) => AppError::BadRequest(message),
            DomainError::KeyNotFound | DomainError::OrderNotFound | DomainError::NotFound(_) => {
                AppError::NotFound(message)
            }
            DomainError::InsufficientStock {
                product_id,
                available,
            }
            | DomainError::StockRaceLost {
                product_id,
                available,
            } => AppError::OutOfStock {
                message,
                product_id,
                available,
            },
            DomainError::DiscountAlreadyUsed(_)
            | DomainError::DuplicateCode(_)
            | DomainError::KeyNotAvailable { .. }
            | DomainError::DuplicateKey => AppError::Conflict(message),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::OutOfStock { .. } => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut resp = HttpResponse::build(self.status_code());
        match self {
            AppError::OutOfStock {
                message,
                product_id,
                available,
            } => resp.json(json!({
                "error": message,
                "productId": product_id,
                "availableStock": available,
            })),
            AppError::Internal(detail) => {
                log::error!("Request failed: {detail}");
                resp.json(json!({ "error": "Internal server error" }))
            }
            other => resp.json(json!({ "error": other.to_string() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discount::DiscountStatus;
    use crate::domain::stock_key::StockKeyStatus;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;

    fn status_of(e: DomainError) -> StatusCode {
        AppError::from(e).error_response().status()
    }

    #[test]
    fn validation_errors_are_400() {
        assert_eq!(status_of(DomainError::InvalidInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DomainError::ProductUnavailable { product_id: 1 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::DiscountNotActive {
                status: DiscountStatus::Used
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::ProductMismatch {
                product_id: 5,
                order_number: "ORD-1".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(DomainError::CannotDeleteSoldKey), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_resources_are_404() {
        assert_eq!(status_of(DomainError::KeyNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DomainError::OrderNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DomainError::NotFound("Product 9".into())), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflicts_are_409() {
        assert_eq!(
            status_of(DomainError::KeyNotAvailable {
                status: StockKeyStatus::Sold
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(DomainError::DuplicateKey), StatusCode::CONFLICT);
        assert_eq!(
            status_of(DomainError::DiscountAlreadyUsed("SAVE10".into())),
            StatusCode::CONFLICT
        );
    }

    #[actix_web::test]
    async fn stock_conflict_carries_product_and_available_stock() {
        let resp = AppError::from(DomainError::StockRaceLost {
            product_id: 1,
            available: 1,
        })
        .error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["productId"], 1);
        assert_eq!(json["availableStock"], 1);
        assert!(json["error"].is_string());
    }

    #[actix_web::test]
    async fn internal_error_hides_details() {
        let resp = AppError::from(DomainError::Internal("pool exhausted".into())).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }

    #[test]
    fn display_messages() {
        assert_eq!(AppError::Forbidden.to_string(), "Admin access required");
        assert_eq!(
            AppError::Internal("msg".to_string()).to_string(),
            "Internal error: msg"
        );
    }
}
