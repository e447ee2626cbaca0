//! Bearer-token sessions.
//!
//! Tokens are HS256 JWTs carrying the user id and role. Checkout accepts
//! anonymous callers, so [`Session`] never rejects a request; the admin
//! routes use [`AdminSession`], which does.

use std::future::{ready, Ready};

use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::identity::Requester;
use crate::errors::AppError;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn create_token(&self, user_id: i64, role: &str, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn keys(req: &HttpRequest) -> Result<&web::Data<JwtKeys>, AppError> {
    req.app_data::<web::Data<JwtKeys>>()
        .ok_or_else(|| AppError::Internal("JWT keys are not configured".into()))
}

/// Verified claims with a numeric subject, or `None`.
fn claims_of(req: &HttpRequest) -> Result<Option<(i64, Claims)>, AppError> {
    let Some(token) = bearer_token(req) else {
        return Ok(None);
    };
    let claims = match keys(req)?.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            log::debug!("Rejected bearer token: {e}");
            return Ok(None);
        }
    };
    Ok(claims.sub.parse::<i64>().ok().map(|id| (id, claims)))
}

/// The caller as seen by checkout. Invalid tokens degrade to anonymous.
#[derive(Debug, Clone, Copy)]
pub struct Session(pub Requester);

impl FromRequest for Session {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(claims_of(req).map(|found| {
            Session(match found {
                Some((user_id, _)) => Requester::Authenticated { user_id },
                None => Requester::Anonymous,
            })
        }))
    }
}

/// A caller holding a valid token with the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession {
    pub user_id: i64,
}

impl FromRequest for AdminSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(match claims_of(req) {
            Ok(Some((user_id, claims))) if claims.role == ADMIN_ROLE => Ok(AdminSession { user_id }),
            Ok(Some(_)) => Err(AppError::Forbidden),
            Ok(None) => Err(AppError::Unauthorized(
                "A valid bearer token is required".into(),
            )),
            Err(e) => Err(e),
        })
    }
}
