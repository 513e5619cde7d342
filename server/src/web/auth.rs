// server/src/web/auth.rs

use actix_web::{web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
  pub sub: String,
  pub role: String,
  pub exp: i64,
}

/// Signs an HS256 admin token valid for `ttl`.
pub fn issue_admin_token(secret: &str, subject: &str, ttl: Duration) -> Result<String, AppError> {
  let claims = AdminClaims {
    sub: subject.to_string(),
    role: ADMIN_ROLE.to_string(),
    exp: (Utc::now() + ttl).timestamp(),
  };
  encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

pub fn verify_admin_token(secret: &str, token: &str) -> Result<AdminClaims, AppError> {
  let data = decode::<AdminClaims>(
    token,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::new(Algorithm::HS256),
  )
  .map_err(|e| match e.kind() {
    ErrorKind::ExpiredSignature => AppError::Auth("Token expired".to_string()),
    _ => AppError::Auth("Invalid token".to_string()),
  })?;
  if data.claims.role != ADMIN_ROLE {
    return Err(AppError::Forbidden("Admin role required".to_string()));
  }
  Ok(data.claims)
}

/// Extractor guarding the admin routes. Without a configured secret every
/// request passes as an anonymous admin.
#[derive(Debug)]
pub struct AdminUser {
  pub subject: String,
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    futures_util::future::ready(authenticate(req))
  }
}

fn authenticate(req: &HttpRequest) -> Result<AdminUser, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("application state missing".to_string()))?;
  let Some(secret) = state.config.admin_jwt_secret.as_deref() else {
    return Ok(AdminUser {
      subject: "anonymous".to_string(),
    });
  };

  let token = req
    .headers()
    .get(actix_web::http::header::AUTHORIZATION)
    .and_then(|h| h.to_str().ok())
    .and_then(|h| h.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty());
  let Some(token) = token else {
    warn!(path = %req.path(), "Admin request without bearer token.");
    return Err(AppError::Auth("Bearer token required".to_string()));
  };
  let claims = verify_admin_token(secret, token)?;
  Ok(AdminUser { subject: claims.sub })
}
