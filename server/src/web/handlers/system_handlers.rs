// server/src/web/handlers/system_handlers.rs

use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::{AppError, Result};
use crate::state::AppState;

pub async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok", "store": app_state.store_name }))
}

/// Serves a stored upload. Only the flat file names written by the upload
/// path are accepted.
pub async fn upload_file_handler(app_state: web::Data<AppState>, file: web::Path<String>) -> Result<HttpResponse> {
  let name = file.into_inner();
  let valid = !name.is_empty()
    && name
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    && !name.starts_with('.');
  if !valid {
    return Err(AppError::NotFound(format!("upload {name}")));
  }
  let bytes = match tokio::fs::read(app_state.config.upload_dir.join(&name)).await {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(AppError::NotFound(format!("upload {name}"))),
    Err(e) => return Err(AppError::Internal(format!("could not read upload: {e}"))),
  };
  let content_type = match name.rsplit('.').next().unwrap_or_default() {
    "png" => "image/png",
    "webp" => "image/webp",
    "gif" => "image/gif",
    "heic" => "image/heic",
    _ => "image/jpeg",
  };
  Ok(
    HttpResponse::Ok()
      .content_type(content_type)
      .insert_header(CacheControl(vec![CacheDirective::Public, CacheDirective::MaxAge(86400)]))
      .body(bytes),
  )
}
