// server/src/web/handlers/inbox_handlers.rs

use actix_web::{web, HttpResponse};
use partsdesk::inbox::DEFAULT_INBOX_LIMIT;
use serde::Deserialize;
use serde_json::json;

use crate::errors::Result;
use crate::state::AppState;
use crate::web::auth::AdminUser;

const MAX_INBOX_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct InboxParams {
  #[serde(default)]
  pub unread: bool,
  pub limit: Option<usize>,
}

pub async fn list_messages_handler(
  app_state: web::Data<AppState>,
  params: web::Query<InboxParams>,
  _admin: AdminUser,
) -> Result<HttpResponse> {
  let limit = params.limit.unwrap_or(DEFAULT_INBOX_LIMIT).clamp(1, MAX_INBOX_LIMIT);
  Ok(HttpResponse::Ok().json(app_state.desk.inbox.list(params.unread, limit).await))
}

pub async fn mark_read_handler(
  app_state: web::Data<AppState>,
  sid: web::Path<String>,
  _admin: AdminUser,
) -> Result<HttpResponse> {
  app_state.desk.inbox.mark_read(&sid).await?;
  Ok(HttpResponse::Ok().json(json!({ "messageSid": sid.into_inner(), "read": true })))
}
