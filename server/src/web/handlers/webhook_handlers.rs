// server/src/web/handlers/webhook_handlers.rs

//! Provider callbacks. They are acknowledged with 200 whenever the payload
//! was understood, so the provider does not retry.

use actix_web::{web, HttpResponse};
use partsdesk::inbox::{InboundCallback, StatusCallback};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::state::AppState;

const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

#[instrument(name = "handler::whatsapp_status", skip_all, fields(sid = %form.message_sid, status = %form.message_status))]
pub async fn whatsapp_status_handler(
  app_state: web::Data<AppState>,
  form: web::Form<StatusCallback>,
) -> Result<HttpResponse> {
  let updated = app_state.desk.inbox.apply_status(&form).await?;
  Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}

#[instrument(name = "handler::whatsapp_inbound", skip_all, fields(sid = %form.message_sid))]
pub async fn whatsapp_inbound_handler(
  app_state: web::Data<AppState>,
  form: web::Form<InboundCallback>,
) -> Result<HttpResponse> {
  app_state.desk.inbox.record_inbound(&form).await?;
  info!("Inbound message acknowledged.");
  Ok(HttpResponse::Ok().content_type("text/xml").body(EMPTY_TWIML))
}
