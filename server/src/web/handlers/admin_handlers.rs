// server/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use partsdesk::requests::{BroadcastRequest, HandoffRequest, PricingRequest};
use partsdesk::OrderKey;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::mutation_body;
use crate::errors::Result;
use crate::state::AppState;
use crate::web::auth::AdminUser;

pub async fn list_active_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse> {
  Ok(HttpResponse::Ok().json(app_state.desk.orders.list_active().await))
}

pub async fn list_archived_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse> {
  Ok(HttpResponse::Ok().json(app_state.desk.orders.list_archived().await))
}

pub async fn list_completed_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse> {
  Ok(HttpResponse::Ok().json(app_state.desk.orders.list_completed().await))
}

#[instrument(name = "handler::update_pricing", skip(app_state, body, admin), fields(order = %key, admin = %admin.subject))]
pub async fn update_pricing_handler(
  app_state: web::Data<AppState>,
  key: web::Path<String>,
  body: web::Json<PricingRequest>,
  admin: AdminUser,
) -> Result<HttpResponse> {
  let mutation = app_state
    .desk
    .orders
    .update_pricing(&OrderKey::parse(&key), &body)
    .await?;
  Ok(HttpResponse::Ok().json(Value::Object(mutation_body(&mutation))))
}

#[instrument(name = "handler::archive_order", skip(app_state, admin), fields(order = %key, admin = %admin.subject))]
pub async fn archive_order_handler(
  app_state: web::Data<AppState>,
  key: web::Path<String>,
  admin: AdminUser,
) -> Result<HttpResponse> {
  let mutation = app_state.desk.orders.archive(&OrderKey::parse(&key)).await?;
  Ok(HttpResponse::Ok().json(Value::Object(mutation_body(&mutation))))
}

#[instrument(name = "handler::restore_order", skip(app_state, admin), fields(order = %key, admin = %admin.subject))]
pub async fn restore_order_handler(
  app_state: web::Data<AppState>,
  key: web::Path<String>,
  admin: AdminUser,
) -> Result<HttpResponse> {
  let mutation = app_state.desk.orders.restore(&OrderKey::parse(&key)).await?;
  Ok(HttpResponse::Ok().json(Value::Object(mutation_body(&mutation))))
}

#[instrument(name = "handler::purge_order", skip(app_state, admin), fields(order = %key, admin = %admin.subject))]
pub async fn purge_order_handler(
  app_state: web::Data<AppState>,
  key: web::Path<String>,
  admin: AdminUser,
) -> Result<HttpResponse> {
  let order = app_state.desk.orders.purge(&OrderKey::parse(&key)).await?;
  info!(order_number = %order.order_number, "Order purged by admin.");
  Ok(HttpResponse::Ok().json(json!({ "deleted": order.order_number })))
}

#[instrument(name = "handler::send_to_delivery", skip_all, fields(admin = %admin.subject))]
pub async fn send_to_delivery_handler(
  app_state: web::Data<AppState>,
  body: web::Json<HandoffRequest>,
  admin: AdminUser,
) -> Result<HttpResponse> {
  let outcome = app_state.desk.handoff.send(&body).await?;
  Ok(HttpResponse::Ok().json(outcome))
}

#[instrument(name = "handler::broadcast", skip_all, fields(admin = %admin.subject, recipients = body.recipients.len()))]
pub async fn broadcast_handler(
  app_state: web::Data<AppState>,
  body: web::Json<BroadcastRequest>,
  admin: AdminUser,
) -> Result<HttpResponse> {
  let summary = app_state.desk.broadcast(&body).await?;
  Ok(HttpResponse::Ok().json(summary))
}
