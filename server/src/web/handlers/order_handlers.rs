// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use partsdesk::requests::{PartsOrderRequest, SellCarRequest, StatusUpdateRequest};
use partsdesk::{CreateOutcome, OrderKey, OrderStatus};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument};

use super::{mutation_body, notify_fields};
use crate::errors::{AppError, Result};
use crate::state::AppState;
use crate::web::auth::AdminUser;
use crate::web::upload::read_submission;

pub const MAX_PARTS_IMAGES: usize = 1;
pub const MAX_SELL_CAR_IMAGES: usize = 10;

fn created(outcome: CreateOutcome) -> HttpResponse {
  let mut body = Map::new();
  body.insert("order".to_string(), json!(outcome.order));
  body.insert("persistence".to_string(), json!(outcome.persistence));
  notify_fields(&outcome.notify, &mut body);
  HttpResponse::Created().json(Value::Object(body))
}

#[instrument(name = "handler::create_parts_order", skip_all)]
pub async fn create_parts_order_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  payload: web::Payload,
) -> Result<HttpResponse> {
  let (request, images) =
    read_submission::<PartsOrderRequest>(&req, payload, &app_state.config.upload_dir, MAX_PARTS_IMAGES).await?;
  let outcome = app_state.desk.orders.create_order(&request, images).await?;
  info!(order_number = %outcome.order.order_number, persistence = ?outcome.persistence, "Parts order accepted.");
  Ok(created(outcome))
}

#[instrument(name = "handler::create_sell_car_order", skip_all)]
pub async fn create_sell_car_order_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  payload: web::Payload,
) -> Result<HttpResponse> {
  let (request, images) =
    read_submission::<SellCarRequest>(&req, payload, &app_state.config.upload_dir, MAX_SELL_CAR_IMAGES).await?;
  let outcome = app_state.desk.orders.create_sell_car_order(&request, images).await?;
  info!(order_number = %outcome.order.order_number, persistence = ?outcome.persistence, "Sell-car order accepted.");
  Ok(created(outcome))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<String>,
  pub phone: Option<String>,
}

pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  params: web::Query<ListParams>,
) -> Result<HttpResponse> {
  let ListParams { status, phone } = params.into_inner();
  let status = match status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
    None => None,
    Some(raw) => Some(
      OrderStatus::parse(&raw.to_lowercase()).ok_or_else(|| AppError::validation("status", "is not a known status"))?,
    ),
  };
  let phone = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
  Ok(HttpResponse::Ok().json(app_state.desk.orders.list(status, phone).await))
}

pub async fn track_orders_handler(app_state: web::Data<AppState>, phone: web::Path<String>) -> Result<HttpResponse> {
  Ok(HttpResponse::Ok().json(app_state.desk.orders.track(&phone).await))
}

pub async fn get_order_handler(app_state: web::Data<AppState>, order_number: web::Path<String>) -> Result<HttpResponse> {
  let order = app_state.desk.orders.get(&OrderKey::parse(&order_number)).await?;
  Ok(HttpResponse::Ok().json(order))
}

/// Status change addressed by id or order number; shared by both route shapes.
#[instrument(name = "handler::update_status", skip(app_state, body, _admin), fields(order = %key))]
pub async fn update_status_handler(
  app_state: web::Data<AppState>,
  key: web::Path<String>,
  body: web::Json<StatusUpdateRequest>,
  _admin: AdminUser,
) -> Result<HttpResponse> {
  let outcome = app_state
    .desk
    .orders
    .update_status(&OrderKey::parse(&key), &body)
    .await?;
  let mut response = mutation_body(&outcome.mutation);
  notify_fields(&outcome.notify, &mut response);
  Ok(HttpResponse::Ok().json(Value::Object(response)))
}

/// Customer-side cancellation by order number.
#[instrument(name = "handler::cancel_order", skip(app_state), fields(order = %order_number))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  order_number: web::Path<String>,
) -> Result<HttpResponse> {
  let mutation = app_state.desk.orders.cancel(&OrderKey::parse(&order_number)).await?;
  Ok(HttpResponse::Ok().json(Value::Object(mutation_body(&mutation))))
}
