// server/src/web/routes.rs

use actix_web::web;

use crate::errors::AppError;
use crate::web::handlers::{admin_handlers, inbox_handlers, order_handlers, system_handlers, webhook_handlers};

// This function will be called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::JsonConfig::default().error_handler(|err, _req| AppError::BadRequest(format!("Invalid JSON body: {err}")).into()),
    )
    .app_data(
      web::FormConfig::default().error_handler(|err, _req| AppError::BadRequest(format!("Invalid form body: {err}")).into()),
    )
    .route("/api/health", web::get().to(system_handlers::health_check_handler))
    .route("/uploads/{file}", web::get().to(system_handlers::upload_file_handler))
    // Orders. The admin scope is registered before `/{orderNumber}` so it is never shadowed.
    .service(
      web::scope("/orders")
        .service(
          web::scope("/admin")
            .route("", web::get().to(admin_handlers::list_active_handler))
            .route("/archived", web::get().to(admin_handlers::list_archived_handler))
            .route("/completed", web::get().to(admin_handlers::list_completed_handler))
            .route("/send-to-delivery", web::post().to(admin_handlers::send_to_delivery_handler))
            .route("/{id}/status", web::put().to(order_handlers::update_status_handler))
            .route("/{id}/pricing", web::put().to(admin_handlers::update_pricing_handler))
            .route("/{id}/archive", web::put().to(admin_handlers::archive_order_handler))
            .route("/{id}/restore", web::put().to(admin_handlers::restore_order_handler))
            .route("/{id}", web::delete().to(admin_handlers::purge_order_handler)),
        )
        .route("", web::post().to(order_handlers::create_parts_order_handler))
        .route("", web::get().to(order_handlers::list_orders_handler))
        .route("/sell-car", web::post().to(order_handlers::create_sell_car_order_handler))
        .route("/track/{phone}", web::get().to(order_handlers::track_orders_handler))
        .route("/{orderNumber}", web::get().to(order_handlers::get_order_handler))
        .route("/{orderNumber}/status", web::put().to(order_handlers::update_status_handler))
        .route("/{orderNumber}", web::delete().to(order_handlers::cancel_order_handler)),
    )
    // Admin inbox and bulk messaging
    .service(
      web::scope("/admin")
        .route("/messages", web::get().to(inbox_handlers::list_messages_handler))
        .route("/messages/{sid}/read", web::put().to(inbox_handlers::mark_read_handler))
        .route("/whatsapp/broadcast", web::post().to(admin_handlers::broadcast_handler)),
    )
    // Provider callbacks
    .service(
      web::scope("/webhooks/whatsapp")
        .route("/status", web::post().to(webhook_handlers::whatsapp_status_handler))
        .route("/inbound", web::post().to(webhook_handlers::whatsapp_inbound_handler)),
    );
}
