// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use partsdesk::{Desk, MemoryStore};
use partsdesk_server::config::AppConfig;
use partsdesk_server::db::PgStore;
use partsdesk_server::state::AppState;
use partsdesk_server::web::configure_app_routes;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
  if json {
    tracing_subscriber::fmt().json().with_env_filter(filter).init();
  } else {
    tracing_subscriber::fmt().with_env_filter(filter).init();
  }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
  tracing::error!(error = %err, "{}", context);
  std::io::Error::new(std::io::ErrorKind::Other, format!("{context}: {err}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing();
  tracing::info!("Starting parts desk server...");

  let app_config = Arc::new(AppConfig::from_env().map_err(|e| startup_error("Failed to load application configuration.", e))?);
  if app_config.admin_jwt_secret.is_none() {
    tracing::warn!("ADMIN_JWT_SECRET is not set; admin routes are open.");
  }

  let builder = Desk::builder(app_config.desk.clone());
  let (builder, store_name) = match &app_config.database_url {
    Some(url) => {
      let store = PgStore::connect(url)
        .await
        .map_err(|e| startup_error("Failed to connect to the database.", e))?;
      store
        .migrate()
        .await
        .map_err(|e| startup_error("Failed to prepare the database schema.", e))?;
      tracing::info!("Successfully connected to the database.");
      (builder.store(Arc::new(store)), "postgres")
    }
    None => {
      tracing::warn!("DATABASE_URL is not set; orders are kept in memory and lost on restart.");
      (builder.store(Arc::new(MemoryStore::new())), "memory")
    }
  };
  let desk = builder.build().map_err(|e| startup_error("Failed to assemble the order desk.", e))?;

  let app_state = AppState {
    desk,
    config: app_config.clone(),
    store_name,
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
