// server/src/state.rs
use crate::config::AppConfig;
use partsdesk::Desk;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub desk: Desk,
  pub config: Arc<AppConfig>,
  /// "postgres" or "memory", reported by the health check.
  pub store_name: &'static str,
}
