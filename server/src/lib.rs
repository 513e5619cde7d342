// server/src/lib.rs

//! HTTP surface of the parts desk: environment configuration, the
//! PostgreSQL store, and the actix-web routes over [`partsdesk::Desk`].

pub mod config;
pub mod db;
pub mod errors;
pub mod state;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;
