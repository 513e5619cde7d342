// core/src/lifecycle/outcome.rs

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::model::Order;
use crate::notify::NotifyReport;

/// Orders are addressed either by id or by their `ORD-..` number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKey {
  Id(Uuid),
  Number(String),
}

impl OrderKey {
  pub fn parse(raw: &str) -> Self {
    let raw = raw.trim();
    match Uuid::parse_str(raw) {
      Ok(id) => OrderKey::Id(id),
      Err(_) => OrderKey::Number(raw.to_string()),
    }
  }
}

impl fmt::Display for OrderKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OrderKey::Id(id) => write!(f, "{id}"),
      OrderKey::Number(n) => f.write_str(n),
    }
  }
}

/// Where a newly created order ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
  Database,
  /// Primary store refused; the snapshot is in the backup log.
  Backup,
  /// Both the store and the backup log failed.
  Unsaved,
}

#[derive(Debug, Clone)]
pub struct CreateOutcome {
  pub order: Order,
  pub persistence: Persistence,
  pub notify: NotifyReport,
}

/// Result of an admin mutation. A failed save after a successful load is
/// reported here rather than as an error.
#[derive(Debug, Clone)]
pub struct Mutation {
  pub order: Order,
  /// `false` when the order was already in the requested state.
  pub changed: bool,
  pub persisted: bool,
  pub storage_error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusOutcome {
  pub mutation: Mutation,
  pub notify: NotifyReport,
}
