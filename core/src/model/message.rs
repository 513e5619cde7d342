// core/src/model/message.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Inbound,
  Outbound,
}

impl Direction {
  pub fn as_str(&self) -> &'static str {
    match self {
      Direction::Inbound => "inbound",
      Direction::Outbound => "outbound",
    }
  }
}

/// Audit record of one WhatsApp message, in either direction.
///
/// Records are append-only; delivery-status callbacks only rewrite
/// `status` and `error_code`, keyed by `message_sid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
  pub message_sid: String,
  pub from: String,
  pub to: String,
  pub direction: Direction,
  pub body: String,
  pub status: String,
  pub error_code: Option<String>,
  pub timestamp: DateTime<Utc>,
  pub read: bool,
}
