// core/src/inbox.rs

//! Admin inbox over the message audit log, fed by provider webhooks.

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{DeskError, DeskResult};
use crate::model::{Direction, Message};
use crate::notify::phone::mask;
use crate::store::MessageStore;
use crate::validation::ValidationError;

pub const DEFAULT_INBOX_LIMIT: usize = 100;

/// Delivery-status callback, as posted (form-encoded) by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusCallback {
  #[serde(rename = "MessageSid", default)]
  pub message_sid: String,
  #[serde(rename = "MessageStatus", default)]
  pub message_status: String,
  #[serde(rename = "ErrorCode", default)]
  pub error_code: Option<String>,
}

/// Inbound message callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundCallback {
  #[serde(rename = "MessageSid", default)]
  pub message_sid: String,
  #[serde(rename = "From", default)]
  pub from: String,
  #[serde(rename = "To", default)]
  pub to: String,
  #[serde(rename = "Body", default)]
  pub body: String,
}

#[derive(Clone)]
pub struct Inbox {
  messages: Arc<dyn MessageStore>,
}

impl Inbox {
  pub fn new(messages: Arc<dyn MessageStore>) -> Self {
    Self { messages }
  }

  /// Stores an inbound message as unread.
  #[instrument(name = "Inbox::record_inbound", skip_all, fields(sid = %callback.message_sid), err(Display))]
  pub async fn record_inbound(&self, callback: &InboundCallback) -> DeskResult<Message> {
    if callback.message_sid.trim().is_empty() {
      return Err(ValidationError::single("MessageSid", "is required").into());
    }
    let message = Message {
      message_sid: callback.message_sid.trim().to_string(),
      from: callback.from.clone(),
      to: callback.to.clone(),
      direction: Direction::Inbound,
      body: callback.body.clone(),
      status: "received".to_string(),
      error_code: None,
      timestamp: Utc::now(),
      read: false,
    };
    self.messages.insert_message(&message).await?;
    info!(from = %mask(&message.from), "Inbound WhatsApp message stored.");
    Ok(message)
  }

  /// Applies a delivery-status update. Returns `false` for an unknown SID.
  #[instrument(name = "Inbox::apply_status", skip_all, fields(sid = %callback.message_sid, status = %callback.message_status), err(Display))]
  pub async fn apply_status(&self, callback: &StatusCallback) -> DeskResult<bool> {
    if callback.message_sid.trim().is_empty() || callback.message_status.trim().is_empty() {
      return Err(ValidationError::single("MessageSid", "and MessageStatus are required").into());
    }
    let error_code = callback.error_code.as_deref().filter(|c| !c.trim().is_empty());
    let updated = self
      .messages
      .update_delivery_status(callback.message_sid.trim(), callback.message_status.trim(), error_code)
      .await?;
    if !updated {
      warn!("Status callback for an unknown message.");
    }
    Ok(updated)
  }

  /// Newest first; an unavailable store yields an empty inbox.
  pub async fn list(&self, unread_only: bool, limit: usize) -> Vec<Message> {
    match self.messages.list_messages(unread_only, limit).await {
      Ok(messages) => messages,
      Err(e) => {
        warn!(error = %e, "Message listing failed, returning an empty inbox.");
        Vec::new()
      }
    }
  }

  pub async fn mark_read(&self, message_sid: &str) -> DeskResult<()> {
    if self.messages.mark_read(message_sid).await? {
      Ok(())
    } else {
      Err(DeskError::NotFound {
        entity: "message",
        key: message_sid.to_string(),
      })
    }
  }
}
