// core/src/notify/whatsapp.rs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::phone::{mask, whatsapp_address, PhoneRule};
use super::{reason, Channel, ChannelResult};
use crate::model::{Direction, Message};
use crate::store::MessageStore;

/// Either free text (only deliverable inside the recipient's 24-hour session
/// window) or a pre-approved template with positional variables.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
  Freeform(String),
  Template {
    content_sid: String,
    variables: BTreeMap<String, String>,
  },
}

impl MessageContent {
  /// Uses the template when one is configured, the text otherwise.
  pub fn template_or_text(
    template: Option<&str>,
    variables: impl FnOnce() -> BTreeMap<String, String>,
    text: impl FnOnce() -> String,
  ) -> Self {
    match template.filter(|sid| !sid.trim().is_empty()) {
      Some(sid) => MessageContent::Template {
        content_sid: sid.to_string(),
        variables: variables(),
      },
      None => MessageContent::Freeform(text()),
    }
  }

  /// Text stored in the audit log.
  pub fn audit_body(&self) -> String {
    match self {
      MessageContent::Freeform(body) => body.clone(),
      MessageContent::Template { content_sid, variables } => {
        let vars = serde_json::to_string(variables).unwrap_or_default();
        format!("[template {content_sid}] {vars}")
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
  /// `whatsapp:+<digits>`
  pub to: String,
  pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReceipt {
  pub sid: String,
  pub status: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ProviderFailure {
  pub code: Option<String>,
  pub message: String,
}

impl ProviderFailure {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      code: None,
      message: message.into(),
    }
  }
}

/// Delivery of a single WhatsApp message through a provider.
#[async_trait]
pub trait WhatsAppTransport: Send + Sync {
  async fn send(&self, message: &OutboundMessage) -> Result<ProviderReceipt, ProviderFailure>;

  /// Sender address recorded on outbound audit rows.
  fn sender(&self) -> &str;
}

/// Sends WhatsApp messages and records every attempt in the message log.
#[derive(Clone)]
pub struct WhatsAppNotifier {
  transport: Arc<dyn WhatsAppTransport>,
  messages: Arc<dyn MessageStore>,
  phone_rule: PhoneRule,
}

impl WhatsAppNotifier {
  pub fn new(transport: Arc<dyn WhatsAppTransport>, messages: Arc<dyn MessageStore>, phone_rule: PhoneRule) -> Self {
    Self {
      transport,
      messages,
      phone_rule,
    }
  }

  pub fn phone_rule(&self) -> &PhoneRule {
    &self.phone_rule
  }

  #[instrument(name = "WhatsAppNotifier::send", skip(self, recipient, content), fields(channel = ?channel, to = %mask(recipient)))]
  pub async fn send(&self, channel: Channel, recipient: &str, content: MessageContent) -> ChannelResult {
    let Some(digits) = self.phone_rule.normalize(recipient) else {
      warn!("Recipient is not a usable phone number.");
      return ChannelResult::skipped(channel, reason::INVALID_RECIPIENT);
    };
    let outbound = OutboundMessage {
      to: whatsapp_address(&digits),
      content,
    };

    match self.transport.send(&outbound).await {
      Ok(receipt) => {
        info!(sid = %receipt.sid, status = %receipt.status, "WhatsApp message accepted by provider.");
        self.record(&outbound, &receipt.sid, &receipt.status, None).await;
        ChannelResult::sent(channel, receipt.sid)
      }
      Err(failure) => {
        warn!(code = ?failure.code, error = %failure.message, "WhatsApp send failed.");
        let sid = format!("failed-{}", Uuid::new_v4());
        self.record(&outbound, &sid, "failed", failure.code.as_deref()).await;
        ChannelResult::failed(channel, format!("{}: {}", mask(&digits), failure.message))
      }
    }
  }

  /// Sends to each recipient in turn. The channel counts as delivered when at
  /// least one recipient was reached.
  pub async fn send_to_all(&self, channel: Channel, recipients: &[String], content: MessageContent) -> ChannelResult {
    if recipients.is_empty() {
      return ChannelResult::skipped(channel, reason::NOT_CONFIGURED);
    }
    let mut results = Vec::with_capacity(recipients.len());
    for recipient in recipients {
      results.push(self.send(channel, recipient, content.clone()).await);
    }
    let merged = ChannelResult::aggregate(channel, results);
    if !merged.ok {
      warn!(?channel, attempted = merged.attempted, "No recipient could be reached.");
    }
    merged
  }

  // Audit failures must not turn a delivered message into a failed one.
  async fn record(&self, outbound: &OutboundMessage, sid: &str, status: &str, error_code: Option<&str>) {
    let entry = Message {
      message_sid: sid.to_string(),
      from: self.transport.sender().to_string(),
      to: outbound.to.clone(),
      direction: Direction::Outbound,
      body: outbound.content.audit_body(),
      status: status.to_string(),
      error_code: error_code.map(str::to_string),
      timestamp: Utc::now(),
      read: true,
    };
    if let Err(e) = self.messages.insert_message(&entry).await {
      warn!(sid, error = %e, "Could not record outbound message.");
    }
  }
}
