// core/src/notify/mod.rs

//! Order-event notifications over independently configured channels.
//!
//! Every send produces a [`ChannelResult`]; nothing in this module returns an
//! error for a failed delivery. Callers collect the results into a
//! [`NotifyReport`] and hand it back to the client as data.

pub mod broadcast;
pub mod dispatcher;
pub mod email;
pub mod phone;
pub mod render;
pub mod twilio;
pub mod whatsapp;

use serde::{Deserialize, Serialize};

pub use broadcast::{BroadcastSettings, BroadcastSummary};
pub use dispatcher::{NotificationDispatcher, NotifyConfig, TemplateIds};
pub use email::{EmailMessage, MailTransport, SmtpConfig, SmtpMailer};
pub use phone::PhoneRule;
pub use twilio::{TwilioConfig, TwilioTransport};
pub use whatsapp::{MessageContent, OutboundMessage, ProviderFailure, ProviderReceipt, WhatsAppNotifier, WhatsAppTransport};

/// Reason codes reported when a channel did not deliver.
pub mod reason {
  pub const NOT_CONFIGURED: &str = "not_configured";
  pub const NO_RECIPIENT: &str = "no_recipient";
  pub const INVALID_RECIPIENT: &str = "invalid_recipient";
  pub const PROVIDER_ERROR: &str = "provider_error";
  pub const ALL_RECIPIENTS_FAILED: &str = "all_recipients_failed";
  pub const NOT_PERSISTED: &str = "not_persisted";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
  /// Admin/staff WhatsApp numbers (reported as `driverNotify`).
  WhatsappStaff,
  WhatsappCustomer,
  WhatsappDelivery,
  WhatsappBroadcast,
  Email,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResult {
  pub channel: Channel,
  pub ok: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub provider_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  /// Recipients attempted and reached; 1/1 or 1/0 for single-recipient sends.
  pub attempted: usize,
  pub delivered: usize,
}

impl ChannelResult {
  pub fn sent(channel: Channel, provider_id: impl Into<String>) -> Self {
    Self {
      channel,
      ok: true,
      reason: None,
      provider_id: Some(provider_id.into()),
      error: None,
      attempted: 1,
      delivered: 1,
    }
  }

  pub fn failed(channel: Channel, error: impl Into<String>) -> Self {
    Self {
      channel,
      ok: false,
      reason: Some(reason::PROVIDER_ERROR.to_string()),
      provider_id: None,
      error: Some(error.into()),
      attempted: 1,
      delivered: 0,
    }
  }

  /// Nothing was attempted (channel unconfigured, no recipient, ...).
  pub fn skipped(channel: Channel, reason: &str) -> Self {
    Self {
      channel,
      ok: false,
      reason: Some(reason.to_string()),
      provider_id: None,
      error: None,
      attempted: 0,
      delivered: 0,
    }
  }

  /// Folds per-recipient results: the channel succeeds if any recipient was reached.
  pub fn aggregate(channel: Channel, results: Vec<ChannelResult>) -> Self {
    if results.is_empty() {
      return Self::skipped(channel, reason::NO_RECIPIENT);
    }
    let attempted = results.iter().map(|r| r.attempted).sum();
    let delivered = results.iter().map(|r| r.delivered).sum();
    let provider_id = results.iter().find(|r| r.ok).and_then(|r| r.provider_id.clone());
    if delivered > 0 {
      return Self {
        channel,
        ok: true,
        reason: None,
        provider_id,
        error: None,
        attempted,
        delivered,
      };
    }
    let errors: Vec<String> = results
      .iter()
      .filter_map(|r| r.error.clone().or_else(|| r.reason.clone()))
      .collect();
    Self {
      channel,
      ok: false,
      reason: Some(reason::ALL_RECIPIENTS_FAILED.to_string()),
      provider_id: None,
      error: Some(errors.join(" | ")),
      attempted,
      delivered,
    }
  }
}

/// Per-channel outcome of one order event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotifyReport {
  pub results: Vec<ChannelResult>,
}

impl NotifyReport {
  pub fn push(&mut self, result: ChannelResult) {
    self.results.push(result);
  }

  pub fn get(&self, channel: Channel) -> Option<&ChannelResult> {
    self.results.iter().find(|r| r.channel == channel)
  }

  pub fn any_ok(&self) -> bool {
    self.results.iter().any(|r| r.ok)
  }

  /// Report used when the triggering change itself was not saved.
  pub fn suppressed(reason: &str) -> Self {
    Self {
      results: vec![
        ChannelResult::skipped(Channel::WhatsappStaff, reason),
        ChannelResult::skipped(Channel::WhatsappCustomer, reason),
        ChannelResult::skipped(Channel::Email, reason),
      ],
    }
  }
}
