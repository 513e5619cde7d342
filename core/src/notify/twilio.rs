// core/src/notify/twilio.rs

//! Twilio Messages API over `reqwest`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::whatsapp::{MessageContent, OutboundMessage, ProviderFailure, ProviderReceipt, WhatsAppTransport};
use crate::error::{DeskError, DeskResult};

pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct TwilioConfig {
  pub account_sid: String,
  pub auth_token: String,
  /// Sender, with or without the `whatsapp:` prefix.
  pub from: String,
  pub api_base: String,
  pub timeout: Duration,
}

impl TwilioConfig {
  pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>, from: impl Into<String>) -> Self {
    Self {
      account_sid: account_sid.into(),
      auth_token: auth_token.into(),
      from: from.into(),
      api_base: DEFAULT_API_BASE.to_string(),
      timeout: Duration::from_secs(15),
    }
  }
}

#[derive(Debug, Deserialize)]
struct MessageResource {
  sid: String,
  status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResource {
  code: Option<i64>,
  message: Option<String>,
}

pub struct TwilioTransport {
  client: reqwest::Client,
  config: TwilioConfig,
  sender: String,
  messages_url: String,
}

impl TwilioTransport {
  pub fn new(config: TwilioConfig) -> DeskResult<Self> {
    if config.account_sid.trim().is_empty() || config.auth_token.trim().is_empty() {
      return Err(DeskError::NotConfigured("twilio credentials".to_string()));
    }
    if config.from.trim().is_empty() {
      return Err(DeskError::NotConfigured("twilio sender".to_string()));
    }
    let client = reqwest::Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| DeskError::Config(format!("http client: {e}")))?;
    let sender = if config.from.starts_with("whatsapp:") {
      config.from.clone()
    } else {
      format!("whatsapp:{}", config.from)
    };
    let messages_url = format!(
      "{}/2010-04-01/Accounts/{}/Messages.json",
      config.api_base.trim_end_matches('/'),
      config.account_sid
    );
    Ok(Self {
      client,
      config,
      sender,
      messages_url,
    })
  }

  fn form(&self, message: &OutboundMessage) -> Result<Vec<(&'static str, String)>, ProviderFailure> {
    let mut form = vec![("From", self.sender.clone()), ("To", message.to.clone())];
    match &message.content {
      MessageContent::Freeform(body) => form.push(("Body", body.clone())),
      MessageContent::Template { content_sid, variables } => {
        let variables =
          serde_json::to_string(variables).map_err(|e| ProviderFailure::new(format!("content variables: {e}")))?;
        form.push(("ContentSid", content_sid.clone()));
        form.push(("ContentVariables", variables));
      }
    }
    Ok(form)
  }
}

#[async_trait]
impl WhatsAppTransport for TwilioTransport {
  async fn send(&self, message: &OutboundMessage) -> Result<ProviderReceipt, ProviderFailure> {
    let form = self.form(message)?;
    let response = self
      .client
      .post(&self.messages_url)
      .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
      .form(&form)
      .send()
      .await
      .map_err(|e| ProviderFailure::new(format!("request failed: {e}")))?;

    let status = response.status();
    if status.is_success() {
      let resource: MessageResource = response
        .json()
        .await
        .map_err(|e| ProviderFailure::new(format!("unreadable provider response: {e}")))?;
      debug!(sid = %resource.sid, "Twilio accepted message.");
      return Ok(ProviderReceipt {
        sid: resource.sid,
        status: resource.status,
      });
    }

    let error = response.json::<ErrorResource>().await.ok();
    Err(ProviderFailure {
      code: error.as_ref().and_then(|e| e.code).map(|c| c.to_string()),
      message: error
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("provider returned HTTP {status}")),
    })
  }

  fn sender(&self) -> &str {
    &self.sender
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeMap;

  fn transport() -> TwilioTransport {
    TwilioTransport::new(TwilioConfig::new("AC123", "secret", "+966500000000")).unwrap()
  }

  #[test]
  fn sender_gets_whatsapp_prefix() {
    assert_eq!(transport().sender(), "whatsapp:+966500000000");
    assert_eq!(
      transport().messages_url,
      "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
    );
  }

  #[test]
  fn template_form_carries_content_fields() {
    let message = OutboundMessage {
      to: "whatsapp:+966551234567".into(),
      content: MessageContent::Template {
        content_sid: "HX9".into(),
        variables: BTreeMap::from([("1".to_string(), "ORD-100".to_string())]),
      },
    };
    let form = transport().form(&message).unwrap();
    assert!(form.contains(&("ContentSid", "HX9".to_string())));
    assert!(form.contains(&("ContentVariables", r#"{"1":"ORD-100"}"#.to_string())));
    assert!(!form.iter().any(|(k, _)| *k == "Body"));
  }

  #[test]
  fn missing_credentials_are_not_configured() {
    let err = TwilioTransport::new(TwilioConfig::new("", "", "+1")).err().unwrap();
    assert!(matches!(err, DeskError::NotConfigured(_)));
  }
}
