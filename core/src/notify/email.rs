// core/src/notify/email.rs

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::info;

use crate::error::{DeskError, DeskResult};

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
  pub to: Vec<String>,
  pub subject: String,
  pub html: String,
  pub text: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
  /// Sends one message, returning the server's acknowledgement.
  async fn send(&self, message: &EmailMessage) -> DeskResult<String>;
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
  pub host: String,
  pub port: u16,
  pub username: String,
  pub password: String,
  pub from_name: String,
}

pub struct SmtpMailer {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  from: Mailbox,
}

impl SmtpMailer {
  /// Port 465 uses implicit TLS, any other port STARTTLS.
  pub fn new(config: &SmtpConfig) -> DeskResult<Self> {
    if config.username.trim().is_empty() || config.password.is_empty() {
      return Err(DeskError::NotConfigured("smtp credentials".to_string()));
    }
    let builder = if config.port == 465 {
      AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
    } else {
      AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
    }
    .map_err(|e| DeskError::Config(format!("smtp relay {}: {e}", config.host)))?;

    let transport = builder
      .port(config.port)
      .credentials(Credentials::new(config.username.clone(), config.password.clone()))
      .build();

    let from = format!("{} <{}>", config.from_name, config.username)
      .parse::<Mailbox>()
      .map_err(|e| DeskError::Config(format!("invalid sender address: {e}")))?;

    Ok(Self { transport, from })
  }
}

#[async_trait]
impl MailTransport for SmtpMailer {
  async fn send(&self, message: &EmailMessage) -> DeskResult<String> {
    let notify_err = |message: String| DeskError::Notification {
      channel: "email".to_string(),
      message,
    };

    let mut builder = lettre::Message::builder().from(self.from.clone()).subject(&message.subject);
    for to in &message.to {
      let mailbox = to
        .parse::<Mailbox>()
        .map_err(|e| notify_err(format!("invalid recipient {to}: {e}")))?;
      builder = builder.to(mailbox);
    }
    let email = builder
      .multipart(
        MultiPart::alternative()
          .singlepart(
            SinglePart::builder()
              .header(ContentType::TEXT_PLAIN)
              .body(message.text.clone()),
          )
          .singlepart(
            SinglePart::builder()
              .header(ContentType::TEXT_HTML)
              .body(message.html.clone()),
          ),
      )
      .map_err(|e| notify_err(format!("failed to build email: {e}")))?;

    let response = self
      .transport
      .send(email)
      .await
      .map_err(|e| notify_err(format!("smtp send failed: {e}")))?;
    let ack = response.message().collect::<Vec<_>>().join(" ");
    info!(recipients = message.to.len(), "Email accepted by SMTP server.");
    Ok(ack)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config() -> SmtpConfig {
    SmtpConfig {
      host: "smtp.example.com".into(),
      port: 587,
      username: "desk@example.com".into(),
      password: "pw".into(),
      from_name: "Parts Desk".into(),
    }
  }

  // The pooled transport spawns onto the runtime when built.
  #[tokio::test]
  async fn builds_with_credentials() {
    assert!(SmtpMailer::new(&config()).is_ok());
  }

  #[tokio::test]
  async fn missing_credentials_are_reported() {
    let mut cfg = config();
    cfg.password.clear();
    assert!(matches!(SmtpMailer::new(&cfg), Err(DeskError::NotConfigured(_))));
  }
}
