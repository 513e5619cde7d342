// core/src/notify/dispatcher.rs

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::broadcast::{self, BroadcastSettings, BroadcastSummary};
use super::email::{EmailMessage, MailTransport};
use super::render::{template_variables, Renderer};
use super::whatsapp::{MessageContent, WhatsAppNotifier};
use super::{reason, Channel, ChannelResult, NotifyReport};
use crate::error::{DeskError, DeskResult};
use crate::model::{Order, OrderStatus};
use crate::validation::ValidationError;

/// Template (content) SIDs; `None` means freeform text is sent instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateIds {
  pub order_created: Option<String>,
  pub status_updated: Option<String>,
  pub broadcast: Option<String>,
}

/// Recipients and rendering settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyConfig {
  pub admin_numbers: Vec<String>,
  pub delivery_number: Option<String>,
  pub admin_emails: Vec<String>,
  pub templates: TemplateIds,
  pub public_base_url: String,
  pub currency: String,
  pub broadcast: BroadcastSettings,
}

impl Default for NotifyConfig {
  fn default() -> Self {
    Self {
      admin_numbers: Vec::new(),
      delivery_number: None,
      admin_emails: Vec::new(),
      templates: TemplateIds::default(),
      public_base_url: "http://localhost:10000".to_string(),
      currency: "SAR".to_string(),
      broadcast: BroadcastSettings::default(),
    }
  }
}

/// Fans order events out to the configured channels.
///
/// Channels are independent: an unconfigured or failing channel is reported
/// in the returned [`NotifyReport`] and never affects the others.
#[derive(Clone)]
pub struct NotificationDispatcher {
  whatsapp: Option<WhatsAppNotifier>,
  mailer: Option<Arc<dyn MailTransport>>,
  config: NotifyConfig,
  renderer: Renderer,
}

impl NotificationDispatcher {
  pub fn new(whatsapp: Option<WhatsAppNotifier>, mailer: Option<Arc<dyn MailTransport>>, config: NotifyConfig) -> Self {
    let renderer = Renderer::new(config.public_base_url.clone(), config.currency.clone());
    Self {
      whatsapp,
      mailer,
      config,
      renderer,
    }
  }

  /// Dispatcher with every channel disabled.
  pub fn disabled() -> Self {
    Self::new(None, None, NotifyConfig::default())
  }

  pub fn config(&self) -> &NotifyConfig {
    &self.config
  }

  pub fn renderer(&self) -> &Renderer {
    &self.renderer
  }

  pub fn whatsapp_enabled(&self) -> bool {
    self.whatsapp.is_some()
  }

  pub fn email_enabled(&self) -> bool {
    self.mailer.is_some()
  }

  /// Parts and sell-car orders alike.
  #[instrument(name = "NotificationDispatcher::order_created", skip_all, fields(order_number = %order.order_number))]
  pub async fn order_created(&self, order: &Order) -> NotifyReport {
    let template = self.config.templates.order_created.as_deref();
    let staff = MessageContent::template_or_text(
      template,
      || template_variables(order, order.status),
      || self.renderer.staff_order_created(order),
    );
    let customer = MessageContent::template_or_text(
      template,
      || template_variables(order, order.status),
      || self.renderer.customer_order_created(order),
    );

    let (staff, customer, email) = futures::join!(
      self.to_staff(staff),
      self.to_customer(order, customer),
      self.to_admin_email(|to| self.renderer.email_order_created(order, to)),
    );
    self.report(vec![staff, customer, email])
  }

  #[instrument(name = "NotificationDispatcher::status_changed", skip_all, fields(order_number = %order.order_number, %status))]
  pub async fn status_changed(&self, order: &Order, status: OrderStatus) -> NotifyReport {
    let content = MessageContent::template_or_text(
      self.config.templates.status_updated.as_deref(),
      || template_variables(order, status),
      || self.renderer.status_changed(order, status),
    );

    let (staff, customer, email) = futures::join!(
      self.to_staff(content.clone()),
      self.to_customer(order, content.clone()),
      self.to_admin_email(|to| self.renderer.email_status_changed(order, status, to)),
    );
    self.report(vec![staff, customer, email])
  }

  /// One message to one explicit recipient.
  pub async fn send_direct(&self, channel: Channel, recipient: &str, content: MessageContent) -> ChannelResult {
    match &self.whatsapp {
      None => ChannelResult::skipped(channel, reason::NOT_CONFIGURED),
      Some(_) if recipient.trim().is_empty() => ChannelResult::skipped(channel, reason::NO_RECIPIENT),
      Some(wa) => wa.send(channel, recipient, content).await,
    }
  }

  /// Bulk send to opted-in recipients. A template named by the caller wins
  /// over the configured broadcast template; freeform `body` is the last resort.
  pub async fn broadcast(
    &self,
    recipients: &[String],
    template_sid: Option<&str>,
    variables: BTreeMap<String, String>,
    body: Option<String>,
  ) -> DeskResult<BroadcastSummary> {
    let wa = self
      .whatsapp
      .as_ref()
      .ok_or_else(|| DeskError::NotConfigured("whatsapp".to_string()))?;
    let template = template_sid
      .filter(|sid| !sid.trim().is_empty())
      .or(self.config.templates.broadcast.as_deref());
    let content = match (template, body) {
      (Some(sid), _) => MessageContent::Template {
        content_sid: sid.to_string(),
        variables,
      },
      (None, Some(body)) if !body.trim().is_empty() => MessageContent::Freeform(body),
      _ => {
        return Err(ValidationError::single("templateSid", "a template or a message body is required").into());
      }
    };
    Ok(broadcast::run(wa, recipients, &content, &self.config.broadcast).await)
  }

  async fn to_staff(&self, content: MessageContent) -> ChannelResult {
    match &self.whatsapp {
      None => ChannelResult::skipped(Channel::WhatsappStaff, reason::NOT_CONFIGURED),
      Some(wa) => {
        wa.send_to_all(Channel::WhatsappStaff, &self.config.admin_numbers, content)
          .await
      }
    }
  }

  async fn to_customer(&self, order: &Order, content: MessageContent) -> ChannelResult {
    self
      .send_direct(Channel::WhatsappCustomer, &order.customer_phone, content)
      .await
  }

  async fn to_admin_email(&self, build: impl FnOnce(Vec<String>) -> EmailMessage) -> ChannelResult {
    let Some(mailer) = &self.mailer else {
      return ChannelResult::skipped(Channel::Email, reason::NOT_CONFIGURED);
    };
    if self.config.admin_emails.is_empty() {
      return ChannelResult::skipped(Channel::Email, reason::NO_RECIPIENT);
    }
    let message = build(self.config.admin_emails.clone());
    match mailer.send(&message).await {
      Ok(ack) => ChannelResult::sent(Channel::Email, ack),
      Err(e) => {
        warn!(error = %e, "Admin email failed.");
        ChannelResult::failed(Channel::Email, e.to_string())
      }
    }
  }

  fn report(&self, results: Vec<ChannelResult>) -> NotifyReport {
    let report = NotifyReport { results };
    info!(
      delivered = report.results.iter().filter(|r| r.ok).count(),
      channels = report.results.len(),
      "Notifications dispatched."
    );
    report
  }
}
