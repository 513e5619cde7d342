// core/src/desk.rs

//! Wiring of stores, transports and services into one [`Desk`].

use std::sync::Arc;
use tracing::{info, warn};

use crate::backup::BackupLog;
use crate::config::DeskConfig;
use crate::error::DeskResult;
use crate::handoff::DeliveryHandoff;
use crate::inbox::Inbox;
use crate::lifecycle::OrderManager;
use crate::notify::{
  BroadcastSummary, MailTransport, NotificationDispatcher, SmtpMailer, TwilioTransport, WhatsAppNotifier,
  WhatsAppTransport,
};
use crate::requests::BroadcastRequest;
use crate::store::{MemoryStore, MessageStore, OrderStore};

#[derive(Clone)]
pub struct Desk {
  pub orders: OrderManager,
  pub handoff: DeliveryHandoff,
  pub inbox: Inbox,
  pub dispatcher: NotificationDispatcher,
  backup: Arc<BackupLog>,
}

impl Desk {
  pub fn builder(config: DeskConfig) -> DeskBuilder {
    DeskBuilder::new(config)
  }

  pub fn backup(&self) -> &BackupLog {
    &self.backup
  }

  /// Validates and runs a bulk WhatsApp send.
  pub async fn broadcast(&self, request: &BroadcastRequest) -> DeskResult<BroadcastSummary> {
    request.validate()?;
    let recipients: Vec<String> = request
      .recipients
      .iter()
      .map(|r| r.trim().to_string())
      .filter(|r| !r.is_empty())
      .collect();
    self
      .dispatcher
      .broadcast(
        &recipients,
        request.template_sid.as_deref(),
        request.variables.clone(),
        request.body.clone(),
      )
      .await
  }
}

pub struct DeskBuilder {
  config: DeskConfig,
  orders: Option<Arc<dyn OrderStore>>,
  messages: Option<Arc<dyn MessageStore>>,
  whatsapp: Option<Arc<dyn WhatsAppTransport>>,
  mailer: Option<Arc<dyn MailTransport>>,
}

impl DeskBuilder {
  pub fn new(config: DeskConfig) -> Self {
    Self {
      config,
      orders: None,
      messages: None,
      whatsapp: None,
      mailer: None,
    }
  }

  /// Uses one backend for both orders and messages.
  pub fn store<S>(mut self, store: Arc<S>) -> Self
  where
    S: OrderStore + MessageStore + 'static,
  {
    self.orders = Some(store.clone());
    self.messages = Some(store);
    self
  }

  pub fn order_store(mut self, store: Arc<dyn OrderStore>) -> Self {
    self.orders = Some(store);
    self
  }

  pub fn message_store(mut self, store: Arc<dyn MessageStore>) -> Self {
    self.messages = Some(store);
    self
  }

  /// Overrides the transport otherwise built from the Twilio settings.
  pub fn whatsapp_transport(mut self, transport: Arc<dyn WhatsAppTransport>) -> Self {
    self.whatsapp = Some(transport);
    self
  }

  /// Overrides the mailer otherwise built from the SMTP settings.
  pub fn mailer(mut self, mailer: Arc<dyn MailTransport>) -> Self {
    self.mailer = Some(mailer);
    self
  }

  pub fn build(self) -> DeskResult<Desk> {
    let DeskBuilder {
      config,
      orders,
      messages,
      whatsapp,
      mailer,
    } = self;

    let (orders, messages) = match (orders, messages) {
      (Some(orders), Some(messages)) => (orders, messages),
      (orders, messages) => {
        let memory = Arc::new(MemoryStore::new());
        (
          orders.unwrap_or_else(|| memory.clone() as Arc<dyn OrderStore>),
          messages.unwrap_or_else(|| memory as Arc<dyn MessageStore>),
        )
      }
    };

    let whatsapp = match (whatsapp, &config.twilio) {
      (Some(transport), _) => Some(transport),
      (None, Some(twilio)) => Some(Arc::new(TwilioTransport::new(twilio.clone())?) as Arc<dyn WhatsAppTransport>),
      (None, None) => {
        warn!("WhatsApp is not configured; WhatsApp channels will report not_configured.");
        None
      }
    };
    let mailer = match (mailer, &config.smtp) {
      (Some(mailer), _) => Some(mailer),
      (None, Some(smtp)) => Some(Arc::new(SmtpMailer::new(smtp)?) as Arc<dyn MailTransport>),
      (None, None) => {
        warn!("SMTP is not configured; admin email will report not_configured.");
        None
      }
    };

    let notifier = whatsapp.map(|t| WhatsAppNotifier::new(t, messages.clone(), config.phone_rule.clone()));
    let dispatcher = NotificationDispatcher::new(notifier, mailer, config.notify.clone());
    let backup = Arc::new(BackupLog::new(config.backup_file.clone()));
    let orders = OrderManager::new(orders, backup.clone(), dispatcher.clone(), config.transition_policy);

    info!(
      store = orders.backend_name(),
      whatsapp = dispatcher.whatsapp_enabled(),
      email = dispatcher.email_enabled(),
      policy = ?config.transition_policy,
      backup = %config.backup_file.display(),
      "Order desk assembled."
    );

    Ok(Desk {
      handoff: DeliveryHandoff::new(orders.clone(), dispatcher.clone()),
      inbox: Inbox::new(messages),
      orders,
      dispatcher,
      backup,
    })
  }
}
