// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use async_trait::async_trait;
use parking_lot::Mutex;
use partsdesk::error::{DeskError, DeskResult};
use partsdesk::model::{Message, Order};
use partsdesk::notify::{
  BroadcastSettings, EmailMessage, MailTransport, OutboundMessage, ProviderFailure, ProviderReceipt,
  WhatsAppTransport,
};
use partsdesk::requests::PartsOrderRequest;
use partsdesk::store::{MemoryStore, MessageStore, OrderQuery, OrderStore};
use partsdesk::{Desk, DeskConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracing::Level;
use uuid::Uuid;

pub const ADMIN_1: &str = "0500000001";
pub const ADMIN_2: &str = "0500000002";
pub const DELIVERY: &str = "0500000009";
pub const ADMIN_EMAIL: &str = "ops@example.com";

// --- Fake WhatsApp provider ---

#[derive(Default)]
pub struct FakeWhatsApp {
  pub sent: Mutex<Vec<OutboundMessage>>,
  fail_all: AtomicBool,
  failing: Mutex<Vec<String>>,
  seq: AtomicUsize,
}

impl FakeWhatsApp {
  pub fn fail_all(&self, fail: bool) {
    self.fail_all.store(fail, Ordering::SeqCst);
  }

  /// Makes every send to a number ending in `digits` fail.
  pub fn fail_for(&self, digits: &str) {
    self.failing.lock().push(digits.trim_start_matches('0').to_string());
  }

  pub fn sent_to(&self, digits: &str) -> Vec<OutboundMessage> {
    let tail = digits.trim_start_matches('0');
    self.sent.lock().iter().filter(|m| m.to.ends_with(tail)).cloned().collect()
  }

  pub fn sent_count(&self) -> usize {
    self.sent.lock().len()
  }
}

#[async_trait]
impl WhatsAppTransport for FakeWhatsApp {
  async fn send(&self, message: &OutboundMessage) -> Result<ProviderReceipt, ProviderFailure> {
    let failing = self.fail_all.load(Ordering::SeqCst) || self.failing.lock().iter().any(|d| message.to.ends_with(d));
    if failing {
      return Err(ProviderFailure {
        code: Some("63016".to_string()),
        message: "recipient outside session window".to_string(),
      });
    }
    self.sent.lock().push(message.clone());
    let n = self.seq.fetch_add(1, Ordering::SeqCst);
    Ok(ProviderReceipt {
      sid: format!("SM{n:04}"),
      status: "queued".to_string(),
    })
  }

  fn sender(&self) -> &str {
    "whatsapp:+966500000000"
  }
}

// --- Fake SMTP ---

#[derive(Default)]
pub struct FakeMailer {
  pub sent: Mutex<Vec<EmailMessage>>,
  fail: AtomicBool,
}

impl FakeMailer {
  pub fn fail(&self, fail: bool) {
    self.fail.store(fail, Ordering::SeqCst);
  }
}

#[async_trait]
impl MailTransport for FakeMailer {
  async fn send(&self, message: &EmailMessage) -> DeskResult<String> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(DeskError::Notification {
        channel: "email".to_string(),
        message: "connection refused".to_string(),
      });
    }
    self.sent.lock().push(message.clone());
    Ok("250 OK queued".to_string())
  }
}

// --- Store that loads fine but refuses writes of existing orders ---

pub struct SaveFailingStore {
  pub inner: Arc<MemoryStore>,
}

#[async_trait]
impl OrderStore for SaveFailingStore {
  async fn insert_order(&self, order: &Order) -> DeskResult<()> {
    self.inner.insert_order(order).await
  }
  async fn save_order(&self, _order: &Order) -> DeskResult<()> {
    Err(DeskError::storage("save_order", anyhow::anyhow!("write timeout")))
  }
  async fn find_order(&self, id: Uuid) -> DeskResult<Option<Order>> {
    self.inner.find_order(id).await
  }
  async fn find_by_number(&self, order_number: &str) -> DeskResult<Option<Order>> {
    self.inner.find_by_number(order_number).await
  }
  async fn query_orders(&self, query: &OrderQuery) -> DeskResult<Vec<Order>> {
    self.inner.query_orders(query).await
  }
  async fn delete_order(&self, id: Uuid) -> DeskResult<bool> {
    self.inner.delete_order(id).await
  }
  async fn increment_counter(&self, name: &str, floor: i64) -> DeskResult<i64> {
    self.inner.increment_counter(name, floor).await
  }
  fn backend_name(&self) -> &'static str {
    "save-failing"
  }
}

// --- Desk fixture ---

pub struct TestDesk {
  pub desk: Desk,
  pub store: Arc<MemoryStore>,
  pub whatsapp: Arc<FakeWhatsApp>,
  pub mailer: Arc<FakeMailer>,
  pub dir: TempDir,
}

impl TestDesk {
  pub async fn messages(&self) -> Vec<Message> {
    self.store.list_messages(false, 1000).await.unwrap()
  }
}

pub fn test_config(dir: &TempDir) -> DeskConfig {
  let mut config = DeskConfig::default();
  config.backup_file = dir.path().join("backup_orders.jsonl");
  config.notify.admin_numbers = vec![ADMIN_1.to_string(), ADMIN_2.to_string()];
  config.notify.admin_emails = vec![ADMIN_EMAIL.to_string()];
  config.notify.delivery_number = Some(DELIVERY.to_string());
  config.notify.public_base_url = "https://desk.example.com".to_string();
  config.notify.broadcast = BroadcastSettings {
    batch_size: 2,
    pause: Duration::ZERO,
  };
  config
}

/// Desk over a fresh memory store with fake transports on every channel.
pub fn test_desk() -> TestDesk {
  test_desk_with(|_| {})
}

pub fn test_desk_with(configure: impl FnOnce(&mut DeskConfig)) -> TestDesk {
  setup_tracing();
  let dir = tempfile::tempdir().expect("temp dir");
  let mut config = test_config(&dir);
  configure(&mut config);

  let store = Arc::new(MemoryStore::new());
  let whatsapp = Arc::new(FakeWhatsApp::default());
  let mailer = Arc::new(FakeMailer::default());
  let desk = Desk::builder(config)
    .store(store.clone())
    .whatsapp_transport(whatsapp.clone())
    .mailer(mailer.clone())
    .build()
    .expect("desk builds");
  TestDesk {
    desk,
    store,
    whatsapp,
    mailer,
    dir,
  }
}

pub fn parts_request() -> PartsOrderRequest {
  serde_json::from_value(serde_json::json!({
    "fullName": "Ali",
    "phone": "0551234567",
    "carNameCategory": "Toyota Camry",
    "carYear": 2019,
    "partDetails": "Front bumper",
    "delivery": "express"
  }))
  .expect("valid parts request")
}

pub fn parts_request_for(phone: &str, part: &str) -> PartsOrderRequest {
  let mut request = parts_request();
  request.phone = Some(phone.to_string());
  request.part_details = Some(part.to_string());
  request
}

// --- Helper for Tracing Setup ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
