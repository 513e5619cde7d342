// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use async_trait::async_trait;
use parking_lot::Mutex;
use partsdesk::notify::{OutboundMessage, ProviderFailure, ProviderReceipt, WhatsAppTransport};
use partsdesk::{Desk, MemoryStore};
use partsdesk_server::config::AppConfig;
use partsdesk_server::state::AppState;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

pub const JWT_SECRET: &str = "test-secret";

#[derive(Default)]
pub struct FakeWhatsApp {
  pub sent: Mutex<Vec<OutboundMessage>>,
}

#[async_trait]
impl WhatsAppTransport for FakeWhatsApp {
  async fn send(&self, message: &OutboundMessage) -> Result<ProviderReceipt, ProviderFailure> {
    let mut sent = self.sent.lock();
    sent.push(message.clone());
    Ok(ProviderReceipt {
      sid: format!("SM{:04}", sent.len()),
      status: "queued".to_string(),
    })
  }

  fn sender(&self) -> &str {
    "whatsapp:+966500000000"
  }
}

pub struct TestServer {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
  pub whatsapp: Arc<FakeWhatsApp>,
  pub dir: TempDir,
}

/// Configuration as the server would read it, pointed at a temp directory.
pub fn test_server(extra: &[(&str, &str)]) -> TestServer {
  let dir = tempfile::tempdir().expect("temp dir");
  let upload_dir = dir.path().join("uploads").display().to_string();
  let backup_file = dir.path().join("backup_orders.jsonl").display().to_string();
  let mut vars: HashMap<String, String> = [
    ("PUBLIC_BASE_URL", "https://desk.example.com"),
    ("ADMIN_WHATSAPP_NUMBERS", "0500000001"),
    ("DELIVERY_WHATSAPP", "0500000009"),
    ("BROADCAST_BATCH_PAUSE_MS", "0"),
  ]
  .iter()
  .map(|(k, v)| (k.to_string(), v.to_string()))
  .collect();
  vars.insert("UPLOAD_DIR".to_string(), upload_dir);
  vars.insert("BACKUP_FILE".to_string(), backup_file);
  for (k, v) in extra {
    vars.insert(k.to_string(), v.to_string());
  }
  let config = AppConfig::from_lookup(|name| vars.get(name).cloned()).expect("valid test config");

  let store = Arc::new(MemoryStore::new());
  let whatsapp = Arc::new(FakeWhatsApp::default());
  let desk = Desk::builder(config.desk.clone())
    .store(store.clone())
    .whatsapp_transport(whatsapp.clone())
    .build()
    .expect("desk builds");
  TestServer {
    state: AppState {
      desk,
      config: Arc::new(config),
      store_name: "memory",
    },
    store,
    whatsapp,
    dir,
  }
}

/// Real route table over the test state.
macro_rules! init_app {
  ($server:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($server.state.clone()))
        .configure(partsdesk_server::web::configure_app_routes),
    )
    .await
  };
}

pub fn parts_order_json() -> serde_json::Value {
  serde_json::json!({
    "fullName": "Ali",
    "phone": "0551234567",
    "carNameCategory": "Toyota Camry",
    "carYear": 2019,
    "partDetails": "Front bumper",
    "delivery": "express"
  })
}
