// server/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod inbox_handlers;
pub mod order_handlers;
pub mod system_handlers;
pub mod webhook_handlers;

use partsdesk::{Channel, Mutation, NotifyReport};
use serde_json::{json, Map, Value};

/// Per-channel results under the response keys clients already read.
pub(crate) fn notify_fields(report: &NotifyReport, body: &mut Map<String, Value>) {
  for (key, channel) in [
    ("driverNotify", Channel::WhatsappStaff),
    ("customerNotify", Channel::WhatsappCustomer),
    ("emailNotify", Channel::Email),
  ] {
    let value = report.get(channel).map(|r| json!(r)).unwrap_or(Value::Null);
    body.insert(key.to_string(), value);
  }
}

pub(crate) fn mutation_body(mutation: &Mutation) -> Map<String, Value> {
  let mut body = Map::new();
  body.insert("order".to_string(), json!(mutation.order));
  body.insert("changed".to_string(), json!(mutation.changed));
  body.insert("persisted".to_string(), json!(mutation.persisted));
  if let Some(err) = &mutation.storage_error {
    body.insert("storageError".to_string(), json!(err));
  }
  body
}
