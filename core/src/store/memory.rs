// core/src/store/memory.rs

//! Process-local store used when no database is configured, and by tests.
//!
//! The availability switch makes every operation fail with a storage error,
//! which is how outages of the primary store are simulated.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use super::{MessageStore, OrderQuery, OrderSort, OrderStore};
use crate::error::{DeskError, DeskResult};
use crate::model::{Message, Order};

#[derive(Debug, Default)]
struct Inner {
  orders: HashMap<Uuid, Order>,
  counters: HashMap<String, i64>,
  messages: Vec<Message>,
}

#[derive(Debug)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
  available: AtomicBool,
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryStore {
  pub fn new() -> Self {
    Self {
      inner: Mutex::new(Inner::default()),
      available: AtomicBool::new(true),
    }
  }

  pub fn set_available(&self, available: bool) {
    self.available.store(available, Ordering::SeqCst);
  }

  pub fn order_count(&self) -> usize {
    self.inner.lock().orders.len()
  }

  fn check(&self, operation: &'static str) -> DeskResult<()> {
    if self.available.load(Ordering::SeqCst) {
      Ok(())
    } else {
      Err(DeskError::storage(operation, anyhow::anyhow!("memory store is unavailable")))
    }
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn insert_order(&self, order: &Order) -> DeskResult<()> {
    self.check("insert_order")?;
    let mut inner = self.inner.lock();
    let duplicate = inner.orders.values().any(|existing| {
      existing.id == order.id
        || existing.order_number == order.order_number
        || (order.number.is_some() && existing.number == order.number)
    });
    if duplicate {
      return Err(DeskError::storage(
        "insert_order",
        anyhow::anyhow!("duplicate order key {}", order.order_number),
      ));
    }
    inner.orders.insert(order.id, order.clone());
    Ok(())
  }

  async fn save_order(&self, order: &Order) -> DeskResult<()> {
    self.check("save_order")?;
    let mut inner = self.inner.lock();
    match inner.orders.get_mut(&order.id) {
      Some(slot) => {
        *slot = order.clone();
        Ok(())
      }
      None => Err(DeskError::order_not_found(order.id)),
    }
  }

  async fn find_order(&self, id: Uuid) -> DeskResult<Option<Order>> {
    self.check("find_order")?;
    Ok(self.inner.lock().orders.get(&id).cloned())
  }

  async fn find_by_number(&self, order_number: &str) -> DeskResult<Option<Order>> {
    self.check("find_by_number")?;
    Ok(
      self
        .inner
        .lock()
        .orders
        .values()
        .find(|o| o.order_number == order_number)
        .cloned(),
    )
  }

  async fn query_orders(&self, query: &OrderQuery) -> DeskResult<Vec<Order>> {
    self.check("query_orders")?;
    let mut found: Vec<Order> = self
      .inner
      .lock()
      .orders
      .values()
      .filter(|o| query.matches(o))
      .cloned()
      .collect();
    match query.sort {
      OrderSort::CreatedDesc => found.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
      OrderSort::ArchivedDesc => found.sort_by(|a, b| b.archived_at.cmp(&a.archived_at)),
    }
    if let Some(limit) = query.limit {
      found.truncate(limit);
    }
    Ok(found)
  }

  async fn delete_order(&self, id: Uuid) -> DeskResult<bool> {
    self.check("delete_order")?;
    Ok(self.inner.lock().orders.remove(&id).is_some())
  }

  async fn increment_counter(&self, name: &str, floor: i64) -> DeskResult<i64> {
    self.check("increment_counter")?;
    let mut inner = self.inner.lock();
    let seq = inner.counters.entry(name.to_string()).or_insert(floor);
    *seq += 1;
    Ok(*seq)
  }

  fn backend_name(&self) -> &'static str {
    "memory"
  }
}

#[async_trait]
impl MessageStore for MemoryStore {
  async fn insert_message(&self, message: &Message) -> DeskResult<()> {
    self.check("insert_message")?;
    self.inner.lock().messages.push(message.clone());
    Ok(())
  }

  async fn update_delivery_status(
    &self,
    message_sid: &str,
    status: &str,
    error_code: Option<&str>,
  ) -> DeskResult<bool> {
    self.check("update_delivery_status")?;
    let mut inner = self.inner.lock();
    match inner.messages.iter_mut().find(|m| m.message_sid == message_sid) {
      Some(message) => {
        message.status = status.to_string();
        message.error_code = error_code.map(str::to_string);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn list_messages(&self, unread_only: bool, limit: usize) -> DeskResult<Vec<Message>> {
    self.check("list_messages")?;
    let mut found: Vec<Message> = self
      .inner
      .lock()
      .messages
      .iter()
      .filter(|m| !unread_only || !m.read)
      .cloned()
      .collect();
    found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    found.truncate(limit);
    Ok(found)
  }

  async fn mark_read(&self, message_sid: &str) -> DeskResult<bool> {
    self.check("mark_read")?;
    let mut inner = self.inner.lock();
    match inner.messages.iter_mut().find(|m| m.message_sid == message_sid) {
      Some(message) => {
        message.read = true;
        Ok(true)
      }
      None => Ok(false),
    }
  }
}
