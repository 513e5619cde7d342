// core/src/store/mod.rs

//! Storage seams for orders, the sequence counter, and the message audit log.
//!
//! Implementations must make [`OrderStore::increment_counter`] a single atomic
//! increment-and-read: the sequence allocator relies on it to never hand out
//! the same order number twice.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DeskResult;
use crate::model::{Message, Order, OrderStatus};

pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
  #[default]
  CreatedDesc,
  ArchivedDesc,
}

/// Filter for order reads. `None` fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
  pub archived: Option<bool>,
  pub status: Option<OrderStatus>,
  pub customer_phone: Option<String>,
  pub sort: OrderSort,
  pub limit: Option<usize>,
}

impl OrderQuery {
  pub fn active() -> Self {
    Self {
      archived: Some(false),
      ..Self::default()
    }
  }

  pub fn archived() -> Self {
    Self {
      archived: Some(true),
      sort: OrderSort::ArchivedDesc,
      ..Self::default()
    }
  }

  pub fn completed() -> Self {
    Self {
      archived: Some(false),
      status: Some(OrderStatus::Delivered),
      ..Self::default()
    }
  }

  pub fn matches(&self, order: &Order) -> bool {
    self.archived.map_or(true, |a| order.archived == a)
      && self.status.map_or(true, |s| order.status == s)
      && self
        .customer_phone
        .as_deref()
        .map_or(true, |p| order.customer_phone == p)
  }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Inserts a new order; fails on a duplicate `order_number` or `number`.
  async fn insert_order(&self, order: &Order) -> DeskResult<()>;

  /// Replaces the stored document with the same id.
  async fn save_order(&self, order: &Order) -> DeskResult<()>;

  async fn find_order(&self, id: Uuid) -> DeskResult<Option<Order>>;

  async fn find_by_number(&self, order_number: &str) -> DeskResult<Option<Order>>;

  async fn query_orders(&self, query: &OrderQuery) -> DeskResult<Vec<Order>>;

  /// Hard delete. Returns whether a row was removed.
  async fn delete_order(&self, id: Uuid) -> DeskResult<bool>;

  /// Atomically increments counter `name` and returns the new value. A
  /// missing counter is created at `floor` first, so the first call yields
  /// `floor + 1`.
  async fn increment_counter(&self, name: &str, floor: i64) -> DeskResult<i64>;

  fn backend_name(&self) -> &'static str;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
  async fn insert_message(&self, message: &Message) -> DeskResult<()>;

  /// Rewrites status and error code of the message with `message_sid`.
  /// Returns `false` when no such message exists.
  async fn update_delivery_status(
    &self,
    message_sid: &str,
    status: &str,
    error_code: Option<&str>,
  ) -> DeskResult<bool>;

  /// Newest first.
  async fn list_messages(&self, unread_only: bool, limit: usize) -> DeskResult<Vec<Message>>;

  async fn mark_read(&self, message_sid: &str) -> DeskResult<bool>;
}
