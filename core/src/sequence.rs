// core/src/sequence.rs

//! Short sequential order numbers (`ORD-100`, `ORD-101`, ...).

use chrono::Utc;
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::error::DeskResult;
use crate::store::OrderStore;

/// Counter key shared by every order-creating path.
pub const ORDER_COUNTER: &str = "orders";
/// Seed of the counter; the first issued number is `SEQUENCE_FLOOR + 1`.
pub const SEQUENCE_FLOOR: i64 = 99;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIdentity {
  pub order_number: String,
  /// `None` when the fallback identifier had to be used.
  pub number: Option<i64>,
}

#[derive(Clone)]
pub struct SequenceAllocator {
  store: Arc<dyn OrderStore>,
}

impl SequenceAllocator {
  pub fn new(store: Arc<dyn OrderStore>) -> Self {
    Self { store }
  }

  pub async fn next_order_number(&self) -> DeskResult<i64> {
    self.store.increment_counter(ORDER_COUNTER, SEQUENCE_FLOOR).await
  }

  /// Issues the identity of a new order. Never fails: when the counter is
  /// unreachable a timestamp-based identifier is returned instead. One
  /// attempt only.
  #[instrument(name = "SequenceAllocator::assign", skip(self))]
  pub async fn assign(&self) -> OrderIdentity {
    match self.next_order_number().await {
      Ok(number) => OrderIdentity {
        order_number: format!("ORD-{number}"),
        number: Some(number),
      },
      Err(e) => {
        let order_number = fallback_order_number();
        warn!(error = %e, %order_number, "Sequence allocation failed, using fallback order number.");
        OrderIdentity {
          order_number,
          number: None,
        }
      }
    }
  }
}

/// `ORD-<unix millis>-<random>`; unique without any shared state.
pub fn fallback_order_number() -> String {
  let random = Uuid::new_v4().simple().to_string();
  format!("ORD-{}-{}", Utc::now().timestamp_millis(), &random[..8])
}
