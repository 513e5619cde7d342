// core/src/handoff.rs

//! Sends a batch of orders to a delivery partner as one WhatsApp message.
//! Informational only: order status is left untouched.

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::{DeskError, DeskResult};
use crate::lifecycle::{OrderKey, OrderManager};
use crate::model::Order;
use crate::notify::phone::mask;
use crate::notify::{Channel, ChannelResult, MessageContent, NotificationDispatcher};
use crate::requests::HandoffRequest;
use crate::validation::ValidationError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffOutcome {
  /// Order numbers included in the message, in request order.
  pub included: Vec<String>,
  /// Requested keys that matched no order.
  pub missing: Vec<String>,
  pub sent: bool,
  pub notify: ChannelResult,
}

#[derive(Clone)]
pub struct DeliveryHandoff {
  orders: OrderManager,
  dispatcher: NotificationDispatcher,
}

impl DeliveryHandoff {
  pub fn new(orders: OrderManager, dispatcher: NotificationDispatcher) -> Self {
    Self { orders, dispatcher }
  }

  #[instrument(name = "DeliveryHandoff::send", skip_all, err(Display))]
  pub async fn send(&self, request: &HandoffRequest) -> DeskResult<HandoffOutcome> {
    let handoff = request.validate()?;
    let phone = handoff
      .phone
      .or_else(|| self.dispatcher.config().delivery_number.clone())
      .ok_or_else(|| ValidationError::single("phone", "is required when no delivery number is configured"))?;

    let mut found: Vec<Order> = Vec::new();
    let mut missing = Vec::new();
    for raw in &handoff.order_keys {
      match self.orders.find(&OrderKey::parse(raw)).await? {
        Some(order) if !found.iter().any(|o| o.id == order.id) => found.push(order),
        Some(_) => {}
        None => missing.push(raw.clone()),
      }
    }
    if found.is_empty() {
      return Err(DeskError::NotFound {
        entity: "orders",
        key: missing.join(", "),
      });
    }

    let body = self.dispatcher.renderer().handoff_message(&found);
    let notify = self
      .dispatcher
      .send_direct(Channel::WhatsappDelivery, &phone, MessageContent::Freeform(body))
      .await;
    let included: Vec<String> = found.into_iter().map(|o| o.order_number).collect();
    info!(
      to = %mask(&phone),
      included = included.len(),
      missing = missing.len(),
      sent = notify.ok,
      "Delivery hand-off processed."
    );
    Ok(HandoffOutcome {
      included,
      missing,
      sent: notify.ok,
      notify,
    })
  }
}
