// core/src/lifecycle/mod.rs

//! The order lifecycle: creation, admin mutations, and listings.
//!
//! Creation never fails once the request is valid: the order is written to
//! the primary store, or else to the backup log, and the caller is told
//! which. Mutations fail only on validation, an unknown order, a rejected
//! transition, or a store that cannot even load the order; a failed save is
//! reported in the returned [`Mutation`].

pub mod outcome;
pub mod transitions;

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

pub use outcome::{CreateOutcome, Mutation, OrderKey, Persistence, StatusOutcome};
pub use transitions::TransitionPolicy;

use crate::backup::{BackupLog, SOURCE_DB_ERROR};
use crate::error::{DeskError, DeskResult};
use crate::model::{
  CarInfo, DeliveryOption, LineItem, Order, OrderKind, OrderStatus, PaymentStatus, ShippingAddress, TimelineEvent,
  TimelineLabel, Urgency, Warranty,
};
use crate::notify::render::format_amount;
use crate::notify::{reason, NotificationDispatcher, NotifyReport};
use crate::pricing::{total_amount, warranty_window};
use crate::requests::{
  NewPartsOrder, NewSellCarOrder, PartsOrderRequest, PricingRequest, SellCarRequest, StatusUpdateRequest,
};
use crate::sequence::{OrderIdentity, SequenceAllocator};
use crate::store::{OrderQuery, OrderStore};
use crate::validation::ValidationError;

/// Listing caps for the generic and tracking reads.
pub const LIST_LIMIT: usize = 50;
pub const TRACK_LIMIT: usize = 10;

pub const SEED_DESCRIPTION: &str = "Order received";

#[derive(Clone)]
pub struct OrderManager {
  store: Arc<dyn OrderStore>,
  sequence: SequenceAllocator,
  backup: Arc<BackupLog>,
  notifier: NotificationDispatcher,
  policy: TransitionPolicy,
}

impl OrderManager {
  pub fn new(
    store: Arc<dyn OrderStore>,
    backup: Arc<BackupLog>,
    notifier: NotificationDispatcher,
    policy: TransitionPolicy,
  ) -> Self {
    Self {
      sequence: SequenceAllocator::new(store.clone()),
      store,
      backup,
      notifier,
      policy,
    }
  }

  pub fn policy(&self) -> TransitionPolicy {
    self.policy
  }

  pub fn backend_name(&self) -> &'static str {
    self.store.backend_name()
  }

  // --- creation ---

  #[instrument(name = "OrderManager::create_order", skip_all, err(Display))]
  pub async fn create_order(&self, request: &PartsOrderRequest, images: Vec<String>) -> DeskResult<CreateOutcome> {
    let command = request.validate()?;
    let identity = self.sequence.assign().await;
    let order = build_parts_order(identity, command, images, Utc::now());
    Ok(self.finish_create(order).await)
  }

  #[instrument(name = "OrderManager::create_sell_car_order", skip_all, err(Display))]
  pub async fn create_sell_car_order(&self, request: &SellCarRequest, images: Vec<String>) -> DeskResult<CreateOutcome> {
    let command = request.validate()?;
    let identity = self.sequence.assign().await;
    let order = build_sell_car_order(identity, command, images, Utc::now());
    Ok(self.finish_create(order).await)
  }

  async fn finish_create(&self, order: Order) -> CreateOutcome {
    let persistence = self.persist_new(&order).await;
    info!(
      order_number = %order.order_number,
      kind = ?order.order_type,
      ?persistence,
      "Order created."
    );
    let notify = self.notifier.order_created(&order).await;
    CreateOutcome {
      order,
      persistence,
      notify,
    }
  }

  async fn persist_new(&self, order: &Order) -> Persistence {
    let primary_err = match self.store.insert_order(order).await {
      Ok(()) => return Persistence::Database,
      Err(e) => e,
    };
    warn!(order_number = %order.order_number, error = %primary_err, "Primary store refused order, writing backup.");
    match self.backup.append(order, SOURCE_DB_ERROR).await {
      Ok(()) => Persistence::Backup,
      Err(backup_err) => {
        error!(
          order_number = %order.order_number,
          primary = %primary_err,
          backup = %backup_err,
          "Order could not be saved anywhere."
        );
        Persistence::Unsaved
      }
    }
  }

  // --- mutations ---

  #[instrument(name = "OrderManager::update_status", skip(self, request), fields(order = %key), err(Display))]
  pub async fn update_status(&self, key: &OrderKey, request: &StatusUpdateRequest) -> DeskResult<StatusOutcome> {
    let change = request.validate()?;
    let mut order = self.load(key).await?;
    self.policy.check(order.status, change.status)?;

    let description = change
      .description
      .unwrap_or_else(|| format!("Status updated to {}", change.status));
    order.status = change.status;
    order.push_timeline(TimelineLabel::Status(change.status), description, Utc::now());

    let mutation = self.commit(order).await;
    let notify = if mutation.persisted {
      self.notifier.status_changed(&mutation.order, change.status).await
    } else {
      NotifyReport::suppressed(reason::NOT_PERSISTED)
    };
    Ok(StatusOutcome { mutation, notify })
  }

  /// Sets the quoted price and warranty of the primary item and recomputes
  /// the total from it and the delivery fee.
  #[instrument(name = "OrderManager::update_pricing", skip(self, request), fields(order = %key), err(Display))]
  pub async fn update_pricing(&self, key: &OrderKey, request: &PricingRequest) -> DeskResult<Mutation> {
    let update = request.validate()?;
    let mut order = self.load(key).await?;
    let now = Local::now();

    if order.items.is_empty() {
      let label = match order.car_info.display_name() {
        name if name.is_empty() => "Quoted item".to_string(),
        name => name,
      };
      order.items.push(LineItem::new(label));
    }
    let warranty = match update.warranty_days {
      Some(days) => warranty_window(&now, days)
        .ok_or_else(|| ValidationError::single("warrantyDuration", "ends past the supported calendar range"))?
        .into_warranty(days),
      None => Warranty::default(),
    };
    if let Some(item) = order.items.first_mut() {
      item.price = Some(update.price);
      item.warranty = warranty;
    }
    order.total_amount = total_amount(update.price, order.delivery_fee);

    let description = match update.warranty_days {
      Some(days) => format!("Price set to {} with {days} days warranty", format_amount(update.price)),
      None => format!("Price set to {} without warranty", format_amount(update.price)),
    };
    order.push_timeline(
      TimelineLabel::Event(TimelineEvent::PricingUpdated),
      description,
      now.with_timezone(&Utc),
    );
    Ok(self.commit(order).await)
  }

  #[instrument(name = "OrderManager::archive", skip(self), fields(order = %key), err(Display))]
  pub async fn archive(&self, key: &OrderKey) -> DeskResult<Mutation> {
    self.set_archived(key, true).await
  }

  #[instrument(name = "OrderManager::restore", skip(self), fields(order = %key), err(Display))]
  pub async fn restore(&self, key: &OrderKey) -> DeskResult<Mutation> {
    self.set_archived(key, false).await
  }

  async fn set_archived(&self, key: &OrderKey, archived: bool) -> DeskResult<Mutation> {
    let mut order = self.load(key).await?;
    if order.archived == archived {
      return Ok(Mutation {
        order,
        changed: false,
        persisted: true,
        storage_error: None,
      });
    }
    let now = Utc::now();
    order.archived = archived;
    let (event, description) = if archived {
      order.archived_at = Some(now);
      (TimelineEvent::Archived, "Order archived")
    } else {
      order.archived_at = None;
      (TimelineEvent::Restored, "Order restored from archive")
    };
    order.push_timeline(TimelineLabel::Event(event), description, now);
    Ok(self.commit(order).await)
  }

  /// Customer-side cancellation. Each call appends a timeline entry.
  #[instrument(name = "OrderManager::cancel", skip(self), fields(order = %key), err(Display))]
  pub async fn cancel(&self, key: &OrderKey) -> DeskResult<Mutation> {
    let mut order = self.load(key).await?;
    self.policy.check(order.status, OrderStatus::Cancelled)?;
    order.status = OrderStatus::Cancelled;
    order.push_timeline(TimelineLabel::Status(OrderStatus::Cancelled), "Order cancelled", Utc::now());
    Ok(self.commit(order).await)
  }

  /// Hard delete, bypassing the archive.
  #[instrument(name = "OrderManager::purge", skip(self), fields(order = %key), err(Display))]
  pub async fn purge(&self, key: &OrderKey) -> DeskResult<Order> {
    let order = self.load(key).await?;
    if !self.store.delete_order(order.id).await? {
      return Err(DeskError::order_not_found(key));
    }
    warn!(order_number = %order.order_number, "Order permanently deleted.");
    Ok(order)
  }

  // --- reads ---

  pub async fn get(&self, key: &OrderKey) -> DeskResult<Order> {
    self.load(key).await
  }

  pub async fn find(&self, key: &OrderKey) -> DeskResult<Option<Order>> {
    match key {
      OrderKey::Id(id) => self.store.find_order(*id).await,
      OrderKey::Number(number) => self.store.find_by_number(number).await,
    }
  }

  pub async fn list_active(&self) -> Vec<Order> {
    self.query_or_empty(OrderQuery::active()).await
  }

  pub async fn list_archived(&self) -> Vec<Order> {
    self.query_or_empty(OrderQuery::archived()).await
  }

  pub async fn list_completed(&self) -> Vec<Order> {
    self.query_or_empty(OrderQuery::completed()).await
  }

  pub async fn list(&self, status: Option<OrderStatus>, phone: Option<String>) -> Vec<Order> {
    self
      .query_or_empty(OrderQuery {
        status,
        customer_phone: phone,
        limit: Some(LIST_LIMIT),
        ..OrderQuery::default()
      })
      .await
  }

  pub async fn track(&self, phone: &str) -> Vec<Order> {
    self
      .query_or_empty(OrderQuery {
        customer_phone: Some(phone.trim().to_string()),
        limit: Some(TRACK_LIMIT),
        ..OrderQuery::default()
      })
      .await
  }

  async fn query_or_empty(&self, query: OrderQuery) -> Vec<Order> {
    match self.store.query_orders(&query).await {
      Ok(orders) => orders,
      Err(e) => {
        warn!(error = %e, ?query, "Order listing failed, returning an empty result.");
        Vec::new()
      }
    }
  }

  async fn load(&self, key: &OrderKey) -> DeskResult<Order> {
    self.find(key).await?.ok_or_else(|| DeskError::order_not_found(key))
  }

  async fn commit(&self, order: Order) -> Mutation {
    match self.store.save_order(&order).await {
      Ok(()) => Mutation {
        order,
        changed: true,
        persisted: true,
        storage_error: None,
      },
      Err(e) => {
        error!(order_number = %order.order_number, error = %e, "Order change could not be saved.");
        Mutation {
          order,
          changed: true,
          persisted: false,
          storage_error: Some(e.to_string()),
        }
      }
    }
  }
}

fn new_order(identity: OrderIdentity, kind: OrderKind, now: DateTime<Utc>) -> Order {
  let mut order = Order {
    id: Uuid::new_v4(),
    order_number: identity.order_number,
    number: identity.number,
    order_type: kind,
    customer_name: String::new(),
    customer_phone: String::new(),
    customer_email: None,
    car_info: CarInfo::default(),
    items: Vec::new(),
    total_amount: 0.0,
    delivery_fee: 0.0,
    delivery_option: DeliveryOption::default(),
    status: OrderStatus::Pending,
    urgency: Urgency::default(),
    payment_method: Default::default(),
    payment_status: PaymentStatus::Pending,
    shipping_address: ShippingAddress::default(),
    tracking_number: None,
    notes: None,
    images: Vec::new(),
    timeline: Vec::new(),
    archived: false,
    archived_at: None,
    created_at: now,
    updated_at: now,
  };
  order.push_timeline(TimelineLabel::Status(OrderStatus::Pending), SEED_DESCRIPTION, now);
  order
}

pub(crate) fn build_parts_order(
  identity: OrderIdentity,
  command: NewPartsOrder,
  images: Vec<String>,
  now: DateTime<Utc>,
) -> Order {
  let mut order = new_order(identity, OrderKind::Parts, now);
  let fee = command.delivery_option.fee();

  let mut item = LineItem::new(command.part_details);
  item.images = images;

  order.customer_name = command.customer_name.clone();
  order.customer_phone = command.phone.clone();
  order.customer_email = command.email;
  order.car_info = CarInfo {
    make: Some(command.car_make),
    model: command.car_model,
    year: Some(command.car_year),
    vin: command.vin,
    full_name: Some(command.car_full_name),
    ..CarInfo::default()
  };
  order.items = vec![item];
  order.delivery_option = command.delivery_option;
  order.delivery_fee = fee;
  order.total_amount = fee;
  order.urgency = command.urgency;
  order.payment_method = command.payment_method;
  order.notes = command.notes.clone();
  order.shipping_address = ShippingAddress {
    name: Some(command.customer_name),
    phone: Some(command.phone),
    city: command.city,
    details: command.notes,
    ..ShippingAddress::default()
  };
  order
}

pub(crate) fn build_sell_car_order(
  identity: OrderIdentity,
  command: NewSellCarOrder,
  images: Vec<String>,
  now: DateTime<Utc>,
) -> Order {
  let mut order = new_order(identity, OrderKind::SellCar, now);
  order.customer_name = command.customer_name.clone();
  order.customer_phone = command.phone.clone();
  order.customer_email = command.email;
  order.car_info = CarInfo {
    make: Some(command.car_make),
    model: Some(command.car_model),
    year: Some(command.car_year),
    vin: command.vin,
    condition: command.condition,
    mileage: command.mileage,
    transmission: command.transmission,
    full_name: None,
  };
  order.total_amount = command.expected_price.unwrap_or(0.0);
  order.images = images;
  order.notes = command.notes.clone();
  order.shipping_address = ShippingAddress {
    name: Some(command.customer_name),
    phone: Some(command.phone),
    city: command.city,
    details: command.notes,
    ..ShippingAddress::default()
  };
  order
}
