// core/src/model/mod.rs

//! Entities persisted by the order desk.

pub mod message;
pub mod order;

pub use message::{Direction, Message};
pub use order::{
  CarInfo, DeliveryOption, LineItem, Order, OrderKind, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress,
  TimelineEntry, TimelineEvent, TimelineLabel, Urgency, Warranty,
};
