// src/lib.rs

//! Partsdesk: order lifecycle and notification core for a local auto-parts marketplace.
//!
//! Partsdesk takes customer part requests and car-sale requests through their
//! whole life:
//!  - Validated, typed request payloads that report every bad field at once.
//!  - Short sequential order numbers from an atomic counter, with a unique fallback.
//!  - Creation that never bounces a valid request: a refused write lands in a backup log.
//!  - Status, pricing/warranty, archive and cancel mutations with an append-only timeline.
//!  - WhatsApp (template or freeform) and SMTP notifications, each channel isolated.
//!  - Delivery hand-off messages, bulk broadcasts, and a webhook-fed inbox.

pub mod backup;
pub mod config;
pub mod desk;
pub mod error;
pub mod handoff;
pub mod inbox;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod pricing;
pub mod requests;
pub mod sequence;
pub mod store;
pub mod validation;

// --- Re-exports for the Public API ---

pub use crate::config::DeskConfig;
pub use crate::desk::{Desk, DeskBuilder};
pub use crate::error::{DeskError, DeskResult};
pub use crate::validation::{FieldViolation, ValidationError};

pub use crate::lifecycle::{
  CreateOutcome, Mutation, OrderKey, OrderManager, Persistence, StatusOutcome, TransitionPolicy,
};
pub use crate::model::{Message, Order, OrderStatus};

pub use crate::notify::{
  Channel, ChannelResult, MessageContent, NotificationDispatcher, NotifyConfig, NotifyReport, PhoneRule,
};

pub use crate::store::{MemoryStore, MessageStore, OrderQuery, OrderStore};

pub use crate::backup::BackupLog;
pub use crate::handoff::{DeliveryHandoff, HandoffOutcome};
pub use crate::inbox::Inbox;
pub use crate::sequence::SequenceAllocator;

/*
    Request flow:
    1. The host builds a `DeskConfig` once (recipients, templates, backup path, policy).
    2. `Desk::builder(config).store(..).build()` wires stores and transports.
    3. Handlers call `desk.orders.create_order(&request, images)` and friends.
    4. Outcomes carry the saved order, where it was persisted, and one
       `ChannelResult` per notification channel. Only validation, unknown
       orders, rejected transitions and unreadable stores come back as `Err`.
*/
