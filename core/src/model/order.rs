// core/src/model/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Persisted lifecycle status. Timeline entries may additionally carry the
/// pseudo-states in [`TimelineLabel`], which never overwrite this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 6] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  pub fn parse(raw: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|s| s.as_str() == raw)
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s).ok_or_else(|| format!("unknown order status '{s}'"))
  }
}

/// Label recorded on a timeline entry: either a real status or an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimelineLabel {
  Status(OrderStatus),
  Event(TimelineEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEvent {
  PricingUpdated,
  Archived,
  Restored,
}

impl fmt::Display for TimelineLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TimelineLabel::Status(s) => f.write_str(s.as_str()),
      TimelineLabel::Event(TimelineEvent::PricingUpdated) => f.write_str("pricing_updated"),
      TimelineLabel::Event(TimelineEvent::Archived) => f.write_str("archived"),
      TimelineLabel::Event(TimelineEvent::Restored) => f.write_str("restored"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
  pub status: TimelineLabel,
  pub date: DateTime<Utc>,
  pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOption {
  #[default]
  Free,
  Standard,
  Express,
}

impl DeliveryOption {
  /// Fixed fee table: free 0, standard 25, express 50.
  pub fn fee(&self) -> f64 {
    match self {
      DeliveryOption::Free => 0.0,
      DeliveryOption::Standard => 25.0,
      DeliveryOption::Express => 50.0,
    }
  }

  pub fn parse(raw: &str) -> Option<Self> {
    match raw {
      "free" => Some(DeliveryOption::Free),
      "standard" => Some(DeliveryOption::Standard),
      "express" => Some(DeliveryOption::Express),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      DeliveryOption::Free => "free",
      DeliveryOption::Standard => "standard",
      DeliveryOption::Express => "express",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
  #[default]
  Normal,
  Rush,
}

impl Urgency {
  pub fn parse(raw: &str) -> Option<Self> {
    match raw {
      "normal" => Some(Urgency::Normal),
      "rush" => Some(Urgency::Rush),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
  #[default]
  Cash,
  Card,
  Transfer,
  Tamara,
  Tabby,
}

impl PaymentMethod {
  pub fn parse(raw: &str) -> Option<Self> {
    match raw {
      "cash" => Some(PaymentMethod::Cash),
      "card" => Some(PaymentMethod::Card),
      "transfer" => Some(PaymentMethod::Transfer),
      "tamara" => Some(PaymentMethod::Tamara),
      "tabby" => Some(PaymentMethod::Tabby),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  #[default]
  Pending,
  Paid,
  Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
  Parts,
  SellCar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarInfo {
  pub make: Option<String>,
  pub model: Option<String>,
  pub year: Option<i32>,
  pub vin: Option<String>,
  pub condition: Option<String>,
  pub mileage: Option<f64>,
  pub transmission: Option<String>,
  pub full_name: Option<String>,
}

impl CarInfo {
  /// "Toyota Camry 2019" style label used in notifications.
  pub fn display_name(&self) -> String {
    let name = match (&self.full_name, &self.make, &self.model) {
      (Some(full), _, _) => full.clone(),
      (None, Some(make), Some(model)) => format!("{make} {model}"),
      (None, Some(make), None) => make.clone(),
      (None, None, Some(model)) => model.clone(),
      (None, None, None) => String::new(),
    };
    match self.year {
      Some(year) if !name.is_empty() => format!("{name} {year}"),
      Some(year) => year.to_string(),
      None => name,
    }
  }
}

/// Warranty terms of one line item; serialized flat onto the item
/// (`warranty`, `warrantyDuration`, `warrantyStartDate`, `warrantyEndDate`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Warranty {
  #[serde(rename = "warranty", default)]
  pub enabled: bool,
  #[serde(rename = "warrantyDuration")]
  pub duration: Option<String>,
  #[serde(rename = "warrantyStartDate")]
  pub start_date: Option<DateTime<Utc>>,
  #[serde(rename = "warrantyEndDate")]
  pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
  pub part_name: String,
  pub quantity: u32,
  pub price: Option<f64>,
  #[serde(default)]
  pub images: Vec<String>,
  #[serde(flatten)]
  pub warranty: Warranty,
}

impl LineItem {
  pub fn new(part_name: impl Into<String>) -> Self {
    Self {
      part_name: part_name.into(),
      quantity: 1,
      price: None,
      images: Vec::new(),
      warranty: Warranty::default(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
  pub name: Option<String>,
  pub phone: Option<String>,
  pub city: Option<String>,
  pub district: Option<String>,
  pub street: Option<String>,
  pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  /// Business key, assigned once at creation.
  pub order_number: String,
  /// Sequential number; `None` when the allocator was unavailable.
  pub number: Option<i64>,
  pub order_type: OrderKind,
  pub customer_name: String,
  pub customer_phone: String,
  pub customer_email: Option<String>,
  pub car_info: CarInfo,
  pub items: Vec<LineItem>,
  pub total_amount: f64,
  pub delivery_fee: f64,
  pub delivery_option: DeliveryOption,
  pub status: OrderStatus,
  pub urgency: Urgency,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
  pub shipping_address: ShippingAddress,
  pub tracking_number: Option<String>,
  pub notes: Option<String>,
  #[serde(default)]
  pub images: Vec<String>,
  pub timeline: Vec<TimelineEntry>,
  pub archived: bool,
  pub archived_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  pub fn primary_item(&self) -> Option<&LineItem> {
    self.items.first()
  }

  pub fn push_timeline(&mut self, status: TimelineLabel, description: impl Into<String>, at: DateTime<Utc>) {
    self.timeline.push(TimelineEntry {
      status,
      date: at,
      description: description.into(),
    });
    self.updated_at = at;
  }

  pub fn city(&self) -> Option<&str> {
    self.shipping_address.city.as_deref()
  }
}
