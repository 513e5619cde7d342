// core/src/requests.rs

//! Typed request payloads, one per endpoint, and their validated forms.
//!
//! Every field arrives as optional text (JSON numbers are accepted too, see
//! [`lenient_string`]); `validate()` turns the payload into a command whose
//! fields are guaranteed present and well-formed, or reports every problem.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::model::{DeliveryOption, OrderStatus, PaymentMethod, Urgency};
use crate::validation::{lenient_string, non_blank, ValidationError, Validator};

// --- Parts order ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsOrderRequest {
  #[serde(default, deserialize_with = "lenient_string")]
  pub full_name: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub phone: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub email: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub car_name_category: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub car_year: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub part_details: Option<String>,
  #[serde(default, alias = "deliveryOption", deserialize_with = "lenient_string")]
  pub delivery: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub vin: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub urgency: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub payment_method: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub city: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPartsOrder {
  pub customer_name: String,
  pub phone: String,
  pub email: Option<String>,
  pub car_full_name: String,
  pub car_make: String,
  pub car_model: Option<String>,
  pub car_year: i32,
  pub part_details: String,
  pub delivery_option: DeliveryOption,
  pub vin: Option<String>,
  pub urgency: Urgency,
  pub payment_method: PaymentMethod,
  pub city: Option<String>,
  pub notes: Option<String>,
}

impl PartsOrderRequest {
  pub fn validate(&self) -> Result<NewPartsOrder, ValidationError> {
    let mut v = Validator::new();
    let customer_name = v.required("fullName", &self.full_name);
    let phone = v.required("phone", &self.phone);
    let car_full_name = v.required("carNameCategory", &self.car_name_category);
    let car_year = v.required_year("carYear", &self.car_year);
    let part_details = v.required("partDetails", &self.part_details);
    let delivery_option = v
      .optional_choice("delivery", &self.delivery, DeliveryOption::parse, "free, standard, express")
      .unwrap_or_default();
    let urgency = v
      .optional_choice("urgency", &self.urgency, Urgency::parse, "normal, rush")
      .unwrap_or_default();
    let payment_method = v
      .optional_choice(
        "paymentMethod",
        &self.payment_method,
        PaymentMethod::parse,
        "cash, card, transfer, tamara, tabby",
      )
      .unwrap_or_default();

    let (car_make, car_model) = split_car_name(&car_full_name);
    v.finish(NewPartsOrder {
      customer_name,
      phone,
      email: non_blank(&self.email),
      car_full_name,
      car_make,
      car_model,
      car_year,
      part_details,
      delivery_option,
      vin: non_blank(&self.vin),
      urgency,
      payment_method,
      city: non_blank(&self.city),
      notes: non_blank(&self.notes),
    })
  }
}

/// Splits "Toyota Land Cruiser" into ("Toyota", Some("Land Cruiser")) on the first whitespace.
pub fn split_car_name(full: &str) -> (String, Option<String>) {
  let trimmed = full.trim();
  match trimmed.split_once(char::is_whitespace) {
    Some((make, rest)) => {
      let model = rest.trim();
      (make.to_string(), (!model.is_empty()).then(|| model.to_string()))
    }
    None => (trimmed.to_string(), None),
  }
}

// --- Sell-car order ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellCarRequest {
  #[serde(default, deserialize_with = "lenient_string")]
  pub full_name: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub phone: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub email: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub car_make: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub car_model: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub car_year: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub expected_price: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub mileage: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub condition: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub transmission: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub vin: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub city: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSellCarOrder {
  pub customer_name: String,
  pub phone: String,
  pub email: Option<String>,
  pub car_make: String,
  pub car_model: String,
  pub car_year: i32,
  pub expected_price: Option<f64>,
  pub mileage: Option<f64>,
  pub condition: Option<String>,
  pub transmission: Option<String>,
  pub vin: Option<String>,
  pub city: Option<String>,
  pub notes: Option<String>,
}

impl SellCarRequest {
  pub fn validate(&self) -> Result<NewSellCarOrder, ValidationError> {
    let mut v = Validator::new();
    let customer_name = v.required("fullName", &self.full_name);
    let phone = v.required("phone", &self.phone);
    let car_make = v.required("carMake", &self.car_make);
    let car_model = v.required("carModel", &self.car_model);
    let car_year = v.required_year("carYear", &self.car_year);
    let expected_price = v.optional_number("expectedPrice", &self.expected_price);
    let mileage = v.optional_number("mileage", &self.mileage);

    v.finish(NewSellCarOrder {
      customer_name,
      phone,
      email: non_blank(&self.email),
      car_make,
      car_model,
      car_year,
      expected_price,
      mileage,
      condition: non_blank(&self.condition),
      transmission: non_blank(&self.transmission),
      vin: non_blank(&self.vin),
      city: non_blank(&self.city),
      notes: non_blank(&self.notes),
    })
  }
}

// --- Status update ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateRequest {
  #[serde(default, deserialize_with = "lenient_string")]
  pub status: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
  pub status: OrderStatus,
  pub description: Option<String>,
}

impl StatusUpdateRequest {
  pub fn validate(&self) -> Result<StatusChange, ValidationError> {
    let mut v = Validator::new();
    let status = match non_blank(&self.status) {
      None => {
        v.add("status", "is required");
        None
      }
      Some(raw) => {
        let parsed = OrderStatus::parse(&raw.to_lowercase());
        if parsed.is_none() {
          v.add(
            "status",
            "must be one of pending, confirmed, processing, shipped, delivered, cancelled",
          );
        }
        parsed
      }
    };
    let description = non_blank(&self.description);
    v.finish(())?;
    match status {
      Some(status) => Ok(StatusChange { status, description }),
      None => Err(ValidationError::single("status", "is required")),
    }
  }
}

// --- Pricing ---

/// Longest warranty accepted on a quote, one hundred years.
pub const MAX_WARRANTY_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
  #[serde(default, deserialize_with = "lenient_string")]
  pub price: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub warranty: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub warranty_duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingUpdate {
  pub price: f64,
  /// Warranty length in days, `None` when no warranty is granted.
  pub warranty_days: Option<u32>,
}

impl PricingRequest {
  pub fn validate(&self) -> Result<PricingUpdate, ValidationError> {
    let mut v = Validator::new();
    let price = match non_blank(&self.price).map(|raw| raw.parse::<f64>()) {
      None => {
        v.add("price", "is required");
        0.0
      }
      Some(Ok(p)) if p.is_finite() && p > 0.0 => p,
      Some(_) => {
        v.add("price", "must be a number greater than zero");
        0.0
      }
    };

    let warranty = non_blank(&self.warranty)
      .map(|raw| matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
      .unwrap_or(false);

    let warranty_days = if warranty {
      match non_blank(&self.warranty_duration).map(|raw| raw.parse::<u32>()) {
        Some(Ok(days)) if (1..=MAX_WARRANTY_DAYS).contains(&days) => Some(days),
        Some(Ok(days)) if days > MAX_WARRANTY_DAYS => {
          v.add("warrantyDuration", format!("must be at most {MAX_WARRANTY_DAYS} days"));
          None
        }
        None => {
          v.add("warrantyDuration", "is required when warranty is enabled");
          None
        }
        Some(_) => {
          v.add("warrantyDuration", "must be a positive whole number of days");
          None
        }
      }
    } else {
      None
    };

    v.finish(PricingUpdate { price, warranty_days })
  }
}

// --- Delivery hand-off ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffRequest {
  #[serde(default)]
  pub order_ids: Vec<String>,
  #[serde(default, alias = "deliveryPhone", deserialize_with = "lenient_string")]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Handoff {
  pub order_keys: Vec<String>,
  /// Falls back to the configured delivery number when absent.
  pub phone: Option<String>,
}

impl HandoffRequest {
  pub fn validate(&self) -> Result<Handoff, ValidationError> {
    let mut v = Validator::new();
    let order_keys: Vec<String> = self
      .order_ids
      .iter()
      .map(|id| id.trim().to_string())
      .filter(|id| !id.is_empty())
      .collect();
    if order_keys.is_empty() {
      v.add("orderIds", "must contain at least one order");
    }
    v.finish(Handoff {
      order_keys,
      phone: non_blank(&self.phone),
    })
  }
}

// --- Bulk broadcast ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
  #[serde(default)]
  pub recipients: Vec<String>,
  #[serde(default)]
  pub template_sid: Option<String>,
  #[serde(default)]
  pub variables: BTreeMap<String, String>,
  #[serde(default)]
  pub body: Option<String>,
}

impl BroadcastRequest {
  pub fn validate(&self) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    if self.recipients.iter().all(|r| r.trim().is_empty()) {
      v.add("recipients", "must contain at least one phone number");
    }
    v.finish(())
  }
}
