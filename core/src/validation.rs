// core/src/validation.rs

//! Field-level validation shared by every request DTO.
//!
//! Validators collect *all* violations before failing so a client can fix a
//! form in one round trip.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
  pub field: String,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
  pub violations: Vec<FieldViolation>,
}

impl ValidationError {
  pub fn single(field: &str, message: impl Into<String>) -> Self {
    Self {
      violations: vec![FieldViolation {
        field: field.to_string(),
        message: message.into(),
      }],
    }
  }

  pub fn fields(&self) -> Vec<&str> {
    self.violations.iter().map(|v| v.field.as_str()).collect()
  }

  pub fn has_field(&self, field: &str) -> bool {
    self.violations.iter().any(|v| v.field == field)
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Validation failed: ")?;
    for (idx, v) in self.violations.iter().enumerate() {
      if idx > 0 {
        write!(f, "; ")?;
      }
      write!(f, "{} {}", v.field, v.message)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationError {}

/// Accumulates violations while a DTO is being checked.
#[derive(Debug, Default)]
pub struct Validator {
  violations: Vec<FieldViolation>,
}

impl Validator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.violations.push(FieldViolation {
      field: field.to_string(),
      message: message.into(),
    });
  }

  /// Returns the trimmed value, recording a violation when it is absent or blank.
  pub fn required(&mut self, field: &str, value: &Option<String>) -> String {
    match non_blank(value) {
      Some(v) => v,
      None => {
        self.add(field, "is required");
        String::new()
      }
    }
  }

  pub fn required_year(&mut self, field: &str, value: &Option<String>) -> i32 {
    match non_blank(value) {
      None => {
        self.add(field, "is required");
        0
      }
      Some(raw) => match raw.parse::<i32>() {
        Ok(year) if (1900..=2100).contains(&year) => year,
        _ => {
          self.add(field, "must be a year between 1900 and 2100");
          0
        }
      },
    }
  }

  pub fn optional_number(&mut self, field: &str, value: &Option<String>) -> Option<f64> {
    let raw = non_blank(value)?;
    match raw.parse::<f64>() {
      Ok(n) if n.is_finite() && n >= 0.0 => Some(n),
      _ => {
        self.add(field, "must be a non-negative number");
        None
      }
    }
  }

  /// Parses an optional enum-like field with `parse`, recording a violation on failure.
  pub fn optional_choice<T>(
    &mut self,
    field: &str,
    value: &Option<String>,
    parse: impl FnOnce(&str) -> Option<T>,
    allowed: &str,
  ) -> Option<T> {
    let raw = non_blank(value)?;
    match parse(&raw.to_lowercase()) {
      Some(v) => Some(v),
      None => {
        self.add(field, format!("must be one of {allowed}"));
        None
      }
    }
  }

  pub fn finish<T>(self, value: T) -> Result<T, ValidationError> {
    if self.violations.is_empty() {
      Ok(value)
    } else {
      Err(ValidationError {
        violations: self.violations,
      })
    }
  }
}

pub fn non_blank(value: &Option<String>) -> Option<String> {
  value
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}

/// Accepts a JSON string, number or boolean and keeps it as text.
///
/// Multipart forms deliver every field as text while JSON clients send
/// numbers, so DTO fields are kept as `Option<String>` and parsed during
/// validation.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(match value {
    None | Some(serde_json::Value::Null) => None,
    Some(serde_json::Value::String(s)) => Some(s),
    Some(serde_json::Value::Number(n)) => Some(n.to_string()),
    Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
    Some(other) => Some(other.to_string()),
  })
}
