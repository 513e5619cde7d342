// core/src/lifecycle/transitions.rs

use crate::error::{DeskError, DeskResult};
use crate::model::OrderStatus;

/// Which status changes an update may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
  /// Any status may follow any other.
  #[default]
  Permissive,
  /// pending → confirmed → processing → shipped → delivered, and cancelled
  /// from any non-terminal status. Re-cancelling is allowed.
  Strict,
}

impl TransitionPolicy {
  pub fn parse(raw: &str) -> Option<Self> {
    match raw.trim().to_ascii_lowercase().as_str() {
      "permissive" => Some(TransitionPolicy::Permissive),
      "strict" => Some(TransitionPolicy::Strict),
      _ => None,
    }
  }

  pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    match self {
      TransitionPolicy::Permissive => true,
      TransitionPolicy::Strict => matches!(
        (from, to),
        (Pending, Confirmed)
          | (Confirmed, Processing)
          | (Processing, Shipped)
          | (Shipped, Delivered)
          | (Cancelled, Cancelled)
      ) || (to == Cancelled && !from.is_terminal()),
    }
  }

  pub fn check(&self, from: OrderStatus, to: OrderStatus) -> DeskResult<()> {
    if self.allows(from, to) {
      Ok(())
    } else {
      Err(DeskError::InvalidTransition { from, to })
    }
  }
}
