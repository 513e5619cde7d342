// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::model::OrderStatus;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum DeskError {
    /// One or more request fields were missing or malformed. Nothing was mutated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Rejected by the configured transition policy.
    #[error("Order cannot move from '{from}' to '{to}'")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The primary store could not complete an operation.
    #[error("Storage operation '{operation}' failed. Source: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: AnyhowError,
    },

    #[error("Notification channel '{channel}' failed: {message}")]
    Notification { channel: String, message: String },

    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Backup log error: {0}")]
    Backup(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeskError {
    pub fn storage(operation: &'static str, source: impl Into<AnyhowError>) -> Self {
        DeskError::Storage {
            operation,
            source: source.into(),
        }
    }

    pub fn order_not_found(key: impl ToString) -> Self {
        DeskError::NotFound {
            entity: "order",
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DeskError::NotFound { .. })
    }
}

impl From<AnyhowError> for DeskError {
    fn from(err: AnyhowError) -> Self {
        DeskError::Internal(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(err: serde_json::Error) -> Self {
        DeskError::Internal(format!("serialization failed: {err}"))
    }
}

pub type DeskResult<T, E = DeskError> = std::result::Result<T, E>;
