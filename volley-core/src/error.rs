use thiserror::Error;

use crate::types::ItemId;

/// What a single operation fails with.
///
/// Only plain data is kept: the engine turns this into a [`crate::Failure`]
/// the moment the operation settles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationError {
    pub message: String,
    pub status: Option<u16>,
    /// Connection refused/reset, timeout, DNS failure.
    pub network: bool,
}

impl OperationError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            network: false,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            network: true,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            network: false,
        }
    }
}

impl From<String> for OperationError {
    fn from(message: String) -> Self {
        Self::other(message)
    }
}

impl From<&str> for OperationError {
    fn from(message: &str) -> Self {
        Self::other(message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("batch size must be greater than zero")]
    ZeroBatchSize,
    #[error("invalid value for {key}: {value:?} (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Raised by the engine only for caller programming errors; operation
/// failures are always captured in the result instead.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("duplicate work item id: {0}")]
    DuplicateId(ItemId),
}
