//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidMovement`] thrown when a movement fails commit validation.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`Storage`] thrown when the backing record store fails.
//!
//!  [`InvalidMovement`]: EngineError::InvalidMovement
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Storage`]: EngineError::Storage
use thiserror::Error;

use crate::store::StoreError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid movement: {0}")]
    InvalidMovement(String),
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),
    #[error("Invalid user: {0}")]
    InvalidUser(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidQuantity(a), Self::InvalidQuantity(b)) => a == b,
            (Self::InvalidMovement(a), Self::InvalidMovement(b)) => a == b,
            (Self::InvalidAsset(a), Self::InvalidAsset(b)) => a == b,
            (Self::InvalidUser(a), Self::InvalidUser(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            (Self::Storage(a), Self::Storage(b)) => a == b,
            _ => false,
        }
    }
}
