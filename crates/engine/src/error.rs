//! The module contains the errors the engine can return.
//!
//! - [`Validation`] a required field is missing or invalid; nothing was written.
//! - [`Containment`] a category budget would exceed its sector's manual budget.
//! - [`InvalidTransition`] the import is not in a state that allows the operation.
//! - [`KeyNotFound`] the referenced row does not exist (not retryable).
//! - [`UpstreamFeed`] the bank feed failed; already imported pages are kept.
//!
//! Duplicate feed deliveries are never errors, they are counted as skipped.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Containment`]: EngineError::Containment
//!  [`InvalidTransition`]: EngineError::InvalidTransition
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`UpstreamFeed`]: EngineError::UpstreamFeed
use sea_orm::DbErr;
use thiserror::Error;

use crate::Money;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Budget exceeds sector \"{sector}\" limit of {limit}")]
    Containment { sector: String, limit: Money },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Bank feed error (retry later): {0}")]
    UpstreamFeed(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Whether retrying the same call unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamFeed(_) | Self::Database(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (
                Self::Containment {
                    sector: a,
                    limit: la,
                },
                Self::Containment {
                    sector: b,
                    limit: lb,
                },
            ) => a == b && la == lb,
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::UpstreamFeed(a), Self::UpstreamFeed(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
