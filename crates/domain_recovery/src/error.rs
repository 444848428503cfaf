//! Recovery domain errors

use core_kernel::MoneyError;
use thiserror::Error;

/// Errors that can occur in the recovery domain
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// A reconciliation precondition was violated
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced bill, payment, or agent does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Disallowed clearance transition
    #[error("Invalid clearance transition: {from} -> {to}")]
    InvalidClearanceTransition { from: String, to: String },

    /// Caller lacks the capability for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The recomputed balance diverged from the invariant. Indicates a
    /// missed recomputation elsewhere; never silently corrected.
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// Money arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl RecoveryError {
    pub fn validation(message: impl Into<String>) -> Self {
        RecoveryError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RecoveryError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        RecoveryError::Forbidden(message.into())
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        RecoveryError::Consistency(message.into())
    }
}
