//! Policy domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::CoreError;

use crate::policy::PolicyStatus;

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Invalid state transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: PolicyStatus,
        to: PolicyStatus,
    },

    /// Cancellation is only legal while quoting
    #[error("Only policies in quoting status can be cancelled (current status: {0})")]
    NotCancellable(PolicyStatus),

    /// Terms are frozen once the policy leaves quoting
    #[error("Policy terms can only be edited while quoting (current status: {0})")]
    NotModifiable(PolicyStatus),

    /// Beneficiary shares would exceed the whole benefit
    #[error("Beneficiary shares would exceed 100%: {assigned}% already assigned, {requested}% requested")]
    ShareExceeded {
        assigned: Decimal,
        requested: Decimal,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PolicyError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PolicyError::Validation(message.into())
    }
}
