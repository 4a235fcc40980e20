//! Claims domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::CoreError;
use domain_policy::PolicyStatus;

use crate::claim::ClaimStatus;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: ClaimStatus, to: ClaimStatus },

    #[error("Claims can only be reported against active policies (policy is {0})")]
    PolicyNotActive(PolicyStatus),

    #[error("Approved amount {approved} exceeds claimed amount {claimed}")]
    ApprovedExceedsClaimed { approved: Decimal, claimed: Decimal },

    #[error("Claim is already closed ({0})")]
    ClaimClosed(ClaimStatus),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClaimError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClaimError::Validation(message.into())
    }
}
