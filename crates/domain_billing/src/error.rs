//! Billing domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::CoreError;

use crate::invoice::InvoiceStatus;
use crate::payment::PaymentStatus;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Invoice no longer accepts payments
    #[error("Invoice {number} is {status} and does not accept payments")]
    InvoiceClosed {
        number: String,
        status: InvoiceStatus,
    },

    /// Payment larger than what is still owed
    #[error("Payment of {attempted} exceeds the outstanding balance of {outstanding}")]
    Overpayment {
        outstanding: Decimal,
        attempted: Decimal,
    },

    /// Payment status change not allowed
    #[error("Payment cannot move from {from} to {to}")]
    InvalidPaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }
}
