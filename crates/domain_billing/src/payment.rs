//! Payment processing
//!
//! Payments are append-only. The only status change after creation is the
//! confirmation of a pending QR payment.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, InvoiceId, PaymentId};

use crate::error::BillingError;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer
    Transferencia,
    /// Credit or debit card
    Tarjeta,
    Efectivo,
    Cheque,
    /// Dynamic QR code
    Qr,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Transferencia => "transferencia",
            PaymentMethod::Tarjeta => "tarjeta",
            PaymentMethod::Efectivo => "efectivo",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Qr => "qr",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transferencia" => Ok(PaymentMethod::Transferencia),
            "tarjeta" => Ok(PaymentMethod::Tarjeta),
            "efectivo" => Ok(PaymentMethod::Efectivo),
            "cheque" => Ok(PaymentMethod::Cheque),
            "qr" => Ok(PaymentMethod::Qr),
            other => Err(CoreError::unknown_value("payment method", other)),
        }
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "completado")]
    Completed,
    #[serde(rename = "fallido")]
    Failed,
    #[serde(rename = "reembolsado")]
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pendiente",
            PaymentStatus::Completed => "completado",
            PaymentStatus::Failed => "fallido",
            PaymentStatus::Refunded => "reembolsado",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(PaymentStatus::Pending),
            "completado" => Ok(PaymentStatus::Completed),
            "fallido" => Ok(PaymentStatus::Failed),
            "reembolsado" => Ok(PaymentStatus::Refunded),
            other => Err(CoreError::unknown_value("payment status", other)),
        }
    }
}

/// A payment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Invoice being paid
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub method: PaymentMethod,
    /// External reference (bank ref, transaction ID)
    pub reference: Option<String>,
    pub status: PaymentStatus,
    pub description: Option<String>,
}

impl Payment {
    /// Creates a completed payment
    ///
    /// # Errors
    ///
    /// Returns a validation error if the amount is not positive
    pub fn new(invoice_id: InvoiceId, amount: Decimal, method: PaymentMethod) -> Result<Self, BillingError> {
        if amount <= Decimal::ZERO {
            return Err(BillingError::validation("payment amount must be positive"));
        }

        Ok(Self {
            id: PaymentId::new_v7(),
            invoice_id,
            amount,
            paid_at: Utc::now(),
            method,
            reference: None,
            status: PaymentStatus::Completed,
            description: None,
        })
    }

    /// Creates a payment awaiting confirmation
    pub fn pending(invoice_id: InvoiceId, amount: Decimal, method: PaymentMethod) -> Result<Self, BillingError> {
        let mut payment = Self::new(invoice_id, amount, method)?;
        payment.status = PaymentStatus::Pending;
        Ok(payment)
    }

    /// Sets the external reference
    pub fn with_reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference.filter(|r| !r.trim().is_empty());
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Marks a pending payment as completed
    ///
    /// # Errors
    ///
    /// Returns error if the payment is not pending
    pub fn confirm(&mut self) -> Result<(), BillingError> {
        if self.status != PaymentStatus::Pending {
            return Err(BillingError::InvalidPaymentTransition {
                from: self.status,
                to: PaymentStatus::Completed,
            });
        }
        self.status = PaymentStatus::Completed;
        self.paid_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_payment_defaults_to_completed() {
        let payment = Payment::new(InvoiceId::new(), dec!(600), PaymentMethod::Efectivo).unwrap();
        assert!(payment.is_completed());
        assert!(Payment::new(InvoiceId::new(), dec!(0), PaymentMethod::Efectivo).is_err());
    }

    #[test]
    fn test_confirm_only_pending() {
        let mut payment = Payment::pending(InvoiceId::new(), dec!(600), PaymentMethod::Qr).unwrap();
        payment.confirm().unwrap();
        assert!(payment.is_completed());
        assert!(matches!(
            payment.confirm(),
            Err(BillingError::InvalidPaymentTransition { from: PaymentStatus::Completed, .. })
        ));
    }

    #[test]
    fn test_blank_reference_is_dropped() {
        let payment = Payment::new(InvoiceId::new(), dec!(1), PaymentMethod::Cheque)
            .unwrap()
            .with_reference(Some("  ".into()));
        assert!(payment.reference.is_none());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_value(PaymentMethod::Transferencia).unwrap(), "transferencia");
        assert_eq!(serde_json::to_value(PaymentStatus::Completed).unwrap(), "completado");
        assert_eq!("tarjeta".parse::<PaymentMethod>().unwrap(), PaymentMethod::Tarjeta);
    }
}
