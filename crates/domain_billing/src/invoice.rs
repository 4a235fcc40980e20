//! Invoice management
//!
//! Invoices are issued against a policy for a single amount. They start
//! `pendiente` with a due window, or `pagada` on the immediate-payment path.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, InvoiceId, PolicyId};

use crate::error::BillingError;

pub const DEFAULT_CONCEPT: &str = "Prima anual de seguro";

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "pagada")]
    Paid,
    /// Past due date and unpaid
    #[serde(rename = "vencida")]
    Expired,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pendiente",
            InvoiceStatus::Paid => "pagada",
            InvoiceStatus::Expired => "vencida",
            InvoiceStatus::Cancelled => "cancelada",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(InvoiceStatus::Pending),
            "pagada" => Ok(InvoiceStatus::Paid),
            "vencida" => Ok(InvoiceStatus::Expired),
            "cancelada" => Ok(InvoiceStatus::Cancelled),
            other => Err(CoreError::unknown_value("invoice status", other)),
        }
    }
}

/// An invoice for a policy premium
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub policy_id: PolicyId,
    /// Invoice number (human-readable, unique)
    pub invoice_number: String,
    pub amount: Decimal,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub concept: String,
}

impl Invoice {
    /// Creates a pending invoice
    ///
    /// # Errors
    ///
    /// Returns a validation error if the amount is not positive or the due
    /// date precedes the issue date.
    pub fn new(
        policy_id: PolicyId,
        invoice_number: String,
        amount: Decimal,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        concept: Option<String>,
    ) -> Result<Self, BillingError> {
        if amount <= Decimal::ZERO {
            return Err(BillingError::validation("invoice amount must be positive"));
        }
        if due_date < issue_date {
            return Err(BillingError::validation("due date cannot precede issue date"));
        }

        Ok(Self {
            id: InvoiceId::new_v7(),
            policy_id,
            invoice_number,
            amount,
            issue_date,
            due_date,
            status: InvoiceStatus::Pending,
            concept: concept
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONCEPT.to_string()),
        })
    }

    /// Pending invoice due `due_days` after issue
    pub fn with_due_window(
        policy_id: PolicyId,
        invoice_number: String,
        amount: Decimal,
        issue_date: NaiveDate,
        due_days: u32,
    ) -> Result<Self, BillingError> {
        let due_date = issue_date
            .checked_add_days(Days::new(u64::from(due_days)))
            .ok_or_else(|| BillingError::validation("due date out of range"))?;
        Self::new(policy_id, invoice_number, amount, issue_date, due_date, None)
    }

    /// Invoice issued and paid on the same day
    pub fn settled_at_issue(
        policy_id: PolicyId,
        invoice_number: String,
        amount: Decimal,
        issue_date: NaiveDate,
    ) -> Result<Self, BillingError> {
        let mut invoice = Self::new(policy_id, invoice_number, amount, issue_date, issue_date, None)?;
        invoice.status = InvoiceStatus::Paid;
        Ok(invoice)
    }

    /// Replaces the number after a uniqueness conflict; only before first save
    pub fn renumber(&mut self, invoice_number: String) {
        self.invoice_number = invoice_number;
    }

    /// Pending and expired invoices can still be paid
    pub fn accepts_payments(&self) -> bool {
        matches!(self.status, InvoiceStatus::Pending | InvoiceStatus::Expired)
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    /// Checks if invoice is past its due date without being settled
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date && self.accepts_payments()
    }

    pub(crate) fn mark_paid(&mut self) {
        self.status = InvoiceStatus::Paid;
    }
}
