//! Invoice/payment reconciliation
//!
//! Only completed payments count towards an invoice. Pending, failed and
//! refunded payments are ignored by every function here.

use rust_decimal::Decimal;

use domain_policy::Policy;

use crate::error::BillingError;
use crate::invoice::Invoice;
use crate::payment::Payment;

/// Result of reconciling an invoice against its payments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The completed total reached the amount; the invoice is now paid
    Settled,
    /// Still owed
    Outstanding(Decimal),
    /// Invoice was already paid or cancelled
    Unchanged,
}

impl Reconciliation {
    pub fn is_settled(&self) -> bool {
        matches!(self, Reconciliation::Settled)
    }

    /// Applies a settlement to the invoice's policy
    ///
    /// Returns true if the policy status changed.
    pub fn apply_to(&self, policy: &mut Policy) -> bool {
        self.is_settled() && policy.settle()
    }
}

/// Sum of the completed payments of one invoice
pub fn completed_total(invoice: &Invoice, payments: &[Payment]) -> Decimal {
    payments
        .iter()
        .filter(|p| p.invoice_id == invoice.id && p.is_completed())
        .map(|p| p.amount)
        .sum()
}

/// What is still owed on the invoice, never negative
pub fn outstanding_balance(invoice: &Invoice, payments: &[Payment]) -> Decimal {
    (invoice.amount - completed_total(invoice, payments)).max(Decimal::ZERO)
}

/// Checks that a new completed payment of `amount` is acceptable
///
/// # Errors
///
/// - `InvoiceClosed` if the invoice is paid or cancelled
/// - `Overpayment` if `amount` exceeds the outstanding balance
pub fn check_payment(invoice: &Invoice, payments: &[Payment], amount: Decimal) -> Result<(), BillingError> {
    if !invoice.accepts_payments() {
        return Err(BillingError::InvoiceClosed {
            number: invoice.invoice_number.clone(),
            status: invoice.status,
        });
    }
    let outstanding = outstanding_balance(invoice, payments);
    if amount > outstanding {
        return Err(BillingError::Overpayment {
            outstanding,
            attempted: amount,
        });
    }
    Ok(())
}

/// Marks the invoice paid once completed payments cover it
pub fn reconcile(invoice: &mut Invoice, payments: &[Payment]) -> Reconciliation {
    if !invoice.accepts_payments() {
        return Reconciliation::Unchanged;
    }
    let paid = completed_total(invoice, payments);
    if paid >= invoice.amount {
        invoice.mark_paid();
        Reconciliation::Settled
    } else {
        Reconciliation::Outstanding(invoice.amount - paid)
    }
}
