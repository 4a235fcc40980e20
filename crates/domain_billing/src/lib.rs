//! Billing Domain
//!
//! Invoices are issued against policies and settled by payments. The
//! reconciliation rule is the heart of this crate:
//!
//! > An invoice is `pagada` iff the sum of its *completed* payments reaches
//! > or exceeds its amount. Settling an invoice promotes its policy from
//! > `cotizacion`/`pendiente_pago` to `activa`.
//!
//! Partial payments never change the policy status. Payments that would push
//! the completed total above the invoice amount are rejected, as are payments
//! on invoices that are already paid or cancelled.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{reconcile, check_payment, Payment, PaymentMethod};
//!
//! check_payment(&invoice, &payments, dec!(600))?;
//! let payment = Payment::new(invoice.id, dec!(600), PaymentMethod::Efectivo)?;
//! payments.push(payment);
//! let outcome = reconcile(&mut invoice, &payments);
//! ```

pub mod invoice;
pub mod payment;
pub mod reconciliation;
pub mod qr;
pub mod error;
pub mod ports;

pub use invoice::{Invoice, InvoiceStatus, DEFAULT_CONCEPT};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use reconciliation::{check_payment, completed_total, outstanding_balance, reconcile, Reconciliation};
pub use qr::QrPayload;
pub use error::BillingError;
pub use ports::BillingPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockBillingPort;
