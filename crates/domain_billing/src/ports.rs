//! Billing Domain Ports
//!
//! `BillingPort` persists invoices and payments. It also owns the one
//! multi-entity write that must be atomic: issuing a policy together with
//! its paid invoice and completed payment.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, InvoiceId, PaymentId, PolicyId, PortError};
use domain_policy::Policy;

use crate::invoice::Invoice;
use crate::payment::Payment;

/// The port trait for billing domain operations
#[async_trait]
pub trait BillingPort: DomainPort + HealthCheckable {
    // ========================================================================
    // Invoices
    // ========================================================================

    /// Stores a new invoice
    ///
    /// Returns `PortError::Conflict` if the invoice number is taken.
    async fn create_invoice(&self, invoice: &Invoice) -> Result<(), PortError>;

    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Persists the invoice status
    async fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError>;

    /// All invoices, or only those of one policy
    async fn list_invoices(&self, policy_id: Option<PolicyId>) -> Result<Vec<Invoice>, PortError>;

    // ========================================================================
    // Payments
    // ========================================================================

    async fn record_payment(&self, payment: &Payment) -> Result<(), PortError>;

    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError>;

    /// Persists the payment status
    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError>;

    /// All payments, or only those of one invoice
    async fn list_payments(&self, invoice_id: Option<InvoiceId>) -> Result<Vec<Payment>, PortError>;

    // ========================================================================
    // Issuance
    // ========================================================================

    /// Stores an active policy, its paid invoice and the completed payment in
    /// one transaction; nothing is stored if any insert fails
    async fn issue_policy_with_settlement(
        &self,
        policy: &Policy,
        invoice: &Invoice,
        payment: &Payment,
    ) -> Result<(), PortError>;
}

/// Mock implementation of BillingPort for testing
///
/// Policies created through `issue_policy_with_settlement` land in the
/// shared [`MockPolicyPort`](domain_policy::MockPolicyPort).
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;
    use domain_policy::{MockPolicyPort, PolicyPort};

    #[derive(Debug, Default)]
    struct State {
        invoices: BTreeMap<InvoiceId, Invoice>,
        payments: BTreeMap<PaymentId, Payment>,
    }

    impl State {
        fn check_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
            if self
                .invoices
                .values()
                .any(|i| i.invoice_number == invoice.invoice_number)
            {
                return Err(PortError::conflict(format!(
                    "invoice number '{}' already exists",
                    invoice.invoice_number
                )));
            }
            Ok(())
        }
    }

    /// In-memory mock implementation of BillingPort
    #[derive(Debug, Clone)]
    pub struct MockBillingPort {
        state: Arc<RwLock<State>>,
        policies: MockPolicyPort,
    }

    impl MockBillingPort {
        pub fn new(policies: MockPolicyPort) -> Self {
            Self {
                state: Arc::default(),
                policies,
            }
        }
    }

    impl DomainPort for MockBillingPort {}

    #[async_trait]
    impl HealthCheckable for MockBillingPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-billing-port")
        }
    }

    #[async_trait]
    impl BillingPort for MockBillingPort {
        async fn create_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            state.check_invoice(invoice)?;
            state.invoices.insert(invoice.id, invoice.clone());
            Ok(())
        }

        async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
            self.state
                .read()
                .await
                .invoices
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Invoice", id))
        }

        async fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            match state.invoices.get_mut(&invoice.id) {
                Some(stored) => {
                    *stored = invoice.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Invoice", invoice.id)),
            }
        }

        async fn list_invoices(&self, policy_id: Option<PolicyId>) -> Result<Vec<Invoice>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .invoices
                .values()
                .filter(|i| policy_id.map_or(true, |id| i.policy_id == id))
                .cloned()
                .collect())
        }

        async fn record_payment(&self, payment: &Payment) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if !state.invoices.contains_key(&payment.invoice_id) {
                return Err(PortError::not_found("Invoice", payment.invoice_id));
            }
            state.payments.insert(payment.id, payment.clone());
            Ok(())
        }

        async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
            self.state
                .read()
                .await
                .payments
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Payment", id))
        }

        async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            match state.payments.get_mut(&payment.id) {
                Some(stored) => {
                    *stored = payment.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Payment", payment.id)),
            }
        }

        async fn list_payments(&self, invoice_id: Option<InvoiceId>) -> Result<Vec<Payment>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .payments
                .values()
                .filter(|p| invoice_id.map_or(true, |id| p.invoice_id == id))
                .cloned()
                .collect())
        }

        async fn issue_policy_with_settlement(
            &self,
            policy: &Policy,
            invoice: &Invoice,
            payment: &Payment,
        ) -> Result<(), PortError> {
            // billing lock stays held across the policy insert
            let mut state = self.state.write().await;
            state.check_invoice(invoice)?;
            self.policies.create_policy(policy).await?;
            state.invoices.insert(invoice.id, invoice.clone());
            state.payments.insert(payment.id, payment.clone());
            Ok(())
        }
    }
}
