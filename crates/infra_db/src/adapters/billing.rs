//! PostgreSQL Billing Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, PaymentId, PolicyId, PortError,
};
use domain_billing::{BillingPort, Invoice, Payment};
use domain_policy::Policy;

use crate::repositories::BillingRepository;

/// PostgreSQL-backed implementation of the BillingPort trait
#[derive(Debug, Clone)]
pub struct PostgresBillingAdapter {
    repository: BillingRepository,
    pool: PgPool,
}

impl PostgresBillingAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BillingRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresBillingAdapter {}

#[async_trait]
impl HealthCheckable for PostgresBillingAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-billing-adapter").await
    }
}

#[async_trait]
impl BillingPort for PostgresBillingAdapter {
    #[instrument(skip(self, invoice), fields(invoice_number = %invoice.invoice_number, policy_id = %invoice.policy_id))]
    async fn create_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
        debug!("Inserting invoice");
        Ok(self.repository.insert_invoice(invoice).await?)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        Ok(self.repository.get_invoice(id).await?)
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id, status = %invoice.status.as_str()))]
    async fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
        debug!("Updating invoice");
        Ok(self.repository.update_invoice(invoice).await?)
    }

    #[instrument(skip(self))]
    async fn list_invoices(&self, policy_id: Option<PolicyId>) -> Result<Vec<Invoice>, PortError> {
        Ok(self.repository.find_invoices(policy_id).await?)
    }

    #[instrument(skip(self, payment), fields(invoice_id = %payment.invoice_id, amount = %payment.amount))]
    async fn record_payment(&self, payment: &Payment) -> Result<(), PortError> {
        debug!("Inserting payment");
        Ok(self.repository.insert_payment(payment).await?)
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        Ok(self.repository.get_payment(id).await?)
    }

    #[instrument(skip(self, payment), fields(payment_id = %payment.id, status = %payment.status.as_str()))]
    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
        debug!("Updating payment");
        Ok(self.repository.update_payment(payment).await?)
    }

    #[instrument(skip(self))]
    async fn list_payments(&self, invoice_id: Option<InvoiceId>) -> Result<Vec<Payment>, PortError> {
        Ok(self.repository.find_payments(invoice_id).await?)
    }

    #[instrument(
        skip(self, policy, invoice, payment),
        fields(policy_number = %policy.policy_number(), invoice_number = %invoice.invoice_number)
    )]
    async fn issue_policy_with_settlement(
        &self,
        policy: &Policy,
        invoice: &Invoice,
        payment: &Payment,
    ) -> Result<(), PortError> {
        debug!("Issuing policy with settled invoice");
        Ok(self
            .repository
            .insert_settled_policy(policy, invoice, payment)
            .await?)
    }
}
