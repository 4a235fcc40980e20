//! Billing repository implementation
//!
//! Invoices and payments, plus the settlement transaction that issues a
//! policy together with its paid invoice and completed payment.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use core_kernel::{InvoiceId, PaymentId, PolicyId};
use domain_billing::{Invoice, Payment};
use domain_policy::Policy;

use crate::error::DatabaseError;
use crate::repositories::policy::insert_policy;

const INVOICE_COLUMNS: &str =
    "id, policy_id, invoice_number, amount, issue_date, due_date, status, concept";

const PAYMENT_COLUMNS: &str =
    "id, invoice_id, amount, paid_at, method, reference, status, description";

/// Repository for invoices and payments
///
/// All multi-row writes run inside a single transaction.
#[derive(Debug, Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    /// Creates a new BillingRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Invoices
    // ========================================================================

    pub async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), DatabaseError> {
        insert_invoice(&self.pool, invoice).await
    }

    pub async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, DatabaseError> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Invoice", id))?
            .try_into()
    }

    pub async fn update_invoice(&self, invoice: &Invoice) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE invoices SET amount = $2, due_date = $3, status = $4, concept = $5 WHERE id = $1",
        )
        .bind(*invoice.id.as_uuid())
        .bind(invoice.amount)
        .bind(invoice.due_date)
        .bind(invoice.status.as_str())
        .bind(&invoice.concept)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Invoice", invoice.id));
        }
        Ok(())
    }

    pub async fn find_invoices(&self, policy_id: Option<PolicyId>) -> Result<Vec<Invoice>, DatabaseError> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices \
             WHERE $1::uuid IS NULL OR policy_id = $1 \
             ORDER BY issue_date, id"
        );
        sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(policy_id.map(Uuid::from))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Invoice::try_from)
            .collect()
    }

    // ========================================================================
    // Payments
    // ========================================================================

    /// Inserts a payment; a missing invoice surfaces as NotFound
    pub async fn insert_payment(&self, payment: &Payment) -> Result<(), DatabaseError> {
        match insert_payment(&self.pool, payment).await {
            Err(DatabaseError::ForeignKeyViolation(_)) => {
                Err(DatabaseError::not_found("Invoice", payment.invoice_id))
            }
            other => other,
        }
    }

    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, DatabaseError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Payment", id))?
            .try_into()
    }

    pub async fn update_payment(&self, payment: &Payment) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE payments SET status = $2, reference = $3, description = $4, paid_at = $5 WHERE id = $1",
        )
        .bind(*payment.id.as_uuid())
        .bind(payment.status.as_str())
        .bind(&payment.reference)
        .bind(&payment.description)
        .bind(payment.paid_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Payment", payment.id));
        }
        Ok(())
    }

    pub async fn find_payments(&self, invoice_id: Option<InvoiceId>) -> Result<Vec<Payment>, DatabaseError> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE $1::uuid IS NULL OR invoice_id = $1 \
             ORDER BY paid_at, id"
        );
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(invoice_id.map(Uuid::from))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    // ========================================================================
    // Settlement
    // ========================================================================

    /// Inserts policy, invoice and payment in one transaction
    ///
    /// The transaction is dropped without commit on the first failure, which
    /// rolls every insert back.
    pub async fn insert_settled_policy(
        &self,
        policy: &Policy,
        invoice: &Invoice,
        payment: &Payment,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        insert_policy(&mut *tx, policy).await?;
        insert_invoice(&mut *tx, invoice).await?;
        insert_payment(&mut *tx, payment).await?;

        tx.commit().await?;
        Ok(())
    }
}

async fn insert_invoice<'e>(executor: impl PgExecutor<'e>, invoice: &Invoice) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, policy_id, invoice_number, amount, issue_date, due_date, status, concept
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(*invoice.id.as_uuid())
    .bind(*invoice.policy_id.as_uuid())
    .bind(&invoice.invoice_number)
    .bind(invoice.amount)
    .bind(invoice.issue_date)
    .bind(invoice.due_date)
    .bind(invoice.status.as_str())
    .bind(&invoice.concept)
    .execute(executor)
    .await?;
    Ok(())
}

async fn insert_payment<'e>(executor: impl PgExecutor<'e>, payment: &Payment) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, invoice_id, amount, paid_at, method, reference, status, description
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(*payment.id.as_uuid())
    .bind(*payment.invoice_id.as_uuid())
    .bind(payment.amount)
    .bind(payment.paid_at)
    .bind(payment.method.as_str())
    .bind(&payment.reference)
    .bind(payment.status.as_str())
    .bind(&payment.description)
    .execute(executor)
    .await?;
    Ok(())
}

// =============================================================================
// Row types
// =============================================================================

/// Database row for an invoice
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub invoice_number: String,
    pub amount: Decimal,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub concept: String,
}

/// Database row for a payment
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub method: String,
    pub reference: Option<String>,
    pub status: String,
    pub description: Option<String>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DatabaseError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            id: InvoiceId::from_uuid(row.id),
            policy_id: PolicyId::from_uuid(row.policy_id),
            invoice_number: row.invoice_number,
            amount: row.amount,
            issue_date: row.issue_date,
            due_date: row.due_date,
            status: row
                .status
                .parse()
                .map_err(|e| DatabaseError::invalid_data("invoices.status", e))?,
            concept: row.concept,
        })
    }
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DatabaseError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            invoice_id: InvoiceId::from_uuid(row.invoice_id),
            amount: row.amount,
            paid_at: row.paid_at,
            method: row
                .method
                .parse()
                .map_err(|e| DatabaseError::invalid_data("payments.method", e))?,
            reference: row.reference,
            status: row
                .status
                .parse()
                .map_err(|e| DatabaseError::invalid_data("payments.status", e))?,
            description: row.description,
        })
    }
}
