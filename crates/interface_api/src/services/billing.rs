//! Invoices, payments and reconciliation
//!
//! Every completed payment is followed by a reconciliation of its invoice.
//! When the completed total reaches the invoice amount the invoice becomes
//! `pagada` and a `cotizacion`/`pendiente_pago` policy becomes `activa`.

use std::collections::HashSet;

use chrono::Duration;
use tracing::{info, instrument};

use core_kernel::{InvoiceId, PaymentId, PolicyId, ReferenceNumber};
use domain_billing::{
    check_payment, outstanding_balance, reconcile, Invoice, Payment, PaymentMethod, PaymentStatus,
    QrPayload, Reconciliation,
};
use domain_party::Role;
use domain_policy::Policy;

use crate::dto::billing::{CreateInvoiceRequest, CreatePaymentRequest};
use crate::error::ApiError;
use crate::extract::Actor;
use crate::services::{
    manageable_policy, policy::publish_events, today, viewable_policy, visible_policy_ids, NumberDraws,
};
use crate::AppState;

const STAFF: &[Role] = &[Role::Admin, Role::Agent];

/// A payment with the invoice and policy as reconciliation left them
#[derive(Debug)]
pub struct Recorded {
    pub payment: Payment,
    pub invoice: Invoice,
    pub policy: Policy,
}

/// A pending QR payment and what the payer scans
#[derive(Debug)]
pub struct QrRequest {
    pub payment: Payment,
    pub payload: QrPayload,
}

// ============================================================================
// Invoices
// ============================================================================

pub async fn list_invoices(
    state: &AppState,
    actor: &Actor,
    policy_id: Option<PolicyId>,
) -> Result<Vec<Invoice>, ApiError> {
    if let Some(id) = policy_id {
        viewable_policy(state, actor, id).await?;
    }
    let invoices = state.billing.list_invoices(policy_id).await?;
    Ok(match visible_policy_ids(state, actor).await? {
        None => invoices,
        Some(visible) => invoices
            .into_iter()
            .filter(|i| visible.contains(&i.policy_id))
            .collect(),
    })
}

#[instrument(skip(state, actor, req), fields(policy = %req.poliza))]
pub async fn create_invoice(
    state: &AppState,
    actor: &Actor,
    req: CreateInvoiceRequest,
) -> Result<Invoice, ApiError> {
    actor.require(STAFF)?;
    let policy = manageable_policy(state, actor, req.poliza.into()).await?;

    let amount = req.monto.unwrap_or_else(|| policy.annual_premium());
    let issue_date = req.fecha_emision.unwrap_or_else(today);
    let due_date = req
        .fecha_vencimiento
        .unwrap_or_else(|| issue_date + Duration::days(i64::from(state.config.invoice_due_days)));

    let mut invoice = Invoice::new(
        policy.id(),
        ReferenceNumber::Invoice.generate(),
        amount,
        issue_date,
        due_date,
        req.concepto,
    )?;
    let mut draws = NumberDraws::new(ReferenceNumber::Invoice);
    while let Err(e) = state.billing.create_invoice(&invoice).await {
        invoice.renumber(draws.redraw(e)?);
    }

    info!(invoice_id = %invoice.id, number = %invoice.invoice_number, amount = %invoice.amount, "invoice issued");
    Ok(invoice)
}

// ============================================================================
// Payments
// ============================================================================

/// Loads an invoice whose policy the caller may see
async fn viewable_invoice(state: &AppState, actor: &Actor, id: InvoiceId) -> Result<(Invoice, Policy), ApiError> {
    let invoice = state.billing.get_invoice(id).await?;
    let policy = viewable_policy(state, actor, invoice.policy_id).await?;
    Ok((invoice, policy))
}

pub async fn list_payments(
    state: &AppState,
    actor: &Actor,
    invoice_id: Option<InvoiceId>,
) -> Result<Vec<Payment>, ApiError> {
    if let Some(id) = invoice_id {
        viewable_invoice(state, actor, id).await?;
        return Ok(state.billing.list_payments(Some(id)).await?);
    }

    let payments = state.billing.list_payments(None).await?;
    let Some(visible) = visible_policy_ids(state, actor).await? else {
        return Ok(payments);
    };
    let invoices: HashSet<InvoiceId> = state
        .billing
        .list_invoices(None)
        .await?
        .into_iter()
        .filter(|i| visible.contains(&i.policy_id))
        .map(|i| i.id)
        .collect();
    Ok(payments
        .into_iter()
        .filter(|p| invoices.contains(&p.invoice_id))
        .collect())
}

/// Re-reads the invoice's payments and settles invoice and policy if covered
async fn settle(state: &AppState, invoice: &mut Invoice, policy: &mut Policy) -> Result<Reconciliation, ApiError> {
    let payments = state.billing.list_payments(Some(invoice.id)).await?;
    let outcome = reconcile(invoice, &payments);

    if outcome.is_settled() {
        state.billing.save_invoice(invoice).await?;
        info!(invoice_id = %invoice.id, status = %invoice.status, "invoice settled");

        if outcome.apply_to(policy) {
            state.policies.save_policy(policy).await?;
            publish_events(policy);
        }
    }
    Ok(outcome)
}

/// Records a payment and reconciles its invoice
#[instrument(skip(state, actor, req), fields(invoice = %req.factura, amount = %req.monto_pagado))]
pub async fn record_payment(
    state: &AppState,
    actor: &Actor,
    req: CreatePaymentRequest,
) -> Result<Recorded, ApiError> {
    actor.require(STAFF)?;
    let mut invoice = state.billing.get_invoice(req.factura.into()).await?;
    let mut policy = manageable_policy(state, actor, invoice.policy_id).await?;

    let status = req.estado.unwrap_or(PaymentStatus::Completed);
    let mut payment = match status {
        PaymentStatus::Pending => Payment::pending(invoice.id, req.monto_pagado, req.metodo_pago)?,
        _ => Payment::new(invoice.id, req.monto_pagado, req.metodo_pago)?,
    }
    .with_reference(req.referencia_pago)
    .with_description(req.descripcion);
    payment.status = status;

    if matches!(status, PaymentStatus::Completed | PaymentStatus::Pending) {
        let payments = state.billing.list_payments(Some(invoice.id)).await?;
        check_payment(&invoice, &payments, payment.amount)?;
    }

    state.billing.record_payment(&payment).await?;
    info!(payment_id = %payment.id, status = %payment.status, method = %payment.method, "payment recorded");

    if payment.is_completed() {
        settle(state, &mut invoice, &mut policy).await?;
    }

    Ok(Recorded {
        payment,
        invoice,
        policy,
    })
}

/// Opens a pending QR payment for what is still owed on the invoice
#[instrument(skip(state, actor))]
pub async fn initiate_qr(state: &AppState, actor: &Actor, invoice_id: InvoiceId) -> Result<QrRequest, ApiError> {
    let (invoice, _) = viewable_invoice(state, actor, invoice_id).await?;

    let payments = state.billing.list_payments(Some(invoice.id)).await?;
    let outstanding = outstanding_balance(&invoice, &payments);
    check_payment(&invoice, &payments, outstanding)?;

    let payment = Payment::pending(invoice.id, outstanding, PaymentMethod::Qr)?
        .with_description(Some(format!("Pago QR de la factura {}", invoice.invoice_number)));
    state.billing.record_payment(&payment).await?;

    let payload = QrPayload::for_payment(&payment, &invoice, &state.config.currency);
    info!(payment_id = %payment.id, invoice = %invoice.invoice_number, amount = %outstanding, "qr payment initiated");
    Ok(QrRequest { payment, payload })
}

pub async fn payment_status(state: &AppState, actor: &Actor, id: PaymentId) -> Result<Payment, ApiError> {
    let payment = state.billing.get_payment(id).await?;
    viewable_invoice(state, actor, payment.invoice_id).await?;
    Ok(payment)
}

/// Completes a pending payment and reconciles its invoice
#[instrument(skip(state, actor))]
pub async fn confirm_payment(state: &AppState, actor: &Actor, id: PaymentId) -> Result<Recorded, ApiError> {
    actor.require(STAFF)?;
    let mut payment = state.billing.get_payment(id).await?;
    let mut invoice = state.billing.get_invoice(payment.invoice_id).await?;
    let mut policy = manageable_policy(state, actor, invoice.policy_id).await?;

    let payments = state.billing.list_payments(Some(invoice.id)).await?;
    check_payment(&invoice, &payments, payment.amount)?;
    payment.confirm()?;
    state.billing.save_payment(&payment).await?;
    info!(payment_id = %id, "payment confirmed");

    settle(state, &mut invoice, &mut policy).await?;
    Ok(Recorded {
        payment,
        invoice,
        policy,
    })
}
