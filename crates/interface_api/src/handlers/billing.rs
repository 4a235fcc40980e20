//! Invoice and payment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::billing::*;
use crate::dto::PolicyFilter;
use crate::error::ApiError;
use crate::extract::{Actor, ValidJson};
use crate::services::billing::{self as service, Recorded};
use crate::AppState;

impl From<Recorded> for PaymentRecordedResponse {
    fn from(recorded: Recorded) -> Self {
        Self {
            pago: PaymentResponse::from(&recorded.payment),
            factura_estado: recorded.invoice.status,
            poliza_estado: recorded.policy.status(),
        }
    }
}

pub async fn list_invoices(
    State(state): State<AppState>,
    actor: Actor,
    Query(filter): Query<PolicyFilter>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let invoices = service::list_invoices(&state, &actor, filter.poliza_id.map(Into::into)).await?;
    Ok(Json(invoices.iter().map(InvoiceResponse::from).collect()))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let invoice = service::create_invoice(&state, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(&invoice))))
}

pub async fn list_payments(
    State(state): State<AppState>,
    actor: Actor,
    Query(filter): Query<PaymentFilter>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = service::list_payments(&state, &actor, filter.factura_id.map(Into::into)).await?;
    Ok(Json(payments.iter().map(PaymentResponse::from).collect()))
}

/// Records a payment and reconciles its invoice
pub async fn record_payment(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentRecordedResponse>), ApiError> {
    let recorded = service::record_payment(&state, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(recorded.into())))
}

/// Opens a pending QR payment for the outstanding balance
pub async fn initiate_qr(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<InitiateQrRequest>,
) -> Result<(StatusCode, Json<QrPaymentResponse>), ApiError> {
    let qr = service::initiate_qr(&state, &actor, req.factura.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(QrPaymentResponse {
            pago_id: *qr.payment.id.as_uuid(),
            qr_payload: qr.payload.to_string(),
            monto: qr.payment.amount,
        }),
    ))
}

pub async fn payment_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    let payment = service::payment_status(&state, &actor, id.into()).await?;
    Ok(Json(PaymentStatusResponse {
        pago_id: *payment.id.as_uuid(),
        status: payment.status,
    }))
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentRecordedResponse>, ApiError> {
    let recorded = service::confirm_payment(&state, &actor, id.into()).await?;
    Ok(Json(recorded.into()))
}
