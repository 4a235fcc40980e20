//! Invoice and payment DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_billing::{Invoice, InvoiceStatus, Payment, PaymentMethod, PaymentStatus};
use domain_policy::PolicyStatus;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub poliza: Uuid,
    /// The policy's annual premium when absent
    pub monto: Option<Decimal>,
    /// Today when absent
    pub fecha_emision: Option<NaiveDate>,
    /// Issue date plus the configured due window when absent
    pub fecha_vencimiento: Option<NaiveDate>,
    #[validate(length(max = 200))]
    pub concepto: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub poliza: Uuid,
    pub numero_factura: String,
    pub monto: Decimal,
    pub fecha_emision: NaiveDate,
    pub fecha_vencimiento: NaiveDate,
    pub estado: InvoiceStatus,
    pub concepto: String,
}

impl From<&Invoice> for InvoiceResponse {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: *invoice.id.as_uuid(),
            poliza: *invoice.policy_id.as_uuid(),
            numero_factura: invoice.invoice_number.clone(),
            monto: invoice.amount,
            fecha_emision: invoice.issue_date,
            fecha_vencimiento: invoice.due_date,
            estado: invoice.status,
            concepto: invoice.concept.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub factura: Uuid,
    pub monto_pagado: Decimal,
    pub metodo_pago: PaymentMethod,
    #[validate(length(max = 100))]
    pub referencia_pago: Option<String>,
    /// `completado` when absent
    pub estado: Option<PaymentStatus>,
    pub descripcion: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub factura: Uuid,
    pub monto_pagado: Decimal,
    pub fecha_pago: DateTime<Utc>,
    pub metodo_pago: PaymentMethod,
    pub referencia_pago: Option<String>,
    pub estado: PaymentStatus,
    pub descripcion: Option<String>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            factura: *payment.invoice_id.as_uuid(),
            monto_pagado: payment.amount,
            fecha_pago: payment.paid_at,
            metodo_pago: payment.method,
            referencia_pago: payment.reference.clone(),
            estado: payment.status,
            descripcion: payment.description.clone(),
        }
    }
}

/// Payment together with the statuses reconciliation left behind
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentRecordedResponse {
    #[serde(flatten)]
    pub pago: PaymentResponse,
    pub factura_estado: InvoiceStatus,
    pub poliza_estado: PolicyStatus,
}

#[derive(Debug, Deserialize)]
pub struct PaymentFilter {
    pub factura_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InitiateQrRequest {
    pub factura: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QrPaymentResponse {
    pub pago_id: Uuid,
    pub qr_payload: String,
    pub monto: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub pago_id: Uuid,
    pub status: PaymentStatus,
}
