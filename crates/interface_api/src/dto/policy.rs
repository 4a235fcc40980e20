//! Policy, beneficiary and note DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_billing::PaymentMethod;
use domain_policy::{Beneficiary, NoteType, Policy, PolicyNote, PolicyStatus, TermsUpdate};

use crate::dto::billing::{InvoiceResponse, PaymentResponse};
use crate::dto::party::ClientResponse;

/// Policy creation by staff
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePolicyRequest {
    pub cliente: Uuid,
    /// Ignored for agents, who are always assigned to what they create
    pub agente: Option<Uuid>,
    pub suma_asegurada: Decimal,
    pub prima_anual: Decimal,
    /// Derived from the annual premium when absent or zero
    pub prima_mensual: Option<Decimal>,
    pub fecha_inicio: NaiveDate,
    pub fecha_vencimiento: NaiveDate,
    pub cobertura: Option<String>,
    /// Issue active with a paid invoice and a completed payment
    #[serde(default)]
    pub pago_inmediato: bool,
    /// Method of the immediate payment, `efectivo` when absent
    pub metodo_pago: Option<PaymentMethod>,
    #[validate(length(max = 100))]
    pub referencia_pago: Option<String>,
}

/// Policy requested by a client
#[derive(Debug, Deserialize, Validate)]
pub struct SolicitPolicyRequest {
    pub suma_asegurada: Decimal,
    pub prima_anual: Decimal,
    pub prima_mensual: Option<Decimal>,
    pub fecha_inicio: NaiveDate,
    pub fecha_vencimiento: NaiveDate,
    pub cobertura: Option<String>,
}

/// Edit of the terms while quoting
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePolicyRequest {
    pub suma_asegurada: Option<Decimal>,
    pub prima_anual: Option<Decimal>,
    pub prima_mensual: Option<Decimal>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub cobertura: Option<String>,
}

impl From<UpdatePolicyRequest> for TermsUpdate {
    fn from(req: UpdatePolicyRequest) -> Self {
        TermsUpdate {
            insured_sum: req.suma_asegurada,
            annual_premium: req.prima_anual,
            monthly_premium: req.prima_mensual,
            start_date: req.fecha_inicio,
            end_date: req.fecha_vencimiento,
            coverage: req.cobertura,
        }
    }
}

/// Acceptance of a solicitation; admins name the agent
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AcceptPolicyRequest {
    pub agente: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyResponse {
    pub id: Uuid,
    pub numero_poliza: String,
    pub cliente: Uuid,
    pub agente: Option<Uuid>,
    pub suma_asegurada: Decimal,
    pub prima_anual: Decimal,
    pub prima_mensual: Decimal,
    pub fecha_inicio: NaiveDate,
    pub fecha_vencimiento: NaiveDate,
    pub estado: PolicyStatus,
    pub cobertura: Option<String>,
    pub creado_en: DateTime<Utc>,
}

impl From<&Policy> for PolicyResponse {
    fn from(policy: &Policy) -> Self {
        let record = policy.record();
        Self {
            id: *record.id.as_uuid(),
            numero_poliza: record.policy_number.clone(),
            cliente: *record.client_id.as_uuid(),
            agente: record.agent_id.map(|id| *id.as_uuid()),
            suma_asegurada: record.insured_sum,
            prima_anual: record.annual_premium,
            prima_mensual: record.monthly_premium,
            fecha_inicio: record.start_date,
            fecha_vencimiento: record.end_date,
            estado: record.status,
            cobertura: record.coverage.clone(),
            creado_en: record.created_at,
        }
    }
}

/// Policy with its client, beneficiaries and assigned share
#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyDetailResponse {
    #[serde(flatten)]
    pub poliza: PolicyResponse,
    pub cliente_info: Option<ClientResponse>,
    pub beneficiarios: Vec<BeneficiaryResponse>,
    pub porcentaje_asignado: Decimal,
}

/// Policy plus the billing documents a lifecycle step produced
#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyIssueResponse {
    #[serde(flatten)]
    pub poliza: PolicyResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factura: Option<InvoiceResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pago: Option<PaymentResponse>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBeneficiaryRequest {
    pub poliza: Uuid,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub nombre_completo: String,
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    pub parentesco: String,
    pub porcentaje: Decimal,
    pub fecha_nacimiento: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BeneficiaryResponse {
    pub id: Uuid,
    pub poliza: Uuid,
    pub nombre_completo: String,
    pub parentesco: String,
    pub porcentaje: Decimal,
    pub fecha_nacimiento: Option<NaiveDate>,
}

impl From<&Beneficiary> for BeneficiaryResponse {
    fn from(b: &Beneficiary) -> Self {
        Self {
            id: *b.id.as_uuid(),
            poliza: *b.policy_id.as_uuid(),
            nombre_completo: b.full_name.clone(),
            parentesco: b.relationship.clone(),
            porcentaje: b.percentage,
            fecha_nacimiento: b.birth_date,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoteRequest {
    pub poliza: Uuid,
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub titulo: String,
    #[validate(length(min = 1, message = "is required"))]
    pub contenido: String,
    #[serde(default)]
    pub tipo_nota: NoteType,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteResponse {
    pub id: Uuid,
    pub poliza: Uuid,
    pub usuario: Uuid,
    pub titulo: String,
    pub contenido: String,
    pub tipo_nota: NoteType,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

impl From<&PolicyNote> for NoteResponse {
    fn from(note: &PolicyNote) -> Self {
        Self {
            id: *note.id.as_uuid(),
            poliza: *note.policy_id.as_uuid(),
            usuario: *note.author_id.as_uuid(),
            titulo: note.title.clone(),
            contenido: note.content.clone(),
            tipo_nota: note.note_type,
            fecha_creacion: note.created_at,
            fecha_actualizacion: note.updated_at,
        }
    }
}
