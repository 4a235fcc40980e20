//! Claims DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_claims::{Claim, ClaimStatus, ClaimType, ClaimUpdate, NewClaim};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClaimRequest {
    pub poliza: Uuid,
    pub tipo_siniestro: ClaimType,
    pub fecha_siniestro: NaiveDate,
    #[validate(length(min = 1, message = "is required"))]
    pub descripcion: String,
    pub monto_reclamado: Decimal,
    pub documentos_adjuntos: Option<String>,
}

impl From<CreateClaimRequest> for NewClaim {
    fn from(req: CreateClaimRequest) -> Self {
        NewClaim {
            claim_type: req.tipo_siniestro,
            incident_date: req.fecha_siniestro,
            description: req.descripcion,
            amount_claimed: req.monto_reclamado,
            documents: req.documentos_adjuntos,
        }
    }
}

/// Dedicated update path
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClaimRequest {
    /// Only `reportado` and `en_revision` are accepted here
    pub estado: Option<ClaimStatus>,
    pub monto_aprobado: Option<Decimal>,
    pub resolucion: Option<String>,
    pub descripcion: Option<String>,
    pub documentos_adjuntos: Option<String>,
}

impl From<UpdateClaimRequest> for ClaimUpdate {
    fn from(req: UpdateClaimRequest) -> Self {
        ClaimUpdate {
            status: req.estado,
            amount_approved: req.monto_aprobado,
            resolution: req.resolucion,
            description: req.descripcion,
            documents: req.documentos_adjuntos,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApproveClaimRequest {
    pub monto_aprobado: Decimal,
    pub resolucion: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RejectClaimRequest {
    pub resolucion: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub poliza: Uuid,
    pub numero_siniestro: String,
    pub tipo_siniestro: ClaimType,
    pub fecha_siniestro: NaiveDate,
    pub fecha_reporte: DateTime<Utc>,
    pub descripcion: String,
    pub monto_reclamado: Decimal,
    pub monto_aprobado: Option<Decimal>,
    pub estado: ClaimStatus,
    pub documentos_adjuntos: Option<String>,
    pub resolucion: Option<String>,
    pub fecha_resolucion: Option<NaiveDate>,
}

impl From<&Claim> for ClaimResponse {
    fn from(claim: &Claim) -> Self {
        Self {
            id: *claim.id.as_uuid(),
            poliza: *claim.policy_id.as_uuid(),
            numero_siniestro: claim.claim_number.clone(),
            tipo_siniestro: claim.claim_type,
            fecha_siniestro: claim.incident_date,
            fecha_reporte: claim.reported_at,
            descripcion: claim.description.clone(),
            monto_reclamado: claim.amount_claimed,
            monto_aprobado: claim.amount_approved,
            estado: claim.status,
            documentos_adjuntos: claim.documents.clone(),
            resolucion: claim.resolution.clone(),
            fecha_resolucion: claim.resolution_date,
        }
    }
}
