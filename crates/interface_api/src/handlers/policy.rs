//! Policy handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use domain_policy::assigned_percentage;

use crate::dto::billing::{InvoiceResponse, PaymentResponse};
use crate::dto::party::ClientResponse;
use crate::dto::policy::*;
use crate::error::ApiError;
use crate::extract::{Actor, ValidJson};
use crate::services::policy::{self as service, Issued};
use crate::AppState;

impl From<Issued> for PolicyIssueResponse {
    fn from(issued: Issued) -> Self {
        Self {
            poliza: PolicyResponse::from(&issued.policy),
            factura: issued.invoice.as_ref().map(InvoiceResponse::from),
            pago: issued.payment.as_ref().map(PaymentResponse::from),
        }
    }
}

/// Lists the policies visible to the caller
pub async fn list_policies(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<PolicyResponse>>, ApiError> {
    let policies = service::list(&state, &actor).await?;
    Ok(Json(policies.iter().map(PolicyResponse::from).collect()))
}

/// Creates a policy quote, or an active policy when paid at issue
pub async fn create_policy(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<CreatePolicyRequest>,
) -> Result<(StatusCode, Json<PolicyIssueResponse>), ApiError> {
    let issued = service::create(&state, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(issued.into())))
}

/// Client-initiated solicitation
pub async fn solicit_policy(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<SolicitPolicyRequest>,
) -> Result<(StatusCode, Json<PolicyResponse>), ApiError> {
    let policy = service::solicit(&state, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(PolicyResponse::from(&policy))))
}

/// Gets a policy with its client and beneficiaries
pub async fn get_policy(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<PolicyDetailResponse>, ApiError> {
    let detail = service::detail(&state, &actor, id.into()).await?;
    Ok(Json(PolicyDetailResponse {
        poliza: PolicyResponse::from(&detail.policy),
        cliente_info: detail.client.as_ref().map(ClientResponse::from),
        beneficiarios: detail.beneficiaries.iter().map(BeneficiaryResponse::from).collect(),
        porcentaje_asignado: assigned_percentage(&detail.beneficiaries),
    }))
}

/// Edits the terms of a quote
pub async fn update_policy(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdatePolicyRequest>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let policy = service::update_terms(&state, &actor, id.into(), req).await?;
    Ok(Json(PolicyResponse::from(&policy)))
}

/// Accepts a solicitation and emits its invoice
pub async fn accept_policy(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    body: Option<Json<AcceptPolicyRequest>>,
) -> Result<Json<PolicyIssueResponse>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let issued = service::accept(&state, &actor, id.into(), req).await?;
    Ok(Json(issued.into()))
}

pub async fn activate_policy(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let policy = service::activate(&state, &actor, id.into()).await?;
    Ok(Json(PolicyResponse::from(&policy)))
}

pub async fn cancel_policy(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let policy = service::cancel(&state, &actor, id.into()).await?;
    Ok(Json(PolicyResponse::from(&policy)))
}
