//! Beneficiary handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::policy::{BeneficiaryResponse, CreateBeneficiaryRequest};
use crate::dto::{MessageResponse, PolicyFilter};
use crate::error::ApiError;
use crate::extract::{Actor, ValidJson};
use crate::services::beneficiaries as service;
use crate::AppState;

pub async fn list_beneficiaries(
    State(state): State<AppState>,
    actor: Actor,
    Query(filter): Query<PolicyFilter>,
) -> Result<Json<Vec<BeneficiaryResponse>>, ApiError> {
    let beneficiaries = service::list(&state, &actor, filter.poliza_id.map(Into::into)).await?;
    Ok(Json(beneficiaries.iter().map(BeneficiaryResponse::from).collect()))
}

pub async fn add_beneficiary(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<CreateBeneficiaryRequest>,
) -> Result<(StatusCode, Json<BeneficiaryResponse>), ApiError> {
    let beneficiary = service::add(&state, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(BeneficiaryResponse::from(&beneficiary))))
}

pub async fn remove_beneficiary(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    service::remove(&state, &actor, id.into()).await?;
    Ok(Json(MessageResponse::new("Beneficiario eliminado correctamente.")))
}
