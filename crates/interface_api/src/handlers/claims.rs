//! Claims handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::claims::*;
use crate::dto::PolicyFilter;
use crate::error::ApiError;
use crate::extract::{Actor, ValidJson};
use crate::services::claims as service;
use crate::AppState;

pub async fn list_claims(
    State(state): State<AppState>,
    actor: Actor,
    Query(filter): Query<PolicyFilter>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let claims = service::list(&state, &actor, filter.poliza_id.map(Into::into)).await?;
    Ok(Json(claims.iter().map(ClaimResponse::from).collect()))
}

/// Reports a new claim (siniestro)
pub async fn report_claim(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<CreateClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let claim = service::report(&state, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(ClaimResponse::from(&claim))))
}

pub async fn get_claim(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = service::get(&state, &actor, id.into()).await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

pub async fn update_claim(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = service::update(&state, &actor, id.into(), req).await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

pub async fn approve_claim(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<ApproveClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = service::approve(&state, &actor, id.into(), req).await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

pub async fn reject_claim(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    body: Option<Json<RejectClaimRequest>>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let claim = service::reject(&state, &actor, id.into(), req).await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

pub async fn pay_claim(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = service::pay(&state, &actor, id.into()).await?;
    Ok(Json(ClaimResponse::from(&claim)))
}
