//! Policy note handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::policy::{CreateNoteRequest, NoteResponse};
use crate::dto::PolicyFilter;
use crate::error::ApiError;
use crate::extract::{Actor, ValidJson};
use crate::services::notes as service;
use crate::AppState;

pub async fn list_notes(
    State(state): State<AppState>,
    actor: Actor,
    Query(filter): Query<PolicyFilter>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let notes = service::list(&state, &actor, filter.poliza_id.map(Into::into)).await?;
    Ok(Json(notes.iter().map(NoteResponse::from).collect()))
}

pub async fn create_note(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
    let note = service::create(&state, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(NoteResponse::from(&note))))
}

pub async fn get_note(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = service::get(&state, &actor, id.into()).await?;
    Ok(Json(NoteResponse::from(&note)))
}
