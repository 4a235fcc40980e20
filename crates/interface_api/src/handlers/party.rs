//! Client and agent handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::party::*;
use crate::dto::MessageResponse;
use crate::error::ApiError;
use crate::extract::{Actor, ValidJson};
use crate::services::party as service;
use crate::AppState;

/// Self-registration; no token required
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let client = service::register_client(&state, req).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::from(&client))))
}

pub async fn list_clients(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let clients = service::list_clients(&state, &actor).await?;
    Ok(Json(clients.iter().map(ClientResponse::from).collect()))
}

pub async fn create_client(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let client = service::create_client(&state, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::from(&client))))
}

pub async fn get_client(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = service::get_client(&state, &actor, id.into()).await?;
    Ok(Json(ClientResponse::from(&client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = service::update_client(&state, &actor, id.into(), req).await?;
    Ok(Json(ClientResponse::from(&client)))
}

/// Deactivates the client and every live policy they hold
pub async fn deactivate_client(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientDeactivatedResponse>, ApiError> {
    let changed = service::deactivate_client(&state, &actor, id.into()).await?;
    Ok(Json(ClientDeactivatedResponse {
        mensaje: format!(
            "Cliente desactivado. {} poliza(s) pasaron a estado inactiva.",
            changed.len()
        ),
        polizas_inactivadas: changed.len(),
    }))
}

pub async fn reactivate_client(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    service::reactivate_client(&state, &actor, id.into()).await?;
    Ok(Json(MessageResponse::new("Cliente reactivado correctamente.")))
}

pub async fn list_agents(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<AgentResponse>>, ApiError> {
    let agents = service::list_agents(&state, &actor).await?;
    Ok(Json(agents.iter().map(AgentResponse::from).collect()))
}

pub async fn create_agent(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<CreateAgentRequest>,
) -> Result<(StatusCode, Json<AgentResponse>), ApiError> {
    let agent = service::create_agent(&state, &actor, req).await?;
    Ok((StatusCode::CREATED, Json(AgentResponse::from(&agent))))
}

pub async fn get_agent(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent = service::get_agent(&state, &actor, id.into()).await?;
    Ok(Json(AgentResponse::from(&agent)))
}

pub async fn update_agent(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateAgentRequest>,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent = service::update_agent(&state, &actor, id.into(), req).await?;
    Ok(Json(AgentResponse::from(&agent)))
}

pub async fn deactivate_agent(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    service::deactivate_agent(&state, &actor, id.into()).await?;
    Ok(Json(MessageResponse::new("Agente desactivado correctamente.")))
}

pub async fn reactivate_agent(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    service::reactivate_agent(&state, &actor, id.into()).await?;
    Ok(Json(MessageResponse::new("Agente reactivado correctamente.")))
}

pub async fn own_agent(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent = service::own_agent(&state, &actor).await?;
    Ok(Json(AgentResponse::from(&agent)))
}

pub async fn update_own_agent(
    State(state): State<AppState>,
    actor: Actor,
    ValidJson(req): ValidJson<UpdateOwnAgentRequest>,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent = service::update_own_agent(&state, &actor, req.into()).await?;
    Ok(Json(AgentResponse::from(&agent)))
}
