//! Client and agent administration

use tracing::{info, instrument, warn};

use core_kernel::{AgentId, ClientId, PolicyId, ReferenceNumber};
use domain_party::{Agent, AgentProfile, Client, ClientProfile, PartyError, PasswordHash, Role, User};
use domain_policy::cascade_client_deactivation;

use crate::dto::party::{CreateAgentRequest, CreateClientRequest, UpdateAgentRequest, UpdateClientRequest};
use crate::error::ApiError;
use crate::extract::Actor;
use crate::services::{policy::publish_events, today, NumberDraws};
use crate::AppState;

const STAFF: &[Role] = &[Role::Admin, Role::Agent];

async fn ensure_username_free(state: &AppState, username: &str) -> Result<(), ApiError> {
    if state.party.find_user_by_username(username.trim()).await?.is_some() {
        return Err(ApiError::Conflict(format!("username '{}' already exists", username.trim())));
    }
    Ok(())
}

fn new_user(
    username: &str,
    password: &str,
    role: Role,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
) -> Result<User, PartyError> {
    Ok(User::new(username, role, PasswordHash::derive(password))?
        .with_name(first_name, last_name)
        .with_email(email)
        .with_phone(phone))
}

// ============================================================================
// Clients
// ============================================================================

/// Creates a client user and profile; open to anyone through `/registro/`
#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn register_client(state: &AppState, req: CreateClientRequest) -> Result<Client, ApiError> {
    ensure_username_free(state, &req.username).await?;

    let mut user = new_user(
        &req.username,
        &req.password,
        Role::Client,
        req.first_name,
        req.last_name,
        req.email,
        req.telefono,
    )?;
    user.identification = Some(req.identificacion.clone());

    let mut profile = ClientProfile::new(user.id, req.fecha_nacimiento, req.direccion, req.identificacion)?;
    if let Some(health_status) = req.estado_salud.filter(|s| !s.trim().is_empty()) {
        profile = profile.with_health_status(health_status);
    }

    let client = Client::new(user, profile)?;
    state.party.create_client(&client).await?;

    info!(client_id = %client.id(), "client registered");
    Ok(client)
}

pub async fn create_client(
    state: &AppState,
    actor: &Actor,
    req: CreateClientRequest,
) -> Result<Client, ApiError> {
    actor.require(STAFF)?;
    register_client(state, req).await
}

pub async fn list_clients(state: &AppState, actor: &Actor) -> Result<Vec<Client>, ApiError> {
    actor.require(STAFF)?;
    Ok(state.party.list_clients().await?)
}

/// Staff see every client, a client only themself
pub async fn get_client(state: &AppState, actor: &Actor, id: ClientId) -> Result<Client, ApiError> {
    if actor.client_id() != Some(id) {
        actor.require(STAFF)?;
    }
    Ok(state.party.get_client(id).await?)
}

pub async fn update_client(
    state: &AppState,
    actor: &Actor,
    id: ClientId,
    req: UpdateClientRequest,
) -> Result<Client, ApiError> {
    actor.require(STAFF)?;
    let mut client = state.party.get_client(id).await?;

    if let Some(email) = req.email {
        client.user.email = Some(email);
    }
    if let Some(first_name) = req.first_name {
        client.user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        client.user.last_name = last_name;
    }
    if let Some(phone) = req.telefono {
        client.user.phone = Some(phone);
    }
    if let Some(birth_date) = req.fecha_nacimiento {
        client.profile.birth_date = birth_date;
    }
    if let Some(address) = req.direccion {
        client.profile.address = address;
    }
    if let Some(identification) = req.identificacion {
        let identification = identification.trim().to_string();
        if identification.is_empty() {
            return Err(ApiError::validation("identification must not be empty"));
        }
        client.user.identification = Some(identification.clone());
        client.profile.identification = identification;
    }
    if let Some(health_status) = req.estado_salud {
        client.profile.health_status = health_status;
    }

    state.party.save_client(&client).await?;
    info!(client_id = %client.id(), "client updated");
    Ok(client)
}

/// Blocks the client's login and sweeps their live policies to `inactiva`
///
/// Returns the ids of the policies that changed.
#[instrument(skip(state, actor))]
pub async fn deactivate_client(
    state: &AppState,
    actor: &Actor,
    id: ClientId,
) -> Result<Vec<PolicyId>, ApiError> {
    actor.require(&[Role::Admin])?;
    let mut client = state.party.get_client(id).await?;

    client.user.deactivate();
    state.party.save_client(&client).await?;

    let mut policies = state.policies.list_policies_by_client(id).await?;
    let changed = cascade_client_deactivation(&mut policies);
    for policy in policies.iter_mut().filter(|p| changed.contains(&p.id())) {
        state.policies.save_policy(policy).await?;
        publish_events(policy);
    }

    info!(client_id = %id, policies = changed.len(), "client deactivated");
    Ok(changed)
}

/// Restores login only; policy statuses stay as they are
pub async fn reactivate_client(state: &AppState, actor: &Actor, id: ClientId) -> Result<Client, ApiError> {
    actor.require(&[Role::Admin])?;
    let mut client = state.party.get_client(id).await?;
    client.user.reactivate();
    state.party.save_client(&client).await?;
    info!(client_id = %id, "client reactivated");
    Ok(client)
}

// ============================================================================
// Agents
// ============================================================================

#[instrument(skip(state, actor, req), fields(username = %req.username))]
pub async fn create_agent(state: &AppState, actor: &Actor, req: CreateAgentRequest) -> Result<Agent, ApiError> {
    actor.require(&[Role::Admin])?;
    ensure_username_free(state, &req.username).await?;

    let user = new_user(
        &req.username,
        &req.password,
        Role::Agent,
        req.first_name,
        req.last_name,
        req.email,
        req.telefono,
    )?;

    let code_given = req.codigo_agente.is_some();
    let code = req
        .codigo_agente
        .unwrap_or_else(|| ReferenceNumber::AgentCode.generate());
    let mut profile = AgentProfile::new(user.id, code, req.fecha_contratacion.unwrap_or_else(today))?;
    if let Some(specialty) = req.especialidad.filter(|s| !s.trim().is_empty()) {
        profile.specialty = specialty;
    }
    if let Some(commission) = req.comision {
        profile.set_commission(commission)?;
    }
    profile.office_phone = req.telefono_oficina;
    profile.office_address = req.direccion_oficina;

    let mut agent = Agent::new(user, profile)?;

    // a code the caller chose is never replaced
    let mut draws = NumberDraws::new(ReferenceNumber::AgentCode);
    while let Err(e) = state.party.create_agent(&agent).await {
        if code_given {
            return Err(e.into());
        }
        agent.profile.agent_code = draws.redraw(e)?;
    }

    info!(agent_id = %agent.id(), code = %agent.profile.agent_code, "agent created");
    Ok(agent)
}

pub async fn list_agents(state: &AppState, actor: &Actor) -> Result<Vec<Agent>, ApiError> {
    actor.require(&[Role::Admin])?;
    Ok(state.party.list_agents().await?)
}

pub async fn get_agent(state: &AppState, actor: &Actor, id: AgentId) -> Result<Agent, ApiError> {
    actor.require(&[Role::Admin])?;
    Ok(state.party.get_agent(id).await?)
}

fn apply_agent_update(agent: &mut Agent, req: UpdateAgentRequest) -> Result<(), ApiError> {
    if let Some(email) = req.email {
        agent.user.email = Some(email);
    }
    if let Some(first_name) = req.first_name {
        agent.user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        agent.user.last_name = last_name;
    }
    if let Some(phone) = req.telefono {
        agent.user.phone = Some(phone);
    }
    if let Some(specialty) = req.especialidad {
        agent.profile.specialty = specialty;
    }
    if let Some(commission) = req.comision {
        agent.profile.set_commission(commission)?;
    }
    if let Some(status) = req.estado {
        agent.profile.status = status;
    }
    if let Some(office_phone) = req.telefono_oficina {
        agent.profile.office_phone = Some(office_phone);
    }
    if let Some(office_address) = req.direccion_oficina {
        agent.profile.office_address = Some(office_address);
    }
    Ok(())
}

pub async fn update_agent(
    state: &AppState,
    actor: &Actor,
    id: AgentId,
    req: UpdateAgentRequest,
) -> Result<Agent, ApiError> {
    actor.require(&[Role::Admin])?;
    let mut agent = state.party.get_agent(id).await?;
    apply_agent_update(&mut agent, req)?;
    state.party.save_agent(&agent).await?;
    info!(agent_id = %id, "agent updated");
    Ok(agent)
}

/// Blocks login and marks the profile `inactivo`
pub async fn deactivate_agent(state: &AppState, actor: &Actor, id: AgentId) -> Result<Agent, ApiError> {
    actor.require(&[Role::Admin])?;
    let mut agent = state.party.get_agent(id).await?;
    agent.deactivate();
    state.party.save_agent(&agent).await?;
    info!(agent_id = %id, "agent deactivated");
    Ok(agent)
}

pub async fn reactivate_agent(state: &AppState, actor: &Actor, id: AgentId) -> Result<Agent, ApiError> {
    actor.require(&[Role::Admin])?;
    let mut agent = state.party.get_agent(id).await?;
    agent.reactivate();
    state.party.save_agent(&agent).await?;
    info!(agent_id = %id, "agent reactivated");
    Ok(agent)
}

/// The calling agent's own profile
pub async fn own_agent(state: &AppState, actor: &Actor) -> Result<Agent, ApiError> {
    let id = actor
        .agent_id()
        .ok_or_else(|| ApiError::forbidden("Only agents have an agent profile"))?;
    Ok(state.party.get_agent(id).await?)
}

/// Contact-field edit of the calling agent's own profile
pub async fn update_own_agent(
    state: &AppState,
    actor: &Actor,
    req: UpdateAgentRequest,
) -> Result<Agent, ApiError> {
    let mut agent = own_agent(state, actor).await?;
    apply_agent_update(&mut agent, req)?;
    state.party.save_agent(&agent).await?;
    info!(agent_id = %agent.id(), "agent updated own profile");
    Ok(agent)
}

// ============================================================================
// Bootstrap
// ============================================================================

/// Creates the first administrator unless the username is already taken
///
/// Returns true when a user was created. Safe to run on every start.
#[instrument(skip(state, password))]
pub async fn ensure_admin(state: &AppState, username: &str, password: &str) -> Result<bool, ApiError> {
    if let Some(existing) = state.party.find_user_by_username(username.trim()).await? {
        if existing.role != Role::Admin {
            warn!(role = %existing.role, "bootstrap username belongs to a non-admin user");
        }
        return Ok(false);
    }
    if password.chars().count() < 8 {
        return Err(ApiError::validation("admin password must be at least 8 characters"));
    }

    let user = User::new(username, Role::Admin, PasswordHash::derive(password))?;
    state.party.create_user(&user).await?;
    info!(user_id = %user.id, "admin user created");
    Ok(true)
}
