//! Request extractors
//!
//! [`ValidJson`] deserializes and validates a body, turning every failure
//! into a 400. [`Actor`] resolves the authenticated user and the profile
//! that scopes what they may see.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use core_kernel::{AgentId, ClientId, UserId};
use domain_party::{Role, User};
use domain_policy::{Policy, PolicyStatus};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::AppState;

/// JSON body that passed `validator` checks
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// What the caller's profile lets them reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Admin,
    Agent(AgentId),
    Client(ClientId),
}

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: User,
    pub scope: Scope,
}

impl Actor {
    /// Loads the user behind a token and its role profile
    ///
    /// Deactivated users are rejected even while their token is still valid.
    pub async fn resolve(state: &AppState, user_id: UserId) -> Result<Self, ApiError> {
        let user = match state.party.get_user(user_id).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => return Err(ApiError::unauthorized("User not found")),
            Err(e) => return Err(e.into()),
        };
        if !user.is_active {
            return Err(ApiError::unauthorized("User account is inactive"));
        }

        let scope = match user.role {
            Role::Admin => Scope::Admin,
            Role::Agent => state
                .party
                .find_agent_by_user(user.id)
                .await?
                .map(|agent| Scope::Agent(agent.id()))
                .ok_or_else(|| ApiError::forbidden("No agent profile is linked to this user"))?,
            Role::Client => state
                .party
                .find_client_by_user(user.id)
                .await?
                .map(|client| Scope::Client(client.id()))
                .ok_or_else(|| ApiError::forbidden("No client profile is linked to this user"))?,
        };

        Ok(Self { user, scope })
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn agent_id(&self) -> Option<AgentId> {
        match self.scope {
            Scope::Agent(id) => Some(id),
            _ => None,
        }
    }

    pub fn client_id(&self) -> Option<ClientId> {
        match self.scope {
            Scope::Client(id) => Some(id),
            _ => None,
        }
    }

    /// Fails with 403 unless the caller holds one of the roles
    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.user.role) {
            return Ok(());
        }
        Err(ApiError::forbidden(format!(
            "Role {} may not perform this action",
            self.user.role
        )))
    }

    /// Admins see everything, agents their own and unassigned solicitations,
    /// clients their own policies
    pub fn can_view_policy(&self, policy: &Policy) -> bool {
        match self.scope {
            Scope::Admin => true,
            Scope::Agent(agent_id) => match policy.agent_id() {
                Some(assigned) => assigned == agent_id,
                None => policy.status() == PolicyStatus::Quoting,
            },
            Scope::Client(client_id) => policy.client_id() == client_id,
        }
    }

    /// Staff that may change the policy; agents only touch their own
    /// policies or unassigned solicitations still being quoted
    pub fn can_manage_policy(&self, policy: &Policy) -> bool {
        match self.scope {
            Scope::Admin => true,
            Scope::Agent(_) => self.can_view_policy(policy),
            Scope::Client(_) => false,
        }
    }

    pub fn ensure_can_view(&self, policy: &Policy) -> Result<(), ApiError> {
        if self.can_view_policy(policy) {
            return Ok(());
        }
        Err(ApiError::forbidden(format!(
            "You do not have access to policy {}",
            policy.policy_number()
        )))
    }

    pub fn ensure_can_manage(&self, policy: &Policy) -> Result<(), ApiError> {
        if self.can_manage_policy(policy) {
            return Ok(());
        }
        Err(ApiError::forbidden(format!(
            "You may not modify policy {}",
            policy.policy_number()
        )))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided"))?;
        let user_id = claims
            .user_id()
            .map_err(|e| ApiError::unauthorized(e.to_string()))?;
        Actor::resolve(state, user_id).await
    }
}
