//! PostgreSQL Party Adapter
//!
//! Implements `PartyPort` on top of [`PartyRepository`]. Unique keys on
//! username, client identification and agent code come back from PostgreSQL
//! as 23505 and surface as `PortError::Conflict`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AgentId, ClientId, DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId,
};
use domain_party::{Agent, Client, PartyPort, User};

use crate::repositories::PartyRepository;

/// PostgreSQL-backed implementation of the PartyPort trait
#[derive(Debug, Clone)]
pub struct PostgresPartyAdapter {
    repository: PartyRepository,
    pool: PgPool,
}

impl PostgresPartyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PartyRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &PartyRepository {
        &self.repository
    }
}

impl DomainPort for PostgresPartyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPartyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-party-adapter").await
    }
}

#[async_trait]
impl PartyPort for PostgresPartyAdapter {
    #[instrument(skip(self, user), fields(user_id = %user.id, username = %user.username))]
    async fn create_user(&self, user: &User) -> Result<(), PortError> {
        debug!("Inserting user");
        Ok(self.repository.insert_user(user).await?)
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_user(&self, id: UserId) -> Result<User, PortError> {
        debug!("Fetching user by ID");
        Ok(self.repository.get_user(id).await?)
    }

    #[instrument(skip(self))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, PortError> {
        debug!("Looking up user by username");
        Ok(self.repository.find_user_by_username(username).await?)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn save_user(&self, user: &User) -> Result<(), PortError> {
        debug!("Updating user");
        Ok(self.repository.update_user(user).await?)
    }

    #[instrument(skip(self, client), fields(client_id = %client.id()))]
    async fn create_client(&self, client: &Client) -> Result<(), PortError> {
        debug!("Inserting client with profile");
        Ok(self.repository.insert_client(client).await?)
    }

    #[instrument(skip(self), fields(client_id = %id))]
    async fn get_client(&self, id: ClientId) -> Result<Client, PortError> {
        debug!("Fetching client by ID");
        Ok(self.repository.get_client(id).await?)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn find_client_by_user(&self, user_id: UserId) -> Result<Option<Client>, PortError> {
        Ok(self.repository.find_client_by_user(user_id).await?)
    }

    #[instrument(skip(self))]
    async fn list_clients(&self) -> Result<Vec<Client>, PortError> {
        let clients = self.repository.list_clients().await?;
        debug!(count = clients.len(), "Listed clients");
        Ok(clients)
    }

    #[instrument(skip(self, client), fields(client_id = %client.id()))]
    async fn save_client(&self, client: &Client) -> Result<(), PortError> {
        debug!("Updating client with profile");
        Ok(self.repository.update_client(client).await?)
    }

    #[instrument(skip(self, agent), fields(agent_id = %agent.id(), agent_code = %agent.profile.agent_code))]
    async fn create_agent(&self, agent: &Agent) -> Result<(), PortError> {
        debug!("Inserting agent with profile");
        Ok(self.repository.insert_agent(agent).await?)
    }

    #[instrument(skip(self), fields(agent_id = %id))]
    async fn get_agent(&self, id: AgentId) -> Result<Agent, PortError> {
        debug!("Fetching agent by ID");
        Ok(self.repository.get_agent(id).await?)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn find_agent_by_user(&self, user_id: UserId) -> Result<Option<Agent>, PortError> {
        Ok(self.repository.find_agent_by_user(user_id).await?)
    }

    #[instrument(skip(self))]
    async fn list_agents(&self) -> Result<Vec<Agent>, PortError> {
        let agents = self.repository.list_agents().await?;
        debug!(count = agents.len(), "Listed agents");
        Ok(agents)
    }

    #[instrument(skip(self, agent), fields(agent_id = %agent.id()))]
    async fn save_agent(&self, agent: &Agent) -> Result<(), PortError> {
        debug!("Updating agent with profile");
        Ok(self.repository.update_agent(agent).await?)
    }
}
