//! Party Domain Ports
//!
//! The `PartyPort` trait is everything the party domain needs from storage.
//! `infra_db` provides the PostgreSQL adapter; the in-memory [`mock`] adapter
//! backs unit and HTTP tests.

use async_trait::async_trait;

use core_kernel::{AgentId, ClientId, DomainPort, HealthCheckable, PortError, UserId};

use crate::agent::Agent;
use crate::client::Client;
use crate::user::User;

/// The port trait for party domain operations
///
/// Uniqueness violations (username, client identification, agent code) are
/// reported as `PortError::Conflict`.
#[async_trait]
pub trait PartyPort: DomainPort + HealthCheckable {
    // ========================================================================
    // Users
    // ========================================================================

    /// Stores a user without a profile (administrators)
    async fn create_user(&self, user: &User) -> Result<(), PortError>;

    /// Retrieves a user by ID
    async fn get_user(&self, id: UserId) -> Result<User, PortError>;

    /// Looks a user up by login name
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, PortError>;

    /// Persists every mutable user field
    async fn save_user(&self, user: &User) -> Result<(), PortError>;

    // ========================================================================
    // Clients
    // ========================================================================

    /// Stores a client user and its profile together
    async fn create_client(&self, client: &Client) -> Result<(), PortError>;

    async fn get_client(&self, id: ClientId) -> Result<Client, PortError>;

    async fn find_client_by_user(&self, user_id: UserId) -> Result<Option<Client>, PortError>;

    async fn list_clients(&self) -> Result<Vec<Client>, PortError>;

    /// Persists both the user and the profile of a client
    async fn save_client(&self, client: &Client) -> Result<(), PortError>;

    // ========================================================================
    // Agents
    // ========================================================================

    /// Stores an agent user and its profile together
    async fn create_agent(&self, agent: &Agent) -> Result<(), PortError>;

    async fn get_agent(&self, id: AgentId) -> Result<Agent, PortError>;

    async fn find_agent_by_user(&self, user_id: UserId) -> Result<Option<Agent>, PortError>;

    async fn list_agents(&self) -> Result<Vec<Agent>, PortError>;

    /// Persists both the user and the profile of an agent
    async fn save_agent(&self, agent: &Agent) -> Result<(), PortError>;
}

/// Mock implementation of PartyPort for testing
///
/// Stores everything in memory and enforces the same uniqueness rules as the
/// database schema.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;
    use crate::agent::AgentProfile;
    use crate::client::ClientProfile;

    #[derive(Debug, Default)]
    struct State {
        users: HashMap<UserId, User>,
        clients: HashMap<ClientId, ClientProfile>,
        agents: HashMap<AgentId, AgentProfile>,
    }

    impl State {
        fn check_username(&self, user: &User) -> Result<(), PortError> {
            let taken = self
                .users
                .values()
                .any(|u| u.id != user.id && u.username == user.username);
            if taken {
                return Err(PortError::conflict(format!(
                    "username '{}' already exists",
                    user.username
                )));
            }
            Ok(())
        }

        fn check_client(&self, profile: &ClientProfile) -> Result<(), PortError> {
            let taken = self
                .clients
                .values()
                .any(|c| c.id != profile.id && c.identification == profile.identification);
            if taken {
                return Err(PortError::conflict(format!(
                    "identification '{}' already exists",
                    profile.identification
                )));
            }
            Ok(())
        }

        fn check_agent(&self, profile: &AgentProfile) -> Result<(), PortError> {
            let taken = self
                .agents
                .values()
                .any(|a| a.id != profile.id && a.agent_code == profile.agent_code);
            if taken {
                return Err(PortError::conflict(format!(
                    "agent code '{}' already exists",
                    profile.agent_code
                )));
            }
            Ok(())
        }

        fn client(&self, profile: &ClientProfile) -> Result<Client, PortError> {
            let user = self
                .users
                .get(&profile.user_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", profile.user_id))?;
            Ok(Client { user, profile: profile.clone() })
        }

        fn agent(&self, profile: &AgentProfile) -> Result<Agent, PortError> {
            let user = self
                .users
                .get(&profile.user_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", profile.user_id))?;
            Ok(Agent { user, profile: profile.clone() })
        }
    }

    /// In-memory mock implementation of PartyPort
    #[derive(Debug, Default, Clone)]
    pub struct MockPartyPort {
        state: Arc<RwLock<State>>,
    }

    impl MockPartyPort {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockPartyPort {}

    #[async_trait]
    impl HealthCheckable for MockPartyPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-party-port")
        }
    }

    #[async_trait]
    impl PartyPort for MockPartyPort {
        async fn create_user(&self, user: &User) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            state.check_username(user)?;
            state.users.insert(user.id, user.clone());
            Ok(())
        }

        async fn get_user(&self, id: UserId) -> Result<User, PortError> {
            self.state
                .read()
                .await
                .users
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", id))
        }

        async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .users
                .values()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn save_user(&self, user: &User) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if !state.users.contains_key(&user.id) {
                return Err(PortError::not_found("User", user.id));
            }
            state.check_username(user)?;
            state.users.insert(user.id, user.clone());
            Ok(())
        }

        async fn create_client(&self, client: &Client) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            state.check_username(&client.user)?;
            state.check_client(&client.profile)?;
            state.users.insert(client.user.id, client.user.clone());
            state.clients.insert(client.profile.id, client.profile.clone());
            Ok(())
        }

        async fn get_client(&self, id: ClientId) -> Result<Client, PortError> {
            let state = self.state.read().await;
            let profile = state
                .clients
                .get(&id)
                .ok_or_else(|| PortError::not_found("Client", id))?;
            state.client(profile)
        }

        async fn find_client_by_user(&self, user_id: UserId) -> Result<Option<Client>, PortError> {
            let state = self.state.read().await;
            state
                .clients
                .values()
                .find(|c| c.user_id == user_id)
                .map(|profile| state.client(profile))
                .transpose()
        }

        async fn list_clients(&self) -> Result<Vec<Client>, PortError> {
            let state = self.state.read().await;
            let mut clients = state
                .clients
                .values()
                .map(|profile| state.client(profile))
                .collect::<Result<Vec<_>, _>>()?;
            clients.sort_by_key(|c| c.profile.id);
            Ok(clients)
        }

        async fn save_client(&self, client: &Client) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if !state.clients.contains_key(&client.profile.id) {
                return Err(PortError::not_found("Client", client.profile.id));
            }
            state.check_username(&client.user)?;
            state.check_client(&client.profile)?;
            state.users.insert(client.user.id, client.user.clone());
            state.clients.insert(client.profile.id, client.profile.clone());
            Ok(())
        }

        async fn create_agent(&self, agent: &Agent) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            state.check_username(&agent.user)?;
            state.check_agent(&agent.profile)?;
            state.users.insert(agent.user.id, agent.user.clone());
            state.agents.insert(agent.profile.id, agent.profile.clone());
            Ok(())
        }

        async fn get_agent(&self, id: AgentId) -> Result<Agent, PortError> {
            let state = self.state.read().await;
            let profile = state
                .agents
                .get(&id)
                .ok_or_else(|| PortError::not_found("Agent", id))?;
            state.agent(profile)
        }

        async fn find_agent_by_user(&self, user_id: UserId) -> Result<Option<Agent>, PortError> {
            let state = self.state.read().await;
            state
                .agents
                .values()
                .find(|a| a.user_id == user_id)
                .map(|profile| state.agent(profile))
                .transpose()
        }

        async fn list_agents(&self) -> Result<Vec<Agent>, PortError> {
            let state = self.state.read().await;
            let mut agents = state
                .agents
                .values()
                .map(|profile| state.agent(profile))
                .collect::<Result<Vec<_>, _>>()?;
            agents.sort_by_key(|a| a.profile.id);
            Ok(agents)
        }

        async fn save_agent(&self, agent: &Agent) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if !state.agents.contains_key(&agent.profile.id) {
                return Err(PortError::not_found("Agent", agent.profile.id));
            }
            state.check_username(&agent.user)?;
            state.check_agent(&agent.profile)?;
            state.users.insert(agent.user.id, agent.user.clone());
            state.agents.insert(agent.profile.id, agent.profile.clone());
            Ok(())
        }
    }
}
