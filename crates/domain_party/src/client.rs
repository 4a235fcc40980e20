//! Client profiles

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, UserId};
use crate::error::PartyError;
use crate::user::{Role, User};

pub const DEFAULT_HEALTH_STATUS: &str = "Bueno";

/// Demographic and health data attached one-to-one to a client user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub id: ClientId,
    pub user_id: UserId,
    pub birth_date: NaiveDate,
    pub address: String,
    pub identification: String,
    pub health_status: String,
}

impl ClientProfile {
    pub fn new(
        user_id: UserId,
        birth_date: NaiveDate,
        address: impl Into<String>,
        identification: impl Into<String>,
    ) -> Result<Self, PartyError> {
        let identification = identification.into().trim().to_string();
        if identification.is_empty() {
            return Err(PartyError::invalid("identification must not be empty"));
        }

        Ok(Self {
            id: ClientId::new_v7(),
            user_id,
            birth_date,
            address: address.into(),
            identification,
            health_status: DEFAULT_HEALTH_STATUS.to_string(),
        })
    }

    pub fn with_health_status(mut self, health_status: impl Into<String>) -> Self {
        self.health_status = health_status.into();
        self
    }
}

/// A client user together with its profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub user: User,
    pub profile: ClientProfile,
}

impl Client {
    /// Pairs a user with its profile, checking the role and the link
    pub fn new(user: User, profile: ClientProfile) -> Result<Self, PartyError> {
        user.ensure_role(Role::Client)?;
        if profile.user_id != user.id {
            return Err(PartyError::invalid("profile belongs to a different user"));
        }
        Ok(Self { user, profile })
    }

    pub fn id(&self) -> ClientId {
        self.profile.id
    }

    pub fn is_active(&self) -> bool {
        self.user.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::PasswordHash;

    fn birth() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 4, 12).unwrap()
    }

    #[test]
    fn test_profile_defaults_health_status() {
        let profile = ClientProfile::new(UserId::new(), birth(), "Calle 1", "CI-1").unwrap();
        assert_eq!(profile.health_status, DEFAULT_HEALTH_STATUS);
    }

    #[test]
    fn test_profile_requires_identification() {
        assert!(ClientProfile::new(UserId::new(), birth(), "Calle 1", " ").is_err());
    }

    #[test]
    fn test_client_requires_client_role() {
        let agent = User::new("agente1", Role::Agent, PasswordHash::derive("x")).unwrap();
        let profile = ClientProfile::new(agent.id, birth(), "Calle 1", "CI-2").unwrap();
        assert!(matches!(
            Client::new(agent, profile),
            Err(PartyError::RoleMismatch { .. })
        ));
    }

    #[test]
    fn test_client_requires_matching_user() {
        let user = User::new("cliente1", Role::Client, PasswordHash::derive("x")).unwrap();
        let profile = ClientProfile::new(UserId::new(), birth(), "Calle 1", "CI-3").unwrap();
        assert!(Client::new(user, profile).is_err());
    }
}
