//! Users and roles

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, UserId};
use crate::credentials::PasswordHash;
use crate::error::PartyError;

/// Authorization role carried by every user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "AGENTE")]
    Agent,
    #[serde(rename = "CLIENTE")]
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Agent => "AGENTE",
            Role::Client => "CLIENTE",
        }
    }

    /// Admins and agents operate on behalf of clients
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Agent)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "AGENTE" => Ok(Role::Agent),
            "CLIENTE" => Ok(Role::Client),
            _ => Err(CoreError::unknown_value("role", s)),
        }
    }
}

/// A login account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub identification: Option<String>,
    pub role: Role,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// Creates an active user
    pub fn new(
        username: impl Into<String>,
        role: Role,
        password_hash: PasswordHash,
    ) -> Result<Self, PartyError> {
        let username = username.into().trim().to_string();
        if username.is_empty() {
            return Err(PartyError::invalid("username must not be empty"));
        }

        Ok(Self {
            id: UserId::new_v7(),
            username,
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            identification: None,
            role,
            is_active: true,
            password_hash,
            registered_at: Utc::now(),
        })
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Checks a login attempt against this account
    pub fn authenticate(&self, password: &str) -> Result<(), PartyError> {
        if !self.password_hash.verify(password) {
            return Err(PartyError::InvalidCredentials);
        }
        if !self.is_active {
            return Err(PartyError::InactiveAccount);
        }
        Ok(())
    }

    /// Fails unless the user holds the given role
    pub fn ensure_role(&self, expected: Role) -> Result<(), PartyError> {
        if self.role != expected {
            return Err(PartyError::RoleMismatch {
                username: self.username.clone(),
                expected: expected.to_string(),
            });
        }
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn reactivate(&mut self) {
        self.is_active = true;
    }
}
