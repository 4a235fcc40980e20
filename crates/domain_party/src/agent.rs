//! Insurance agent management

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, CoreError, UserId};
use crate::error::PartyError;
use crate::user::{Role, User};

pub const DEFAULT_SPECIALTY: &str = "Seguros de Vida";

/// Agent employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentStatus {
    #[serde(rename = "activo")]
    Active,
    #[serde(rename = "inactivo")]
    Inactive,
    #[serde(rename = "vacaciones")]
    OnLeave,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "activo",
            AgentStatus::Inactive => "inactivo",
            AgentStatus::OnLeave => "vacaciones",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activo" => Ok(AgentStatus::Active),
            "inactivo" => Ok(AgentStatus::Inactive),
            "vacaciones" => Ok(AgentStatus::OnLeave),
            _ => Err(CoreError::unknown_value("agent status", s)),
        }
    }
}

/// Staff data attached one-to-one to an agent user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: AgentId,
    pub user_id: UserId,
    pub agent_code: String,
    pub hire_date: NaiveDate,
    pub specialty: String,
    /// Commission percentage
    pub commission: Decimal,
    pub status: AgentStatus,
    pub office_phone: Option<String>,
    pub office_address: Option<String>,
}

impl AgentProfile {
    pub fn new(
        user_id: UserId,
        agent_code: impl Into<String>,
        hire_date: NaiveDate,
    ) -> Result<Self, PartyError> {
        let agent_code = agent_code.into().trim().to_string();
        if agent_code.is_empty() {
            return Err(PartyError::invalid("agent code must not be empty"));
        }

        Ok(Self {
            id: AgentId::new_v7(),
            user_id,
            agent_code,
            hire_date,
            specialty: DEFAULT_SPECIALTY.to_string(),
            commission: dec!(10.0),
            status: AgentStatus::Active,
            office_phone: None,
            office_address: None,
        })
    }

    /// Sets the commission percentage, which must lie in [0, 100]
    pub fn set_commission(&mut self, commission: Decimal) -> Result<(), PartyError> {
        if commission < Decimal::ZERO || commission > dec!(100) {
            return Err(PartyError::invalid("commission must be between 0 and 100"));
        }
        self.commission = commission;
        Ok(())
    }
}

/// An agent user together with its profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub user: User,
    pub profile: AgentProfile,
}

impl Agent {
    pub fn new(user: User, profile: AgentProfile) -> Result<Self, PartyError> {
        user.ensure_role(Role::Agent)?;
        if profile.user_id != user.id {
            return Err(PartyError::invalid("profile belongs to a different user"));
        }
        Ok(Self { user, profile })
    }

    pub fn id(&self) -> AgentId {
        self.profile.id
    }

    /// Blocks login and marks the profile inactive
    pub fn deactivate(&mut self) {
        self.user.deactivate();
        self.profile.status = AgentStatus::Inactive;
    }

    pub fn reactivate(&mut self) {
        self.user.reactivate();
        self.profile.status = AgentStatus::Active;
    }
}
