//! Client and agent DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_party::{Agent, AgentStatus, Client, Role, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub telefono: Option<String>,
    pub identificacion: Option<String>,
    pub rol: Role,
    pub is_active: bool,
    pub fecha_registro: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            telefono: user.phone.clone(),
            identificacion: user.identification.clone(),
            rol: user.role,
            is_active: user.is_active,
            fecha_registro: user.registered_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub usuario_info: UserInfo,
    pub fecha_nacimiento: NaiveDate,
    pub direccion: String,
    pub identificacion: String,
    pub estado_salud: String,
}

impl From<&Client> for ClientResponse {
    fn from(client: &Client) -> Self {
        Self {
            id: *client.id().as_uuid(),
            usuario_info: UserInfo::from(&client.user),
            fecha_nacimiento: client.profile.birth_date,
            direccion: client.profile.address.clone(),
            identificacion: client.profile.identification.clone(),
            estado_salud: client.profile.health_status.clone(),
        }
    }
}

/// Client registration, used by staff and by self-registration
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 150, message = "must be 1 to 150 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "is not a valid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(length(max = 20))]
    pub telefono: Option<String>,
    pub fecha_nacimiento: NaiveDate,
    pub direccion: String,
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    pub identificacion: String,
    pub estado_salud: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(email(message = "is not a valid email address"))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(length(max = 20))]
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub direccion: Option<String>,
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    pub identificacion: Option<String>,
    pub estado_salud: Option<String>,
}

/// Result of deactivating a client
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientDeactivatedResponse {
    pub mensaje: String,
    pub polizas_inactivadas: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub id: Uuid,
    pub usuario_info: UserInfo,
    pub codigo_agente: String,
    pub fecha_contratacion: NaiveDate,
    pub especialidad: String,
    pub comision: Decimal,
    pub estado: AgentStatus,
    pub telefono_oficina: Option<String>,
    pub direccion_oficina: Option<String>,
}

impl From<&Agent> for AgentResponse {
    fn from(agent: &Agent) -> Self {
        Self {
            id: *agent.id().as_uuid(),
            usuario_info: UserInfo::from(&agent.user),
            codigo_agente: agent.profile.agent_code.clone(),
            fecha_contratacion: agent.profile.hire_date,
            especialidad: agent.profile.specialty.clone(),
            comision: agent.profile.commission,
            estado: agent.profile.status,
            telefono_oficina: agent.profile.office_phone.clone(),
            direccion_oficina: agent.profile.office_address.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAgentRequest {
    #[validate(length(min = 1, max = 150, message = "must be 1 to 150 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "is not a valid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(length(max = 20))]
    pub telefono: Option<String>,
    /// Drawn as `AGT-` plus four digits when absent
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    pub codigo_agente: Option<String>,
    /// Today when absent
    pub fecha_contratacion: Option<NaiveDate>,
    pub especialidad: Option<String>,
    pub comision: Option<Decimal>,
    #[validate(length(max = 20))]
    pub telefono_oficina: Option<String>,
    pub direccion_oficina: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAgentRequest {
    #[validate(email(message = "is not a valid email address"))]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(length(max = 20))]
    pub telefono: Option<String>,
    pub especialidad: Option<String>,
    pub comision: Option<Decimal>,
    pub estado: Option<AgentStatus>,
    #[validate(length(max = 20))]
    pub telefono_oficina: Option<String>,
    pub direccion_oficina: Option<String>,
}

/// Contact fields an agent may change on their own profile
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateOwnAgentRequest {
    #[validate(email(message = "is not a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub telefono: Option<String>,
    #[validate(length(max = 20))]
    pub telefono_oficina: Option<String>,
    pub direccion_oficina: Option<String>,
}

impl From<UpdateOwnAgentRequest> for UpdateAgentRequest {
    fn from(own: UpdateOwnAgentRequest) -> Self {
        Self {
            email: own.email,
            telefono: own.telefono,
            telefono_oficina: own.telefono_oficina,
            direccion_oficina: own.direccion_oficina,
            ..Self::default()
        }
    }
}
