//! Party repository implementation
//!
//! Users live in `users`; clients and agents add a one-to-one row in
//! `client_profiles` or `agent_profiles`. Profiles are always read joined to
//! their user and written in the same transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use core_kernel::{AgentId, ClientId, UserId};
use domain_party::{Agent, AgentProfile, Client, ClientProfile, PasswordHash, User};

use crate::error::DatabaseError;

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.first_name, u.last_name, u.phone, \
     u.identification, u.role, u.is_active, u.password_hash, u.registered_at";

const CLIENT_SELECT: &str = "c.id AS profile_id, c.birth_date, c.address, \
     c.identification AS client_identification, c.health_status \
     FROM client_profiles c JOIN users u ON u.id = c.user_id";

const AGENT_SELECT: &str = "a.id AS profile_id, a.agent_code, a.hire_date, a.specialty, \
     a.commission, a.status AS agent_status, a.office_phone, a.office_address \
     FROM agent_profiles a JOIN users u ON u.id = a.user_id";

/// Repository for users, client profiles and agent profiles
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: PgPool,
}

impl PartyRepository {
    /// Creates a new PartyRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        insert_user(&self.pool, user).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("User", id))?
            .try_into()
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    pub async fn update_user(&self, user: &User) -> Result<(), DatabaseError> {
        update_user(&self.pool, user).await
    }

    // ========================================================================
    // Clients
    // ========================================================================

    /// Inserts the user and the profile in a single transaction
    pub async fn insert_client(&self, client: &Client) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        insert_user(&mut *tx, &client.user).await?;

        let profile = &client.profile;
        sqlx::query(
            r#"
            INSERT INTO client_profiles (
                id, user_id, birth_date, address, identification, health_status
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*profile.id.as_uuid())
        .bind(*profile.user_id.as_uuid())
        .bind(profile.birth_date)
        .bind(&profile.address)
        .bind(&profile.identification)
        .bind(&profile.health_status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_client(&self, id: ClientId) -> Result<Client, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS}, {CLIENT_SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, ClientRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Client", id))?
            .try_into()
    }

    pub async fn find_client_by_user(&self, user_id: UserId) -> Result<Option<Client>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS}, {CLIENT_SELECT} WHERE c.user_id = $1");
        sqlx::query_as::<_, ClientRow>(&sql)
            .bind(*user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(Client::try_from)
            .transpose()
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS}, {CLIENT_SELECT} ORDER BY u.registered_at, c.id");
        sqlx::query_as::<_, ClientRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Client::try_from)
            .collect()
    }

    pub async fn update_client(&self, client: &Client) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        update_user(&mut *tx, &client.user).await?;

        let profile = &client.profile;
        let result = sqlx::query(
            r#"
            UPDATE client_profiles
            SET birth_date = $2, address = $3, identification = $4, health_status = $5
            WHERE id = $1
            "#,
        )
        .bind(*profile.id.as_uuid())
        .bind(profile.birth_date)
        .bind(&profile.address)
        .bind(&profile.identification)
        .bind(&profile.health_status)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Client", profile.id));
        }
        tx.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Agents
    // ========================================================================

    /// Inserts the user and the profile in a single transaction
    pub async fn insert_agent(&self, agent: &Agent) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        insert_user(&mut *tx, &agent.user).await?;

        let profile = &agent.profile;
        sqlx::query(
            r#"
            INSERT INTO agent_profiles (
                id, user_id, agent_code, hire_date, specialty, commission,
                status, office_phone, office_address
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*profile.id.as_uuid())
        .bind(*profile.user_id.as_uuid())
        .bind(&profile.agent_code)
        .bind(profile.hire_date)
        .bind(&profile.specialty)
        .bind(profile.commission)
        .bind(profile.status.as_str())
        .bind(&profile.office_phone)
        .bind(&profile.office_address)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_agent(&self, id: AgentId) -> Result<Agent, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS}, {AGENT_SELECT} WHERE a.id = $1");
        sqlx::query_as::<_, AgentRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Agent", id))?
            .try_into()
    }

    pub async fn find_agent_by_user(&self, user_id: UserId) -> Result<Option<Agent>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS}, {AGENT_SELECT} WHERE a.user_id = $1");
        sqlx::query_as::<_, AgentRow>(&sql)
            .bind(*user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(Agent::try_from)
            .transpose()
    }

    pub async fn list_agents(&self) -> Result<Vec<Agent>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS}, {AGENT_SELECT} ORDER BY u.registered_at, a.id");
        sqlx::query_as::<_, AgentRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Agent::try_from)
            .collect()
    }

    pub async fn update_agent(&self, agent: &Agent) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        update_user(&mut *tx, &agent.user).await?;

        let profile = &agent.profile;
        let result = sqlx::query(
            r#"
            UPDATE agent_profiles
            SET agent_code = $2, hire_date = $3, specialty = $4, commission = $5,
                status = $6, office_phone = $7, office_address = $8
            WHERE id = $1
            "#,
        )
        .bind(*profile.id.as_uuid())
        .bind(&profile.agent_code)
        .bind(profile.hire_date)
        .bind(&profile.specialty)
        .bind(profile.commission)
        .bind(profile.status.as_str())
        .bind(&profile.office_phone)
        .bind(&profile.office_address)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Agent", profile.id));
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn insert_user<'e>(executor: impl PgExecutor<'e>, user: &User) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO users (
            id, username, email, first_name, last_name, phone, identification,
            role, is_active, password_hash, registered_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(*user.id.as_uuid())
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.phone)
    .bind(&user.identification)
    .bind(user.role.as_str())
    .bind(user.is_active)
    .bind(user.password_hash.as_str())
    .bind(user.registered_at)
    .execute(executor)
    .await?;
    Ok(())
}

async fn update_user<'e>(executor: impl PgExecutor<'e>, user: &User) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET username = $2, email = $3, first_name = $4, last_name = $5, phone = $6,
            identification = $7, role = $8, is_active = $9, password_hash = $10
        WHERE id = $1
        "#,
    )
    .bind(*user.id.as_uuid())
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.phone)
    .bind(&user.identification)
    .bind(user.role.as_str())
    .bind(user.is_active)
    .bind(user.password_hash.as_str())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("User", user.id));
    }
    Ok(())
}

// =============================================================================
// Row types
// =============================================================================

/// Database row for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub identification: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub password_hash: String,
    pub registered_at: DateTime<Utc>,
}

/// Database row for a client joined to its user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientRow {
    #[sqlx(flatten)]
    pub user: UserRow,
    pub profile_id: Uuid,
    pub birth_date: NaiveDate,
    pub address: String,
    pub client_identification: String,
    pub health_status: String,
}

/// Database row for an agent joined to its user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AgentRow {
    #[sqlx(flatten)]
    pub user: UserRow,
    pub profile_id: Uuid,
    pub agent_code: String,
    pub hire_date: NaiveDate,
    pub specialty: String,
    pub commission: Decimal,
    pub agent_status: String,
    pub office_phone: Option<String>,
    pub office_address: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::from_uuid(row.id),
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            identification: row.identification,
            role: row.role.parse().map_err(|e| DatabaseError::invalid_data("users.role", e))?,
            is_active: row.is_active,
            password_hash: PasswordHash::parse(row.password_hash)
                .map_err(|e| DatabaseError::invalid_data("users.password_hash", e))?,
            registered_at: row.registered_at,
        })
    }
}

impl TryFrom<ClientRow> for Client {
    type Error = DatabaseError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let user = User::try_from(row.user)?;
        let profile = ClientProfile {
            id: ClientId::from_uuid(row.profile_id),
            user_id: user.id,
            birth_date: row.birth_date,
            address: row.address,
            identification: row.client_identification,
            health_status: row.health_status,
        };
        Client::new(user, profile).map_err(|e| DatabaseError::invalid_data("client_profiles", e))
    }
}

impl TryFrom<AgentRow> for Agent {
    type Error = DatabaseError;

    fn try_from(row: AgentRow) -> Result<Self, Self::Error> {
        let user = User::try_from(row.user)?;
        let profile = AgentProfile {
            id: AgentId::from_uuid(row.profile_id),
            user_id: user.id,
            agent_code: row.agent_code,
            hire_date: row.hire_date,
            specialty: row.specialty,
            commission: row.commission,
            status: row
                .agent_status
                .parse()
                .map_err(|e| DatabaseError::invalid_data("agent_profiles.status", e))?,
            office_phone: row.office_phone,
            office_address: row.office_address,
        };
        Agent::new(user, profile).map_err(|e| DatabaseError::invalid_data("agent_profiles", e))
    }
}
