//! Policy repository implementation
//!
//! Policies, their beneficiaries and their notes. Listings are ordered by
//! creation; beneficiaries have no timestamp and fall back to their
//! time-ordered identifier.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use core_kernel::{AgentId, BeneficiaryId, ClientId, NoteId, PolicyId, UserId};
use domain_policy::{
    Beneficiary, Policy, PolicyNote, PolicyRecord, PolicyStatus, MAX_TOTAL_SHARE,
};

use crate::error::DatabaseError;

const POLICY_COLUMNS: &str = "id, client_id, agent_id, policy_number, insured_sum, \
     annual_premium, monthly_premium, start_date, end_date, status, coverage, created_at";

const NOTE_COLUMNS: &str =
    "id, policy_id, author_id, title, content, note_type, created_at, updated_at";

/// Repository for policies, beneficiaries and policy notes
#[derive(Debug, Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    /// Creates a new PolicyRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Policies
    // ========================================================================

    pub async fn insert(&self, policy: &Policy) -> Result<(), DatabaseError> {
        insert_policy(&self.pool, policy).await
    }

    pub async fn get(&self, id: PolicyId) -> Result<Policy, DatabaseError> {
        let sql = format!("SELECT {POLICY_COLUMNS} FROM policies WHERE id = $1");
        sqlx::query_as::<_, PolicyRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Policy", id))?
            .try_into()
    }

    /// Writes status, agent and terms back; the number and owner never change
    pub async fn update(&self, policy: &Policy) -> Result<(), DatabaseError> {
        let record = policy.record();
        let result = sqlx::query(
            r#"
            UPDATE policies
            SET agent_id = $2, insured_sum = $3, annual_premium = $4, monthly_premium = $5,
                start_date = $6, end_date = $7, status = $8, coverage = $9
            WHERE id = $1
            "#,
        )
        .bind(*record.id.as_uuid())
        .bind(record.agent_id.map(Uuid::from))
        .bind(record.insured_sum)
        .bind(record.annual_premium)
        .bind(record.monthly_premium)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.status.as_str())
        .bind(&record.coverage)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Policy", record.id));
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Policy>, DatabaseError> {
        let sql = format!("SELECT {POLICY_COLUMNS} FROM policies ORDER BY created_at, id");
        self.fetch_policies(sqlx::query_as::<_, PolicyRow>(&sql)).await
    }

    pub async fn find_by_client(&self, client_id: ClientId) -> Result<Vec<Policy>, DatabaseError> {
        let sql = format!(
            "SELECT {POLICY_COLUMNS} FROM policies WHERE client_id = $1 ORDER BY created_at, id"
        );
        self.fetch_policies(sqlx::query_as::<_, PolicyRow>(&sql).bind(*client_id.as_uuid()))
            .await
    }

    /// Policies assigned to the agent plus unassigned solicitations
    pub async fn find_for_agent(&self, agent_id: AgentId) -> Result<Vec<Policy>, DatabaseError> {
        let sql = format!(
            "SELECT {POLICY_COLUMNS} FROM policies \
             WHERE agent_id = $1 OR (agent_id IS NULL AND status = $2) \
             ORDER BY created_at, id"
        );
        self.fetch_policies(
            sqlx::query_as::<_, PolicyRow>(&sql)
                .bind(*agent_id.as_uuid())
                .bind(PolicyStatus::Quoting.as_str()),
        )
        .await
    }

    async fn fetch_policies<'q>(
        &self,
        query: sqlx::query::QueryAs<'q, sqlx::Postgres, PolicyRow, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<Policy>, DatabaseError> {
        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Policy::try_from)
            .collect()
    }

    // ========================================================================
    // Beneficiaries
    // ========================================================================

    /// Inserts a beneficiary while holding a lock on the policy row
    ///
    /// The share total is re-checked under the lock so two concurrent
    /// additions cannot push a policy above 100%.
    pub async fn insert_beneficiary(&self, beneficiary: &Beneficiary) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM policies WHERE id = $1 FOR UPDATE")
            .bind(*beneficiary.policy_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(DatabaseError::not_found("Policy", beneficiary.policy_id));
        }

        let assigned = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(percentage), 0) FROM beneficiaries WHERE policy_id = $1",
        )
        .bind(*beneficiary.policy_id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;
        if assigned + beneficiary.percentage > MAX_TOTAL_SHARE {
            return Err(DatabaseError::ConstraintViolation(format!(
                "beneficiary shares would reach {}% (already assigned {}%)",
                assigned + beneficiary.percentage,
                assigned
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO beneficiaries (id, policy_id, full_name, relationship, percentage, birth_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*beneficiary.id.as_uuid())
        .bind(*beneficiary.policy_id.as_uuid())
        .bind(&beneficiary.full_name)
        .bind(&beneficiary.relationship)
        .bind(beneficiary.percentage)
        .bind(beneficiary.birth_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_beneficiary(&self, id: BeneficiaryId) -> Result<Beneficiary, DatabaseError> {
        sqlx::query_as::<_, BeneficiaryRow>(
            "SELECT id, policy_id, full_name, relationship, percentage, birth_date \
             FROM beneficiaries WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .map(Beneficiary::from)
        .ok_or_else(|| DatabaseError::not_found("Beneficiary", id))
    }

    pub async fn find_beneficiaries(&self, policy_id: PolicyId) -> Result<Vec<Beneficiary>, DatabaseError> {
        let rows = sqlx::query_as::<_, BeneficiaryRow>(
            "SELECT id, policy_id, full_name, relationship, percentage, birth_date \
             FROM beneficiaries WHERE policy_id = $1 ORDER BY id",
        )
        .bind(*policy_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Beneficiary::from).collect())
    }

    pub async fn delete_beneficiary(&self, id: BeneficiaryId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM beneficiaries WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Beneficiary", id));
        }
        Ok(())
    }

    // ========================================================================
    // Notes
    // ========================================================================

    pub async fn insert_note(&self, note: &PolicyNote) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO policy_notes (
                id, policy_id, author_id, title, content, note_type, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*note.id.as_uuid())
        .bind(*note.policy_id.as_uuid())
        .bind(*note.author_id.as_uuid())
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.note_type.as_str())
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_note(&self, id: NoteId) -> Result<PolicyNote, DatabaseError> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM policy_notes WHERE id = $1");
        sqlx::query_as::<_, NoteRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("PolicyNote", id))?
            .try_into()
    }

    pub async fn find_notes(&self, policy_id: Option<PolicyId>) -> Result<Vec<PolicyNote>, DatabaseError> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM policy_notes \
             WHERE $1::uuid IS NULL OR policy_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, NoteRow>(&sql)
            .bind(policy_id.map(Uuid::from))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(PolicyNote::try_from)
            .collect()
    }
}

/// Inserts a policy row; shared with the billing settlement transaction
pub(crate) async fn insert_policy<'e>(
    executor: impl PgExecutor<'e>,
    policy: &Policy,
) -> Result<(), DatabaseError> {
    let record = policy.record();
    sqlx::query(
        r#"
        INSERT INTO policies (
            id, client_id, agent_id, policy_number, insured_sum, annual_premium,
            monthly_premium, start_date, end_date, status, coverage, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(*record.id.as_uuid())
    .bind(*record.client_id.as_uuid())
    .bind(record.agent_id.map(Uuid::from))
    .bind(&record.policy_number)
    .bind(record.insured_sum)
    .bind(record.annual_premium)
    .bind(record.monthly_premium)
    .bind(record.start_date)
    .bind(record.end_date)
    .bind(record.status.as_str())
    .bind(&record.coverage)
    .bind(record.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

// =============================================================================
// Row types
// =============================================================================

/// Database row for a policy
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PolicyRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub policy_number: String,
    pub insured_sum: Decimal,
    pub annual_premium: Decimal,
    pub monthly_premium: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub coverage: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database row for a beneficiary
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BeneficiaryRow {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub full_name: String,
    pub relationship: String,
    pub percentage: Decimal,
    pub birth_date: Option<NaiveDate>,
}

/// Database row for a policy note
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NoteRow {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub note_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PolicyRow> for Policy {
    type Error = DatabaseError;

    fn try_from(row: PolicyRow) -> Result<Self, Self::Error> {
        Ok(Policy::restore(PolicyRecord {
            id: PolicyId::from_uuid(row.id),
            client_id: ClientId::from_uuid(row.client_id),
            agent_id: row.agent_id.map(AgentId::from_uuid),
            policy_number: row.policy_number,
            insured_sum: row.insured_sum,
            annual_premium: row.annual_premium,
            monthly_premium: row.monthly_premium,
            start_date: row.start_date,
            end_date: row.end_date,
            status: row
                .status
                .parse()
                .map_err(|e| DatabaseError::invalid_data("policies.status", e))?,
            coverage: row.coverage,
            created_at: row.created_at,
        }))
    }
}

impl From<BeneficiaryRow> for Beneficiary {
    fn from(row: BeneficiaryRow) -> Self {
        Beneficiary {
            id: BeneficiaryId::from_uuid(row.id),
            policy_id: PolicyId::from_uuid(row.policy_id),
            full_name: row.full_name,
            relationship: row.relationship,
            percentage: row.percentage,
            birth_date: row.birth_date,
        }
    }
}

impl TryFrom<NoteRow> for PolicyNote {
    type Error = DatabaseError;

    fn try_from(row: NoteRow) -> Result<Self, Self::Error> {
        Ok(PolicyNote {
            id: NoteId::from_uuid(row.id),
            policy_id: PolicyId::from_uuid(row.policy_id),
            author_id: UserId::from_uuid(row.author_id),
            title: row.title,
            content: row.content,
            note_type: row
                .note_type
                .parse()
                .map_err(|e| DatabaseError::invalid_data("policy_notes.note_type", e))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
