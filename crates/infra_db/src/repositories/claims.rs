//! Claims repository implementation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ClaimId, PolicyId};
use domain_claims::Claim;

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = "id, policy_id, claim_number, claim_type, incident_date, \
     reported_at, description, amount_claimed, amount_approved, status, documents, \
     resolution, resolution_date";

/// Repository for claims
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    /// Creates a new ClaimsRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, claim: &Claim) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO claims (
                id, policy_id, claim_number, claim_type, incident_date, reported_at,
                description, amount_claimed, amount_approved, status, documents,
                resolution, resolution_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(*claim.id.as_uuid())
        .bind(*claim.policy_id.as_uuid())
        .bind(&claim.claim_number)
        .bind(claim.claim_type.as_str())
        .bind(claim.incident_date)
        .bind(claim.reported_at)
        .bind(&claim.description)
        .bind(claim.amount_claimed)
        .bind(claim.amount_approved)
        .bind(claim.status.as_str())
        .bind(&claim.documents)
        .bind(&claim.resolution)
        .bind(claim.resolution_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, id: ClaimId) -> Result<Claim, DatabaseError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE id = $1");
        sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Claim", id))?
            .try_into()
    }

    /// Writes the mutable fields: description, documents, amounts, status
    /// and resolution
    pub async fn update(&self, claim: &Claim) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE claims
            SET description = $2, documents = $3, amount_approved = $4, status = $5,
                resolution = $6, resolution_date = $7
            WHERE id = $1
            "#,
        )
        .bind(*claim.id.as_uuid())
        .bind(&claim.description)
        .bind(&claim.documents)
        .bind(claim.amount_approved)
        .bind(claim.status.as_str())
        .bind(&claim.resolution)
        .bind(claim.resolution_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Claim", claim.id));
        }
        Ok(())
    }

    pub async fn find(&self, policy_id: Option<PolicyId>) -> Result<Vec<Claim>, DatabaseError> {
        let sql = format!(
            "SELECT {CLAIM_COLUMNS} FROM claims \
             WHERE $1::uuid IS NULL OR policy_id = $1 \
             ORDER BY reported_at, id"
        );
        sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(policy_id.map(Uuid::from))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Claim::try_from)
            .collect()
    }
}

/// Database row for a claim
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub claim_number: String,
    pub claim_type: String,
    pub incident_date: NaiveDate,
    pub reported_at: DateTime<Utc>,
    pub description: String,
    pub amount_claimed: Decimal,
    pub amount_approved: Option<Decimal>,
    pub status: String,
    pub documents: Option<String>,
    pub resolution: Option<String>,
    pub resolution_date: Option<NaiveDate>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        Ok(Claim {
            id: ClaimId::from_uuid(row.id),
            policy_id: PolicyId::from_uuid(row.policy_id),
            claim_number: row.claim_number,
            claim_type: row
                .claim_type
                .parse()
                .map_err(|e| DatabaseError::invalid_data("claims.claim_type", e))?,
            incident_date: row.incident_date,
            reported_at: row.reported_at,
            description: row.description,
            amount_claimed: row.amount_claimed,
            amount_approved: row.amount_approved,
            status: row
                .status
                .parse()
                .map_err(|e| DatabaseError::invalid_data("claims.status", e))?,
            documents: row.documents,
            resolution: row.resolution,
            resolution_date: row.resolution_date,
        })
    }
}
