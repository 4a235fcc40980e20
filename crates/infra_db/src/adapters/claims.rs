//! PostgreSQL Claims Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PolicyId, PortError};
use domain_claims::{Claim, ClaimsPort};

use crate::repositories::ClaimsRepository;

/// PostgreSQL-backed implementation of the ClaimsPort trait
#[derive(Debug, Clone)]
pub struct PostgresClaimsAdapter {
    repository: ClaimsRepository,
    pool: PgPool,
}

impl PostgresClaimsAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresClaimsAdapter {}

#[async_trait]
impl HealthCheckable for PostgresClaimsAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-claims-adapter").await
    }
}

#[async_trait]
impl ClaimsPort for PostgresClaimsAdapter {
    #[instrument(skip(self, claim), fields(claim_number = %claim.claim_number, policy_id = %claim.policy_id))]
    async fn create_claim(&self, claim: &Claim) -> Result<(), PortError> {
        debug!("Inserting claim");
        Ok(self.repository.insert(claim).await?)
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        debug!("Fetching claim by ID");
        Ok(self.repository.get(id).await?)
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id, status = %claim.status.as_str()))]
    async fn save_claim(&self, claim: &Claim) -> Result<(), PortError> {
        debug!("Updating claim");
        Ok(self.repository.update(claim).await?)
    }

    #[instrument(skip(self))]
    async fn list_claims(&self, policy_id: Option<PolicyId>) -> Result<Vec<Claim>, PortError> {
        Ok(self.repository.find(policy_id).await?)
    }
}
