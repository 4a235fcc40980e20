//! PostgreSQL Policy Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AgentId, BeneficiaryId, ClientId, DomainPort, HealthCheckResult, HealthCheckable, NoteId,
    PolicyId, PortError,
};
use domain_policy::{Beneficiary, Policy, PolicyNote, PolicyPort};

use crate::repositories::PolicyRepository;

/// PostgreSQL-backed implementation of the PolicyPort trait
///
/// Adding a beneficiary locks the policy row, so the 100% share ceiling
/// holds under concurrent requests as well.
#[derive(Debug, Clone)]
pub struct PostgresPolicyAdapter {
    repository: PolicyRepository,
    pool: PgPool,
}

impl PostgresPolicyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PolicyRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresPolicyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPolicyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-policy-adapter").await
    }
}

#[async_trait]
impl PolicyPort for PostgresPolicyAdapter {
    #[instrument(skip(self, policy), fields(policy_id = %policy.id(), policy_number = %policy.policy_number()))]
    async fn create_policy(&self, policy: &Policy) -> Result<(), PortError> {
        debug!("Inserting policy");
        Ok(self.repository.insert(policy).await?)
    }

    #[instrument(skip(self), fields(policy_id = %id))]
    async fn get_policy(&self, id: PolicyId) -> Result<Policy, PortError> {
        debug!("Fetching policy by ID");
        Ok(self.repository.get(id).await?)
    }

    #[instrument(skip(self, policy), fields(policy_id = %policy.id(), status = %policy.status()))]
    async fn save_policy(&self, policy: &Policy) -> Result<(), PortError> {
        debug!("Updating policy");
        Ok(self.repository.update(policy).await?)
    }

    #[instrument(skip(self))]
    async fn list_policies(&self) -> Result<Vec<Policy>, PortError> {
        let policies = self.repository.list().await?;
        debug!(count = policies.len(), "Listed policies");
        Ok(policies)
    }

    #[instrument(skip(self), fields(client_id = %client_id))]
    async fn list_policies_by_client(&self, client_id: ClientId) -> Result<Vec<Policy>, PortError> {
        Ok(self.repository.find_by_client(client_id).await?)
    }

    #[instrument(skip(self), fields(agent_id = %agent_id))]
    async fn list_policies_for_agent(&self, agent_id: AgentId) -> Result<Vec<Policy>, PortError> {
        Ok(self.repository.find_for_agent(agent_id).await?)
    }

    #[instrument(skip(self, beneficiary), fields(policy_id = %beneficiary.policy_id, percentage = %beneficiary.percentage))]
    async fn add_beneficiary(&self, beneficiary: &Beneficiary) -> Result<(), PortError> {
        debug!("Inserting beneficiary");
        Ok(self.repository.insert_beneficiary(beneficiary).await?)
    }

    #[instrument(skip(self), fields(beneficiary_id = %id))]
    async fn get_beneficiary(&self, id: BeneficiaryId) -> Result<Beneficiary, PortError> {
        Ok(self.repository.get_beneficiary(id).await?)
    }

    #[instrument(skip(self), fields(policy_id = %policy_id))]
    async fn list_beneficiaries(&self, policy_id: PolicyId) -> Result<Vec<Beneficiary>, PortError> {
        Ok(self.repository.find_beneficiaries(policy_id).await?)
    }

    #[instrument(skip(self), fields(beneficiary_id = %id))]
    async fn remove_beneficiary(&self, id: BeneficiaryId) -> Result<(), PortError> {
        debug!("Deleting beneficiary");
        Ok(self.repository.delete_beneficiary(id).await?)
    }

    #[instrument(skip(self, note), fields(policy_id = %note.policy_id))]
    async fn create_note(&self, note: &PolicyNote) -> Result<(), PortError> {
        debug!("Inserting policy note");
        Ok(self.repository.insert_note(note).await?)
    }

    #[instrument(skip(self), fields(note_id = %id))]
    async fn get_note(&self, id: NoteId) -> Result<PolicyNote, PortError> {
        Ok(self.repository.get_note(id).await?)
    }

    #[instrument(skip(self))]
    async fn list_notes(&self, policy_id: Option<PolicyId>) -> Result<Vec<PolicyNote>, PortError> {
        Ok(self.repository.find_notes(policy_id).await?)
    }
}
