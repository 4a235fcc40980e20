//! Policy Domain Ports
//!
//! `PolicyPort` persists policies together with their beneficiaries and
//! notes. The PostgreSQL adapter lives in `infra_db`.

use async_trait::async_trait;

use core_kernel::{
    AgentId, BeneficiaryId, ClientId, DomainPort, HealthCheckable, NoteId, PolicyId, PortError,
};

use crate::beneficiary::Beneficiary;
use crate::note::PolicyNote;
use crate::policy::Policy;

/// The port trait for policy domain operations
///
/// Listing methods return policies ordered by creation.
#[async_trait]
pub trait PolicyPort: DomainPort + HealthCheckable {
    // ========================================================================
    // Policies
    // ========================================================================

    /// Stores a new policy
    ///
    /// Returns `PortError::Conflict` if the policy number is taken.
    async fn create_policy(&self, policy: &Policy) -> Result<(), PortError>;

    async fn get_policy(&self, id: PolicyId) -> Result<Policy, PortError>;

    /// Persists status, agent and terms
    async fn save_policy(&self, policy: &Policy) -> Result<(), PortError>;

    async fn list_policies(&self) -> Result<Vec<Policy>, PortError>;

    async fn list_policies_by_client(&self, client_id: ClientId) -> Result<Vec<Policy>, PortError>;

    /// Policies assigned to the agent plus unassigned solicitations
    async fn list_policies_for_agent(&self, agent_id: AgentId) -> Result<Vec<Policy>, PortError>;

    // ========================================================================
    // Beneficiaries
    // ========================================================================

    async fn add_beneficiary(&self, beneficiary: &Beneficiary) -> Result<(), PortError>;

    async fn get_beneficiary(&self, id: BeneficiaryId) -> Result<Beneficiary, PortError>;

    async fn list_beneficiaries(&self, policy_id: PolicyId) -> Result<Vec<Beneficiary>, PortError>;

    async fn remove_beneficiary(&self, id: BeneficiaryId) -> Result<(), PortError>;

    // ========================================================================
    // Notes
    // ========================================================================

    async fn create_note(&self, note: &PolicyNote) -> Result<(), PortError>;

    async fn get_note(&self, id: NoteId) -> Result<PolicyNote, PortError>;

    /// All notes, or only those of one policy
    async fn list_notes(&self, policy_id: Option<PolicyId>) -> Result<Vec<PolicyNote>, PortError>;
}

/// Mock implementation of PolicyPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;
    use crate::policy::{PolicyRecord, PolicyStatus};

    #[derive(Debug, Default)]
    struct State {
        policies: BTreeMap<PolicyId, PolicyRecord>,
        beneficiaries: BTreeMap<BeneficiaryId, Beneficiary>,
        notes: BTreeMap<NoteId, PolicyNote>,
    }

    impl State {
        fn collect(&self, keep: impl Fn(&PolicyRecord) -> bool) -> Vec<Policy> {
            self.policies
                .values()
                .filter(|record| keep(record))
                .cloned()
                .map(Policy::restore)
                .collect()
        }
    }

    /// In-memory mock implementation of PolicyPort
    ///
    /// Ids are time-ordered, so `BTreeMap` iteration matches creation order.
    #[derive(Debug, Default, Clone)]
    pub struct MockPolicyPort {
        state: Arc<RwLock<State>>,
    }

    impl MockPolicyPort {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockPolicyPort {}

    #[async_trait]
    impl HealthCheckable for MockPolicyPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-policy-port")
        }
    }

    #[async_trait]
    impl PolicyPort for MockPolicyPort {
        async fn create_policy(&self, policy: &Policy) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state
                .policies
                .values()
                .any(|p| p.policy_number == policy.policy_number())
            {
                return Err(PortError::conflict(format!(
                    "policy number '{}' already exists",
                    policy.policy_number()
                )));
            }
            state.policies.insert(policy.id(), policy.record().clone());
            Ok(())
        }

        async fn get_policy(&self, id: PolicyId) -> Result<Policy, PortError> {
            self.state
                .read()
                .await
                .policies
                .get(&id)
                .cloned()
                .map(Policy::restore)
                .ok_or_else(|| PortError::not_found("Policy", id))
        }

        async fn save_policy(&self, policy: &Policy) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            match state.policies.get_mut(&policy.id()) {
                Some(record) => {
                    *record = policy.record().clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Policy", policy.id())),
            }
        }

        async fn list_policies(&self) -> Result<Vec<Policy>, PortError> {
            Ok(self.state.read().await.collect(|_| true))
        }

        async fn list_policies_by_client(&self, client_id: ClientId) -> Result<Vec<Policy>, PortError> {
            Ok(self.state.read().await.collect(|p| p.client_id == client_id))
        }

        async fn list_policies_for_agent(&self, agent_id: AgentId) -> Result<Vec<Policy>, PortError> {
            Ok(self.state.read().await.collect(|p| match p.agent_id {
                Some(assigned) => assigned == agent_id,
                None => p.status == PolicyStatus::Quoting,
            }))
        }

        async fn add_beneficiary(&self, beneficiary: &Beneficiary) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if !state.policies.contains_key(&beneficiary.policy_id) {
                return Err(PortError::not_found("Policy", beneficiary.policy_id));
            }
            state.beneficiaries.insert(beneficiary.id, beneficiary.clone());
            Ok(())
        }

        async fn get_beneficiary(&self, id: BeneficiaryId) -> Result<Beneficiary, PortError> {
            self.state
                .read()
                .await
                .beneficiaries
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Beneficiary", id))
        }

        async fn list_beneficiaries(&self, policy_id: PolicyId) -> Result<Vec<Beneficiary>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .beneficiaries
                .values()
                .filter(|b| b.policy_id == policy_id)
                .cloned()
                .collect())
        }

        async fn remove_beneficiary(&self, id: BeneficiaryId) -> Result<(), PortError> {
            self.state
                .write()
                .await
                .beneficiaries
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Beneficiary", id))
        }

        async fn create_note(&self, note: &PolicyNote) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if !state.policies.contains_key(&note.policy_id) {
                return Err(PortError::not_found("Policy", note.policy_id));
            }
            state.notes.insert(note.id, note.clone());
            Ok(())
        }

        async fn get_note(&self, id: NoteId) -> Result<PolicyNote, PortError> {
            self.state
                .read()
                .await
                .notes
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Note", id))
        }

        async fn list_notes(&self, policy_id: Option<PolicyId>) -> Result<Vec<PolicyNote>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .notes
                .values()
                .filter(|n| policy_id.map_or(true, |id| n.policy_id == id))
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockPolicyPort;
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::policy::{NewPolicy, PolicyStatus};

    fn quote(client_id: ClientId, agent_id: Option<AgentId>, number: &str) -> Policy {
        Policy::quote(
            NewPolicy {
                client_id,
                agent_id,
                insured_sum: dec!(50000),
                annual_premium: dec!(600),
                monthly_premium: None,
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                coverage: None,
            },
            number.to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_policy_number_is_unique() {
        let port = MockPolicyPort::new();
        port.create_policy(&quote(ClientId::new(), None, "POL-11111")).await.unwrap();

        let err = port
            .create_policy(&quote(ClientId::new(), None, "POL-11111"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_agent_sees_assigned_and_open_solicitations() {
        let port = MockPolicyPort::new();
        let me = AgentId::new();
        let other = AgentId::new();

        let mine = quote(ClientId::new(), Some(me), "POL-10001");
        let open = quote(ClientId::new(), None, "POL-10002");
        let theirs = quote(ClientId::new(), Some(other), "POL-10003");
        let mut closed = quote(ClientId::new(), None, "POL-10004");
        closed.cancel().unwrap();

        for p in [&mine, &open, &theirs, &closed] {
            port.create_policy(p).await.unwrap();
        }

        let visible: Vec<PolicyId> = port
            .list_policies_for_agent(me)
            .await
            .unwrap()
            .iter()
            .map(Policy::id)
            .collect();
        assert_eq!(visible, vec![mine.id(), open.id()]);
    }

    #[tokio::test]
    async fn test_save_policy_persists_status() {
        let port = MockPolicyPort::new();
        let mut policy = quote(ClientId::new(), None, "POL-20001");
        port.create_policy(&policy).await.unwrap();

        policy.activate().unwrap();
        port.save_policy(&policy).await.unwrap();

        let stored = port.get_policy(policy.id()).await.unwrap();
        assert_eq!(stored.status(), PolicyStatus::Active);
    }

    #[tokio::test]
    async fn test_beneficiaries_scoped_to_policy() {
        let port = MockPolicyPort::new();
        let a = quote(ClientId::new(), None, "POL-30001");
        let b = quote(ClientId::new(), None, "POL-30002");
        port.create_policy(&a).await.unwrap();
        port.create_policy(&b).await.unwrap();

        let ben = Beneficiary::new(a.id(), "Luis Mamani", "hijo", dec!(50), None).unwrap();
        port.add_beneficiary(&ben).await.unwrap();

        assert_eq!(port.list_beneficiaries(a.id()).await.unwrap().len(), 1);
        assert!(port.list_beneficiaries(b.id()).await.unwrap().is_empty());

        port.remove_beneficiary(ben.id).await.unwrap();
        assert!(port.remove_beneficiary(ben.id).await.unwrap_err().is_not_found());
    }
}
