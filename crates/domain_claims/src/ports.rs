//! Claims Domain Ports

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, PolicyId, PortError};

use crate::claim::Claim;

/// The port trait for claims domain operations
#[async_trait]
pub trait ClaimsPort: DomainPort + HealthCheckable {
    /// Stores a new claim
    ///
    /// Returns `PortError::Conflict` if the claim number is taken.
    async fn create_claim(&self, claim: &Claim) -> Result<(), PortError>;

    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// Persists status, amounts and resolution
    async fn save_claim(&self, claim: &Claim) -> Result<(), PortError>;

    /// All claims, or only those of one policy
    async fn list_claims(&self, policy_id: Option<PolicyId>) -> Result<Vec<Claim>, PortError>;
}

/// Mock implementation of ClaimsPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory mock implementation of ClaimsPort
    #[derive(Debug, Default, Clone)]
    pub struct MockClaimsPort {
        claims: Arc<RwLock<BTreeMap<ClaimId, Claim>>>,
    }

    impl MockClaimsPort {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockClaimsPort {}

    #[async_trait]
    impl HealthCheckable for MockClaimsPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-claims-port")
        }
    }

    #[async_trait]
    impl ClaimsPort for MockClaimsPort {
        async fn create_claim(&self, claim: &Claim) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            if claims.values().any(|c| c.claim_number == claim.claim_number) {
                return Err(PortError::conflict(format!(
                    "claim number '{}' already exists",
                    claim.claim_number
                )));
            }
            claims.insert(claim.id, claim.clone());
            Ok(())
        }

        async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.claims
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn save_claim(&self, claim: &Claim) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            match claims.get_mut(&claim.id) {
                Some(stored) => {
                    *stored = claim.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Claim", claim.id)),
            }
        }

        async fn list_claims(&self, policy_id: Option<PolicyId>) -> Result<Vec<Claim>, PortError> {
            Ok(self
                .claims
                .read()
                .await
                .values()
                .filter(|c| policy_id.map_or(true, |id| c.policy_id == id))
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockClaimsPort;
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    use core_kernel::ClientId;
    use domain_policy::{NewPolicy, Policy};

    use crate::claim::{ClaimStatus, ClaimType, NewClaim};

    fn reported(number: &str) -> Claim {
        let mut policy = Policy::quote(
            NewPolicy {
                client_id: ClientId::new(),
                agent_id: None,
                insured_sum: dec!(30000),
                annual_premium: dec!(360),
                monthly_premium: None,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                coverage: None,
            },
            "POL-60001".into(),
        )
        .unwrap();
        policy.activate().unwrap();

        Claim::report(
            &policy,
            NewClaim {
                claim_type: ClaimType::Hospitalizacion,
                incident_date: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
                description: "Fractura de tibia".into(),
                amount_claimed: dec!(800),
                documents: None,
            },
            number.to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_mock_port_round_trip() {
        let port = MockClaimsPort::new();
        let mut claim = reported("SIN-2024-000001");
        port.create_claim(&claim).await.unwrap();

        claim.approve(dec!(800), None, Utc::now().date_naive()).unwrap();
        port.save_claim(&claim).await.unwrap();

        let stored = port.get_claim(claim.id).await.unwrap();
        assert_eq!(stored.status, ClaimStatus::Approved);
        assert_eq!(port.list_claims(Some(claim.policy_id)).await.unwrap().len(), 1);
        assert!(port.list_claims(Some(PolicyId::new())).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_port_claim_number_unique() {
        let port = MockClaimsPort::new();
        port.create_claim(&reported("SIN-2024-000002")).await.unwrap();
        let err = port.create_claim(&reported("SIN-2024-000002")).await.unwrap_err();
        assert!(err.is_conflict());
    }
}
