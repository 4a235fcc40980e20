//! Application services
//!
//! Handlers parse and authorize the request shape; services load the
//! aggregates through the ports, apply the domain operation and persist the
//! result. Every service takes the resolved [`Actor`] and enforces its
//! scope before touching anything.

pub mod party;
pub mod policy;
pub mod beneficiaries;
pub mod notes;
pub mod billing;
pub mod claims;

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use core_kernel::{numbering::MAX_DRAWS, PolicyId, PortError, ReferenceNumber};
use domain_policy::Policy;

use crate::error::ApiError;
use crate::extract::{Actor, Scope};
use crate::AppState;

/// Successive draws of a reference number for one insert
///
/// ```rust,ignore
/// let mut draws = NumberDraws::new(ReferenceNumber::Claim);
/// while let Err(e) = state.claims.create_claim(&claim).await {
///     claim.renumber(draws.redraw(e)?);
/// }
/// ```
#[derive(Debug)]
pub(crate) struct NumberDraws {
    kind: ReferenceNumber,
    made: usize,
}

impl NumberDraws {
    /// The caller has already drawn the first number
    pub(crate) fn new(kind: ReferenceNumber) -> Self {
        Self { kind, made: 1 }
    }

    /// Next number to try after a failed insert, or the error to give up with
    pub(crate) fn redraw(&mut self, error: PortError) -> Result<String, ApiError> {
        if !error.is_conflict() {
            return Err(error.into());
        }
        if self.made >= MAX_DRAWS {
            warn!(kind = ?self.kind, draws = self.made, "reference numbers exhausted");
            return Err(error.into());
        }
        self.made += 1;
        debug!(kind = ?self.kind, draw = self.made, "reference number taken, drawing again");
        Ok(self.kind.generate())
    }
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Every policy the caller may see
pub(crate) async fn visible_policies(state: &AppState, actor: &Actor) -> Result<Vec<Policy>, ApiError> {
    let policies = match actor.scope {
        Scope::Admin => state.policies.list_policies().await?,
        Scope::Agent(agent_id) => state.policies.list_policies_for_agent(agent_id).await?,
        Scope::Client(client_id) => state.policies.list_policies_by_client(client_id).await?,
    };
    Ok(policies)
}

/// Ids of the policies the caller may see; `None` means no restriction
pub(crate) async fn visible_policy_ids(
    state: &AppState,
    actor: &Actor,
) -> Result<Option<HashSet<PolicyId>>, ApiError> {
    if actor.scope == Scope::Admin {
        return Ok(None);
    }
    let ids = visible_policies(state, actor)
        .await?
        .iter()
        .map(Policy::id)
        .collect();
    Ok(Some(ids))
}

/// Loads a policy the caller may see
pub(crate) async fn viewable_policy(
    state: &AppState,
    actor: &Actor,
    id: PolicyId,
) -> Result<Policy, ApiError> {
    let policy = state.policies.get_policy(id).await?;
    actor.ensure_can_view(&policy)?;
    Ok(policy)
}

/// Loads a policy the caller may change
pub(crate) async fn manageable_policy(
    state: &AppState,
    actor: &Actor,
    id: PolicyId,
) -> Result<Policy, ApiError> {
    let policy = state.policies.get_policy(id).await?;
    actor.ensure_can_manage(&policy)?;
    Ok(policy)
}
