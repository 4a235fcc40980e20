//! Beneficiary management

use tracing::info;

use core_kernel::{BeneficiaryId, PolicyId};
use domain_party::Role;
use domain_policy::{ensure_share_available, Beneficiary, Policy};

use crate::dto::policy::CreateBeneficiaryRequest;
use crate::error::ApiError;
use crate::extract::Actor;
use crate::services::{viewable_policy, visible_policies};
use crate::AppState;

/// Clients edit beneficiaries of their own policies, staff of the policies
/// they manage
async fn editable_policy(state: &AppState, actor: &Actor, id: PolicyId) -> Result<Policy, ApiError> {
    let policy = state.policies.get_policy(id).await?;
    match actor.role() {
        Role::Client => actor.ensure_can_view(&policy)?,
        Role::Admin | Role::Agent => actor.ensure_can_manage(&policy)?,
    }
    Ok(policy)
}

pub async fn list(
    state: &AppState,
    actor: &Actor,
    policy_id: Option<PolicyId>,
) -> Result<Vec<Beneficiary>, ApiError> {
    if let Some(id) = policy_id {
        viewable_policy(state, actor, id).await?;
        return Ok(state.policies.list_beneficiaries(id).await?);
    }

    let mut beneficiaries = Vec::new();
    for policy in visible_policies(state, actor).await? {
        beneficiaries.extend(state.policies.list_beneficiaries(policy.id()).await?);
    }
    Ok(beneficiaries)
}

/// Adds a beneficiary; the policy's shares may not exceed 100%
pub async fn add(state: &AppState, actor: &Actor, req: CreateBeneficiaryRequest) -> Result<Beneficiary, ApiError> {
    let policy = editable_policy(state, actor, req.poliza.into()).await?;

    let existing = state.policies.list_beneficiaries(policy.id()).await?;
    ensure_share_available(&existing, req.porcentaje)?;

    let beneficiary = Beneficiary::new(
        policy.id(),
        req.nombre_completo,
        req.parentesco,
        req.porcentaje,
        req.fecha_nacimiento,
    )?;
    state.policies.add_beneficiary(&beneficiary).await?;

    info!(
        beneficiary_id = %beneficiary.id,
        policy_id = %policy.id(),
        percentage = %beneficiary.percentage,
        "beneficiary added"
    );
    Ok(beneficiary)
}

pub async fn remove(state: &AppState, actor: &Actor, id: BeneficiaryId) -> Result<(), ApiError> {
    let beneficiary = state.policies.get_beneficiary(id).await?;
    editable_policy(state, actor, beneficiary.policy_id).await?;
    state.policies.remove_beneficiary(id).await?;
    info!(beneficiary_id = %id, policy_id = %beneficiary.policy_id, "beneficiary removed");
    Ok(())
}
