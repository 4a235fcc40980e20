//! Claim reporting and resolution

use tracing::{info, instrument};

use core_kernel::{ClaimId, PolicyId, ReferenceNumber};
use domain_claims::{Claim, NewClaim};
use domain_party::Role;

use crate::dto::claims::{ApproveClaimRequest, CreateClaimRequest, RejectClaimRequest, UpdateClaimRequest};
use crate::error::ApiError;
use crate::extract::Actor;
use crate::services::{manageable_policy, today, viewable_policy, visible_policy_ids, NumberDraws};
use crate::AppState;

const STAFF: &[Role] = &[Role::Admin, Role::Agent];

pub async fn list(state: &AppState, actor: &Actor, policy_id: Option<PolicyId>) -> Result<Vec<Claim>, ApiError> {
    if let Some(id) = policy_id {
        viewable_policy(state, actor, id).await?;
    }
    let claims = state.claims.list_claims(policy_id).await?;
    Ok(match visible_policy_ids(state, actor).await? {
        None => claims,
        Some(visible) => claims
            .into_iter()
            .filter(|c| visible.contains(&c.policy_id))
            .collect(),
    })
}

/// Reports a loss against an active policy the caller can see
#[instrument(skip(state, actor, req), fields(policy = %req.poliza))]
pub async fn report(state: &AppState, actor: &Actor, req: CreateClaimRequest) -> Result<Claim, ApiError> {
    let policy = viewable_policy(state, actor, req.poliza.into()).await?;

    let new: NewClaim = req.into();
    let mut claim = Claim::report(&policy, new, ReferenceNumber::Claim.generate())?;
    let mut draws = NumberDraws::new(ReferenceNumber::Claim);
    while let Err(e) = state.claims.create_claim(&claim).await {
        claim.renumber(draws.redraw(e)?);
    }

    info!(
        claim_id = %claim.id,
        number = %claim.claim_number,
        kind = %claim.claim_type,
        amount = %claim.amount_claimed,
        "claim reported"
    );
    Ok(claim)
}

pub async fn get(state: &AppState, actor: &Actor, id: ClaimId) -> Result<Claim, ApiError> {
    let claim = state.claims.get_claim(id).await?;
    viewable_policy(state, actor, claim.policy_id).await?;
    Ok(claim)
}

/// Loads a claim whose policy the staff caller manages
async fn managed_claim(state: &AppState, actor: &Actor, id: ClaimId) -> Result<Claim, ApiError> {
    actor.require(STAFF)?;
    let claim = state.claims.get_claim(id).await?;
    manageable_policy(state, actor, claim.policy_id).await?;
    Ok(claim)
}

/// Field edit; resolution goes through approve, reject and pay
pub async fn update(
    state: &AppState,
    actor: &Actor,
    id: ClaimId,
    req: UpdateClaimRequest,
) -> Result<Claim, ApiError> {
    let mut claim = managed_claim(state, actor, id).await?;
    if let Some(status) = req.estado {
        if !status.is_open() {
            return Err(ApiError::validation(format!(
                "status {status} cannot be set here; use the approve, reject or pay operations"
            )));
        }
    }

    let from = claim.status;
    claim.apply_update(req.into(), today())?;
    state.claims.save_claim(&claim).await?;
    if claim.status != from {
        info!(claim_id = %id, from = %from, to = %claim.status, "claim status changed");
    }
    Ok(claim)
}

pub async fn approve(
    state: &AppState,
    actor: &Actor,
    id: ClaimId,
    req: ApproveClaimRequest,
) -> Result<Claim, ApiError> {
    let mut claim = managed_claim(state, actor, id).await?;
    claim.approve(req.monto_aprobado, req.resolucion, today())?;
    state.claims.save_claim(&claim).await?;
    info!(claim_id = %id, amount = %req.monto_aprobado, "claim approved");
    Ok(claim)
}

pub async fn reject(
    state: &AppState,
    actor: &Actor,
    id: ClaimId,
    req: RejectClaimRequest,
) -> Result<Claim, ApiError> {
    let mut claim = managed_claim(state, actor, id).await?;
    claim.reject(req.resolucion, today())?;
    state.claims.save_claim(&claim).await?;
    info!(claim_id = %id, "claim rejected");
    Ok(claim)
}

/// Records the payout of an approved claim
pub async fn pay(state: &AppState, actor: &Actor, id: ClaimId) -> Result<Claim, ApiError> {
    actor.require(&[Role::Admin])?;
    let mut claim = state.claims.get_claim(id).await?;
    claim.mark_paid()?;
    state.claims.save_claim(&claim).await?;
    info!(claim_id = %id, "claim paid");
    Ok(claim)
}
