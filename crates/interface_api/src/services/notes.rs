//! Internal policy notes; staff only

use tracing::info;

use core_kernel::{NoteId, PolicyId};
use domain_party::Role;
use domain_policy::PolicyNote;

use crate::dto::policy::CreateNoteRequest;
use crate::error::ApiError;
use crate::extract::Actor;
use crate::services::{viewable_policy, visible_policy_ids};
use crate::AppState;

const STAFF: &[Role] = &[Role::Admin, Role::Agent];

pub async fn list(
    state: &AppState,
    actor: &Actor,
    policy_id: Option<PolicyId>,
) -> Result<Vec<PolicyNote>, ApiError> {
    actor.require(STAFF)?;
    if let Some(id) = policy_id {
        viewable_policy(state, actor, id).await?;
    }

    let notes = state.policies.list_notes(policy_id).await?;
    Ok(match visible_policy_ids(state, actor).await? {
        None => notes,
        Some(visible) => notes
            .into_iter()
            .filter(|n| visible.contains(&n.policy_id))
            .collect(),
    })
}

pub async fn create(state: &AppState, actor: &Actor, req: CreateNoteRequest) -> Result<PolicyNote, ApiError> {
    actor.require(STAFF)?;
    let policy = viewable_policy(state, actor, req.poliza.into()).await?;

    let note = PolicyNote::new(
        policy.id(),
        actor.user_id(),
        req.titulo,
        req.contenido,
        req.tipo_nota,
    )?;
    state.policies.create_note(&note).await?;

    info!(note_id = %note.id, policy_id = %policy.id(), kind = %note.note_type, "note added");
    Ok(note)
}

pub async fn get(state: &AppState, actor: &Actor, id: NoteId) -> Result<PolicyNote, ApiError> {
    actor.require(STAFF)?;
    let note = state.policies.get_note(id).await?;
    viewable_policy(state, actor, note.policy_id).await?;
    Ok(note)
}
