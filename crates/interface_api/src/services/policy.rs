//! Policy lifecycle
//!
//! ```text
//! POST /polizas/            staff     -> cotizacion, or activa + paid invoice (pago_inmediato)
//! POST /polizas/solicitar/  client    -> cotizacion, unassigned
//! POST /polizas/{id}/aceptar/         -> pendiente_pago + pending invoice
//! POST /polizas/{id}/activar/         -> activa, no payment check
//! POST /polizas/{id}/cancelar/        -> cancelada, only from cotizacion
//! ```

use tracing::{info, instrument};

use core_kernel::{AgentId, PolicyId, ReferenceNumber};
use domain_billing::{Invoice, Payment, PaymentMethod};
use domain_party::{Client, Role};
use domain_policy::{Beneficiary, NewPolicy, Policy, PolicyEvent};

use crate::dto::policy::{AcceptPolicyRequest, CreatePolicyRequest, SolicitPolicyRequest, UpdatePolicyRequest};
use crate::error::ApiError;
use crate::extract::Actor;
use crate::services::{manageable_policy, today, viewable_policy, visible_policies, NumberDraws};
use crate::AppState;

const STAFF: &[Role] = &[Role::Admin, Role::Agent];

const IMMEDIATE_PAYMENT_NOTE: &str = "Pago inmediato al emitir la poliza";

/// Writes the aggregate's pending events to the log
pub(crate) fn publish_events(policy: &mut Policy) {
    for event in policy.take_events() {
        match &event {
            PolicyEvent::StatusChanged { from, to, .. } => info!(
                policy_id = %event.policy_id(),
                from = %from,
                to = %to,
                "policy status changed"
            ),
            other => info!(
                policy_id = %other.policy_id(),
                event = other.event_type(),
                "policy event"
            ),
        }
    }
}

/// Policy detail: the policy, its client and its beneficiaries
#[derive(Debug)]
pub struct PolicyDetail {
    pub policy: Policy,
    pub client: Option<Client>,
    pub beneficiaries: Vec<Beneficiary>,
}

/// Outcome of a lifecycle step that emits billing documents
#[derive(Debug)]
pub struct Issued {
    pub policy: Policy,
    pub invoice: Option<Invoice>,
    pub payment: Option<Payment>,
}

pub async fn list(state: &AppState, actor: &Actor) -> Result<Vec<Policy>, ApiError> {
    visible_policies(state, actor).await
}

pub async fn detail(state: &AppState, actor: &Actor, id: PolicyId) -> Result<PolicyDetail, ApiError> {
    let policy = viewable_policy(state, actor, id).await?;
    let client = match state.party.get_client(policy.client_id()).await {
        Ok(client) => Some(client),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e.into()),
    };
    let beneficiaries = state.policies.list_beneficiaries(id).await?;
    Ok(PolicyDetail {
        policy,
        client,
        beneficiaries,
    })
}

async fn ensure_agent_exists(state: &AppState, id: AgentId) -> Result<(), ApiError> {
    match state.party.get_agent(id).await {
        Ok(_) => Ok(()),
        Err(e) if e.is_not_found() => Err(ApiError::validation(format!("agent {id} does not exist"))),
        Err(e) => Err(e.into()),
    }
}

/// Staff creation; agents are assigned to what they create
#[instrument(skip(state, actor, req), fields(client = %req.cliente))]
pub async fn create(state: &AppState, actor: &Actor, req: CreatePolicyRequest) -> Result<Issued, ApiError> {
    actor.require(STAFF)?;

    let client = match state.party.get_client(req.cliente.into()).await {
        Ok(client) => client,
        Err(e) if e.is_not_found() => {
            return Err(ApiError::validation(format!("client {} does not exist", req.cliente)))
        }
        Err(e) => return Err(e.into()),
    };
    if !client.is_active() {
        return Err(ApiError::validation("policies cannot be issued to an inactive client"));
    }

    let agent_id = match actor.agent_id() {
        Some(own) => Some(own),
        None => match req.agente.map(AgentId::from_uuid) {
            Some(id) => {
                ensure_agent_exists(state, id).await?;
                Some(id)
            }
            None => None,
        },
    };

    let mut policy = Policy::quote(
        NewPolicy {
            client_id: client.id(),
            agent_id,
            insured_sum: req.suma_asegurada,
            annual_premium: req.prima_anual,
            monthly_premium: req.prima_mensual,
            start_date: req.fecha_inicio,
            end_date: req.fecha_vencimiento,
            coverage: req.cobertura,
        },
        ReferenceNumber::Policy.generate(),
    )?;

    if !req.pago_inmediato {
        let mut draws = NumberDraws::new(ReferenceNumber::Policy);
        while let Err(e) = state.policies.create_policy(&policy).await {
            policy.renumber(draws.redraw(e)?);
        }
        publish_events(&mut policy);
        info!(policy_id = %policy.id(), number = %policy.policy_number(), "policy quoted");
        return Ok(Issued {
            policy,
            invoice: None,
            payment: None,
        });
    }

    policy.activate()?;
    let mut invoice = Invoice::settled_at_issue(
        policy.id(),
        ReferenceNumber::Invoice.generate(),
        policy.annual_premium(),
        today(),
    )?;
    let payment = Payment::new(
        invoice.id,
        invoice.amount,
        req.metodo_pago.unwrap_or(PaymentMethod::Efectivo),
    )?
    .with_reference(req.referencia_pago)
    .with_description(Some(IMMEDIATE_PAYMENT_NOTE.to_string()));

    // either number may be the one taken; both are redrawn
    let mut draws = NumberDraws::new(ReferenceNumber::Policy);
    while let Err(e) = state
        .billing
        .issue_policy_with_settlement(&policy, &invoice, &payment)
        .await
    {
        policy.renumber(draws.redraw(e)?);
        invoice.renumber(ReferenceNumber::Invoice.generate());
    }

    publish_events(&mut policy);
    info!(
        policy_id = %policy.id(),
        invoice = %invoice.invoice_number,
        amount = %payment.amount,
        "policy issued with immediate payment"
    );
    Ok(Issued {
        policy,
        invoice: Some(invoice),
        payment: Some(payment),
    })
}

/// A client asks for a policy; it waits unassigned in quoting
#[instrument(skip(state, actor, req))]
pub async fn solicit(state: &AppState, actor: &Actor, req: SolicitPolicyRequest) -> Result<Policy, ApiError> {
    actor.require(&[Role::Client])?;
    let client_id = actor
        .client_id()
        .ok_or_else(|| ApiError::forbidden("Only clients can request policies"))?;

    let mut policy = Policy::quote(
        NewPolicy {
            client_id,
            agent_id: None,
            insured_sum: req.suma_asegurada,
            annual_premium: req.prima_anual,
            monthly_premium: req.prima_mensual,
            start_date: req.fecha_inicio,
            end_date: req.fecha_vencimiento,
            coverage: req.cobertura,
        },
        ReferenceNumber::PolicySolicitation.generate(),
    )?;

    let mut draws = NumberDraws::new(ReferenceNumber::PolicySolicitation);
    while let Err(e) = state.policies.create_policy(&policy).await {
        policy.renumber(draws.redraw(e)?);
    }

    publish_events(&mut policy);
    info!(policy_id = %policy.id(), client_id = %client_id, "policy solicited");
    Ok(policy)
}

pub async fn update_terms(
    state: &AppState,
    actor: &Actor,
    id: PolicyId,
    req: UpdatePolicyRequest,
) -> Result<Policy, ApiError> {
    actor.require(STAFF)?;
    let mut policy = manageable_policy(state, actor, id).await?;
    policy.update_terms(req.into())?;
    state.policies.save_policy(&policy).await?;
    publish_events(&mut policy);
    Ok(policy)
}

/// An agent takes a solicitation: pending payment plus a pending invoice
#[instrument(skip(state, actor, req))]
pub async fn accept(
    state: &AppState,
    actor: &Actor,
    id: PolicyId,
    req: AcceptPolicyRequest,
) -> Result<Issued, ApiError> {
    actor.require(STAFF)?;
    let mut policy = manageable_policy(state, actor, id).await?;

    let agent_id = match (actor.agent_id(), req.agente.map(AgentId::from_uuid)) {
        (Some(own), _) => own,
        (None, Some(named)) => {
            ensure_agent_exists(state, named).await?;
            named
        }
        (None, None) => policy
            .agent_id()
            .ok_or_else(|| ApiError::validation("an agent must be named to accept this policy"))?,
    };

    policy.accept_solicitation(agent_id)?;

    let mut invoice = Invoice::with_due_window(
        policy.id(),
        ReferenceNumber::Invoice.generate(),
        policy.annual_premium(),
        today(),
        state.config.invoice_due_days,
    )?;
    let mut draws = NumberDraws::new(ReferenceNumber::Invoice);
    while let Err(e) = state.billing.create_invoice(&invoice).await {
        invoice.renumber(draws.redraw(e)?);
    }
    state.policies.save_policy(&policy).await?;

    publish_events(&mut policy);
    info!(
        policy_id = %id,
        agent_id = %agent_id,
        invoice = %invoice.invoice_number,
        due = %invoice.due_date,
        "solicitation accepted"
    );
    Ok(Issued {
        policy,
        invoice: Some(invoice),
        payment: None,
    })
}

/// Administrative activation without any payment check
pub async fn activate(state: &AppState, actor: &Actor, id: PolicyId) -> Result<Policy, ApiError> {
    actor.require(&[Role::Admin])?;
    let mut policy = state.policies.get_policy(id).await?;
    policy.activate()?;
    state.policies.save_policy(&policy).await?;
    publish_events(&mut policy);
    Ok(policy)
}

pub async fn cancel(state: &AppState, actor: &Actor, id: PolicyId) -> Result<Policy, ApiError> {
    actor.require(&[Role::Admin])?;
    let mut policy = state.policies.get_policy(id).await?;
    policy.cancel()?;
    state.policies.save_policy(&policy).await?;
    publish_events(&mut policy);
    Ok(policy)
}
