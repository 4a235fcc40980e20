//! HTTP API Layer
//!
//! REST API of the brokerage backend, built on Axum.
//!
//! # Architecture
//!
//! - **Handlers**: extract and convert request and response bodies
//! - **Services**: load aggregates through the ports, apply the domain rule, persist
//! - **Middleware**: JWT authentication, audit logging
//! - **DTOs**: request/response bodies of the public (Spanish) JSON contract
//! - **Error Handling**: consistent `{error, message, details?}` responses
//!
//! The router only sees the four domain ports, so the same router runs over
//! PostgreSQL in the binary and over the in-memory mocks in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(party, policies, billing, claims, config);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod extract;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_billing::BillingPort;
use domain_claims::ClaimsPort;
use domain_party::PartyPort;
use domain_policy::PolicyPort;

use crate::config::ApiConfig;
use crate::handlers::{auth as token, beneficiaries, billing, claims, health, notes, party, policy};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub party: Arc<dyn PartyPort>,
    pub policies: Arc<dyn PolicyPort>,
    pub billing: Arc<dyn BillingPort>,
    pub claims: Arc<dyn ClaimsPort>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(
        party: Arc<dyn PartyPort>,
        policies: Arc<dyn PolicyPort>,
        billing: Arc<dyn BillingPort>,
        claims: Arc<dyn ClaimsPort>,
        config: ApiConfig,
    ) -> Self {
        Self {
            party,
            policies,
            billing,
            claims,
            config: Arc::new(config),
        }
    }
}

/// Creates the main API router
///
/// Health checks, token endpoints and self-registration are public; every
/// other `/api` route requires a bearer access token.
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let public_api = Router::new()
        .route("/token/", post(token::obtain_token))
        .route("/token/refresh/", post(token::refresh_token))
        .route("/registro/", post(party::register))
        .layer(axum_middleware::from_fn(audit_middleware));

    // Clients
    let client_routes = Router::new()
        .route("/clientes/", get(party::list_clients).post(party::create_client))
        .route("/clientes/crear/", post(party::create_client))
        .route("/clientes/:id/", get(party::get_client).patch(party::update_client))
        .route("/clientes/:id/editar/", patch(party::update_client).put(party::update_client))
        .route("/clientes/:id/eliminar/", delete(party::deactivate_client))
        .route("/clientes/:id/reactivar/", patch(party::reactivate_client));

    // Agents
    let agent_routes = Router::new()
        .route("/agentes/", get(party::list_agents).post(party::create_agent))
        .route("/agentes/crear/", post(party::create_agent))
        .route("/agentes/:id/", get(party::get_agent))
        .route("/agentes/:id/editar/", patch(party::update_agent).put(party::update_agent))
        .route("/agentes/:id/eliminar/", delete(party::deactivate_agent))
        .route("/agentes/:id/reactivar/", patch(party::reactivate_agent));

    // Policies
    let policy_routes = Router::new()
        .route("/polizas/", get(policy::list_policies).post(policy::create_policy))
        .route("/polizas/solicitar/", post(policy::solicit_policy))
        .route("/polizas/:id/", get(policy::get_policy).patch(policy::update_policy))
        .route("/polizas/:id/aceptar/", post(policy::accept_policy))
        .route("/polizas/:id/activar/", post(policy::activate_policy))
        .route("/polizas/:id/cancelar/", post(policy::cancel_policy));

    let beneficiary_routes = Router::new()
        .route(
            "/beneficiarios/",
            get(beneficiaries::list_beneficiaries).post(beneficiaries::add_beneficiary),
        )
        .route("/beneficiarios/agregar/", post(beneficiaries::add_beneficiary))
        .route("/beneficiarios/:id/eliminar/", delete(beneficiaries::remove_beneficiary));

    let note_routes = Router::new()
        .route("/notas-poliza/", get(notes::list_notes).post(notes::create_note))
        .route("/notas-poliza/:id/", get(notes::get_note));

    // Billing
    let invoice_routes = Router::new()
        .route("/facturas/", get(billing::list_invoices).post(billing::create_invoice));

    let payment_routes = Router::new()
        .route("/pagos/", get(billing::list_payments).post(billing::record_payment))
        .route("/pagos/iniciar-qr/", post(billing::initiate_qr))
        .route("/pagos/estado/:id/", get(billing::payment_status))
        .route("/pagos/:id/confirmar/", post(billing::confirm_payment));

    // Claims
    let claim_routes = Router::new()
        .route("/siniestros/", get(claims::list_claims).post(claims::report_claim))
        .route("/siniestros/:id/", get(claims::get_claim).patch(claims::update_claim))
        .route("/siniestros/:id/aprobar/", post(claims::approve_claim))
        .route("/siniestros/:id/rechazar/", post(claims::reject_claim))
        .route("/siniestros/:id/pagar/", post(claims::pay_claim));

    // Protected API routes; auth runs first so the audit line carries the user
    let protected_api = Router::new()
        .merge(client_routes)
        .merge(agent_routes)
        .route("/agente/me/", get(party::own_agent).patch(party::update_own_agent))
        .merge(policy_routes)
        .merge(beneficiary_routes)
        .merge(note_routes)
        .merge(invoice_routes)
        .merge(payment_routes)
        .merge(claim_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes; every response carries an x-request-id
    Router::new()
        .merge(public_routes)
        .nest("/api", public_api.merge(protected_api))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
