//! HTTP tests for the brokerage API
//!
//! The router runs over the in-memory mock ports; every test seeds an admin
//! and drives the API through bearer tokens obtained from `/api/token/`.

use std::str::FromStr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use domain_billing::MockBillingPort;
use domain_claims::MockClaimsPort;
use domain_party::{MockPartyPort, PartyPort, PasswordHash, Role, User};
use domain_policy::MockPolicyPort;
use interface_api::config::ApiConfig;
use interface_api::{create_router, services, AppState};

const ADMIN_PASSWORD: &str = "admin-pass-123";
const CLIENT_PASSWORD: &str = "cliente-pass-123";

struct Api {
    server: TestServer,
    admin: String,
}

fn mock_state(party: MockPartyPort) -> AppState {
    let policies = MockPolicyPort::new();
    let billing = MockBillingPort::new(policies.clone());
    AppState::new(
        Arc::new(party),
        Arc::new(policies),
        Arc::new(billing),
        Arc::new(MockClaimsPort::new()),
        ApiConfig {
            jwt_secret: "test-secret".to_string(),
            ..ApiConfig::default()
        },
    )
}

async fn setup() -> Api {
    let party = MockPartyPort::new();
    let admin = User::new("admin", Role::Admin, PasswordHash::derive(ADMIN_PASSWORD)).unwrap();
    party.create_user(&admin).await.unwrap();

    let state = mock_state(party);
    let server = TestServer::new(create_router(state)).unwrap();
    let admin = login(&server, "admin", ADMIN_PASSWORD).await;
    Api { server, admin }
}

async fn login(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/api/token/")
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["access"].as_str().unwrap().to_string()
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

fn id(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

impl Api {
    async fn create_client(&self, username: &str, identification: &str) -> String {
        let response = self
            .server
            .post("/api/clientes/")
            .authorization_bearer(&self.admin)
            .json(&json!({
                "username": username,
                "password": CLIENT_PASSWORD,
                "email": format!("{username}@example.com"),
                "first_name": "Ana",
                "last_name": "Quispe",
                "fecha_nacimiento": "1990-05-14",
                "direccion": "Av. Arce 2105, La Paz",
                "identificacion": identification,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        id(&response.json())
    }

    async fn create_policy(&self, client: &str, immediate: bool) -> Value {
        let response = self
            .server
            .post("/api/polizas/")
            .authorization_bearer(&self.admin)
            .json(&json!({
                "cliente": client,
                "suma_asegurada": "10000",
                "prima_anual": "1200",
                "fecha_inicio": "2025-01-01",
                "fecha_vencimiento": "2026-01-01",
                "cobertura": "Vida entera",
                "pago_inmediato": immediate,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    async fn create_invoice(&self, policy: &str) -> Value {
        let response = self
            .server
            .post("/api/facturas/")
            .authorization_bearer(&self.admin)
            .json(&json!({ "poliza": policy }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    async fn pay(&self, invoice: &str, amount: &str) -> (StatusCode, Value) {
        let response = self
            .server
            .post("/api/pagos/")
            .authorization_bearer(&self.admin)
            .json(&json!({ "factura": invoice, "monto_pagado": amount, "metodo_pago": "efectivo" }))
            .await;
        (response.status_code(), response.json())
    }

    /// Creates an agent and returns its JSON and an access token
    async fn create_agent(&self, username: &str) -> (Value, String) {
        let response = self
            .server
            .post("/api/agentes/")
            .authorization_bearer(&self.admin)
            .json(&json!({
                "username": username,
                "password": "agente-pass-123",
                "first_name": "Carlos",
                "last_name": "Mamani",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let token = login(&self.server, username, "agente-pass-123").await;
        (response.json(), token)
    }

    async fn policy_status(&self, policy: &str) -> String {
        let response = self
            .server
            .get(&format!("/api/polizas/{policy}/"))
            .authorization_bearer(&self.admin)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["estado"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_endpoints_are_public() {
    let api = setup().await;
    let live = api.server.get("/health").await;
    live.assert_status_ok();
    assert!(live.headers().contains_key("x-request-id"));

    let ready = api.server.get("/health/ready").await;
    ready.assert_status_ok();
    let body: Value = ready.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["adapters"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let api = setup().await;
    api.server
        .get("/api/polizas/")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    api.server
        .get("/api/polizas/")
        .authorization_bearer("not-a-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let api = setup().await;
    api.server
        .post("/api/token/")
        .json(&json!({ "username": "admin", "password": "wrong-password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let api = setup().await;
    let pair: Value = api
        .server
        .post("/api/token/")
        .json(&json!({ "username": "admin", "password": ADMIN_PASSWORD }))
        .await
        .json();

    let refreshed = api
        .server
        .post("/api/token/refresh/")
        .json(&json!({ "refresh": pair["refresh"] }))
        .await;
    refreshed.assert_status_ok();
    let access = refreshed.json::<Value>()["access"].as_str().unwrap().to_string();

    api.server
        .get("/api/polizas/")
        .authorization_bearer(&access)
        .await
        .assert_status_ok();

    // an access token is not a refresh token
    api.server
        .post("/api/token/refresh/")
        .json(&json!({ "refresh": pair["access"] }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_client_cannot_use_staff_routes() {
    let api = setup().await;
    api.create_client("ana", "4829301").await;
    let token = login(&api.server, "ana", CLIENT_PASSWORD).await;

    api.server
        .get("/api/clientes/")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    api.server
        .get("/api/agentes/")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let api = setup().await;
    api.create_client("ana", "4829301").await;
    api.server
        .post("/api/registro/")
        .json(&json!({
            "username": "ana",
            "password": CLIENT_PASSWORD,
            "fecha_nacimiento": "1990-05-14",
            "direccion": "Calle 21, Calacoto",
            "identificacion": "7777777",
        }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_body_lists_field_details() {
    let api = setup().await;
    let response = api
        .server
        .post("/api/registro/")
        .json(&json!({
            "username": "bob",
            "password": "short",
            "fecha_nacimiento": "1990-05-14",
            "direccion": "Calle 21",
            "identificacion": "123",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"][0].as_str().unwrap().starts_with("password"));
}

#[tokio::test]
async fn test_monthly_premium_is_derived() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = api.create_policy(&client, false).await;

    assert_eq!(policy["estado"], "cotizacion");
    assert_eq!(decimal(&policy["prima_mensual"]), dec!(100));
    assert!(policy["numero_poliza"].as_str().unwrap().starts_with("POL-"));
    assert!(policy.get("factura").is_none());
}

#[tokio::test]
async fn test_immediate_payment_issues_active_policy() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = api.create_policy(&client, true).await;

    assert_eq!(policy["estado"], "activa");
    assert_eq!(policy["factura"]["estado"], "pagada");
    assert_eq!(decimal(&policy["factura"]["monto"]), dec!(1200));
    assert_eq!(policy["pago"]["estado"], "completado");
    assert_eq!(policy["pago"]["metodo_pago"], "efectivo");

    let invoices: Value = api
        .server
        .get("/api/facturas/")
        .add_query_param("poliza_id", id(&policy))
        .authorization_bearer(&api.admin)
        .await
        .json();
    assert_eq!(invoices.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_two_partial_payments_settle_invoice_and_activate_policy() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = id(&api.create_policy(&client, false).await);
    let invoice = api.create_invoice(&policy).await;
    assert_eq!(decimal(&invoice["monto"]), dec!(1200));
    let invoice = id(&invoice);

    let (status, first) = api.pay(&invoice, "600").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["factura_estado"], "pendiente");
    assert_eq!(first["poliza_estado"], "cotizacion");

    let (status, second) = api.pay(&invoice, "600").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["factura_estado"], "pagada");
    assert_eq!(second["poliza_estado"], "activa");
    assert_eq!(api.policy_status(&policy).await, "activa");

    // a paid invoice takes no more money
    let (status, _) = api.pay(&invoice, "1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overpayment_is_rejected() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = id(&api.create_policy(&client, false).await);
    let invoice = id(&api.create_invoice(&policy).await);

    let (status, body) = api.pay(&invoice, "1300").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("outstanding"));
    assert_eq!(api.policy_status(&policy).await, "cotizacion");
}

#[tokio::test]
async fn test_cancel_only_from_quoting() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = id(&api.create_policy(&client, false).await);

    api.server
        .post(&format!("/api/polizas/{policy}/activar/"))
        .authorization_bearer(&api.admin)
        .await
        .assert_status_ok();

    let response = api
        .server
        .post(&format!("/api/polizas/{policy}/cancelar/"))
        .authorization_bearer(&api.admin)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Only policies in quoting status can be cancelled"));

    let quoting = id(&api.create_policy(&client, false).await);
    let cancelled = api
        .server
        .post(&format!("/api/polizas/{quoting}/cancelar/"))
        .authorization_bearer(&api.admin)
        .await;
    cancelled.assert_status_ok();
    assert_eq!(cancelled.json::<Value>()["estado"], "cancelada");
}

#[tokio::test]
async fn test_approved_amount_ceiling_on_both_paths() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = id(&api.create_policy(&client, true).await);

    let claim = api
        .server
        .post("/api/siniestros/")
        .authorization_bearer(&api.admin)
        .json(&json!({
            "poliza": policy,
            "tipo_siniestro": "gastos_medicos",
            "fecha_siniestro": "2025-03-02",
            "descripcion": "Internacion por apendicitis",
            "monto_reclamado": "5000",
        }))
        .await;
    claim.assert_status(StatusCode::CREATED);
    let claim: Value = claim.json();
    assert_eq!(claim["estado"], "reportado");
    assert!(claim["numero_siniestro"].as_str().unwrap().starts_with("SIN-"));
    let claim = id(&claim);

    api.server
        .patch(&format!("/api/siniestros/{claim}/"))
        .authorization_bearer(&api.admin)
        .json(&json!({ "monto_aprobado": "6000" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    api.server
        .post(&format!("/api/siniestros/{claim}/aprobar/"))
        .authorization_bearer(&api.admin)
        .json(&json!({ "monto_aprobado": "6000" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // resolution goes through its own operations
    api.server
        .patch(&format!("/api/siniestros/{claim}/"))
        .authorization_bearer(&api.admin)
        .json(&json!({ "estado": "aprobado" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let approved = api
        .server
        .post(&format!("/api/siniestros/{claim}/aprobar/"))
        .authorization_bearer(&api.admin)
        .json(&json!({ "monto_aprobado": "4500" }))
        .await;
    approved.assert_status_ok();
    let approved: Value = approved.json();
    assert_eq!(approved["estado"], "aprobado");
    assert_eq!(decimal(&approved["monto_aprobado"]), dec!(4500));
    assert!(approved["fecha_resolucion"].is_string());
    assert!(approved["resolucion"].is_string());

    let paid = api
        .server
        .post(&format!("/api/siniestros/{claim}/pagar/"))
        .authorization_bearer(&api.admin)
        .await;
    paid.assert_status_ok();
    assert_eq!(paid.json::<Value>()["estado"], "pagado");
}

#[tokio::test]
async fn test_claims_need_an_active_policy() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = id(&api.create_policy(&client, false).await);

    api.server
        .post("/api/siniestros/")
        .authorization_bearer(&api.admin)
        .json(&json!({
            "poliza": policy,
            "tipo_siniestro": "muerte",
            "fecha_siniestro": "2025-03-02",
            "descripcion": "Fallecimiento",
            "monto_reclamado": "10000",
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_client_deactivation_cascades_to_live_policies() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let quoting = id(&api.create_policy(&client, false).await);
    let active = id(&api.create_policy(&client, true).await);
    let cancelled = id(&api.create_policy(&client, false).await);
    api.server
        .post(&format!("/api/polizas/{cancelled}/cancelar/"))
        .authorization_bearer(&api.admin)
        .await
        .assert_status_ok();

    let response = api
        .server
        .delete(&format!("/api/clientes/{client}/eliminar/"))
        .authorization_bearer(&api.admin)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["polizas_inactivadas"], 2);

    assert_eq!(api.policy_status(&quoting).await, "inactiva");
    assert_eq!(api.policy_status(&active).await, "inactiva");
    assert_eq!(api.policy_status(&cancelled).await, "cancelada");

    api.server
        .post("/api/token/")
        .json(&json!({ "username": "ana", "password": CLIENT_PASSWORD }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // reactivation restores login only
    api.server
        .patch(&format!("/api/clientes/{client}/reactivar/"))
        .authorization_bearer(&api.admin)
        .await
        .assert_status_ok();
    login(&api.server, "ana", CLIENT_PASSWORD).await;
    assert_eq!(api.policy_status(&active).await, "inactiva");
}

#[tokio::test]
async fn test_beneficiary_shares_capped_at_100() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = id(&api.create_policy(&client, false).await);
    let token = login(&api.server, "ana", CLIENT_PASSWORD).await;

    let add = |name: &'static str, pct: &'static str| {
        api.server
            .post("/api/beneficiarios/")
            .authorization_bearer(&token)
            .json(&json!({
                "poliza": policy,
                "nombre_completo": name,
                "parentesco": "hijo",
                "porcentaje": pct,
            }))
    };

    add("Luis Quispe", "60").await.assert_status(StatusCode::CREATED);
    add("Rosa Quispe", "50").await.assert_status(StatusCode::BAD_REQUEST);
    add("Rosa Quispe", "40").await.assert_status(StatusCode::CREATED);

    let detail: Value = api
        .server
        .get(&format!("/api/polizas/{policy}/"))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(detail["beneficiarios"].as_array().unwrap().len(), 2);
    assert_eq!(decimal(&detail["porcentaje_asignado"]), dec!(100));
    assert_eq!(detail["cliente_info"]["identificacion"], "4829301");
}

#[tokio::test]
async fn test_clients_only_see_their_own_policies() {
    let api = setup().await;
    let ana = api.create_client("ana", "4829301").await;
    let luis = api.create_client("luis", "5930112").await;
    api.create_policy(&ana, false).await;
    let other = id(&api.create_policy(&luis, false).await);

    let token = login(&api.server, "ana", CLIENT_PASSWORD).await;
    let policies: Value = api
        .server
        .get("/api/polizas/")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(policies.as_array().unwrap().len(), 1);
    assert_eq!(policies[0]["cliente"], ana.as_str());

    api.server
        .get(&format!("/api/polizas/{other}/"))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_solicitation_accepted_by_agent() {
    let api = setup().await;
    api.create_client("ana", "4829301").await;
    let client_token = login(&api.server, "ana", CLIENT_PASSWORD).await;

    let agent = api
        .server
        .post("/api/agentes/")
        .authorization_bearer(&api.admin)
        .json(&json!({
            "username": "carlos",
            "password": "agente-pass-123",
            "first_name": "Carlos",
            "last_name": "Mamani",
        }))
        .await;
    agent.assert_status(StatusCode::CREATED);
    let agent: Value = agent.json();
    assert!(agent["codigo_agente"].as_str().unwrap().starts_with("AGT-"));
    assert_eq!(agent["estado"], "activo");
    let agent_token = login(&api.server, "carlos", "agente-pass-123").await;

    let solicited = api
        .server
        .post("/api/polizas/solicitar/")
        .authorization_bearer(&client_token)
        .json(&json!({
            "suma_asegurada": "20000",
            "prima_anual": "2400",
            "fecha_inicio": "2025-02-01",
            "fecha_vencimiento": "2026-02-01",
        }))
        .await;
    solicited.assert_status(StatusCode::CREATED);
    let solicited: Value = solicited.json();
    assert!(solicited["agente"].is_null());
    let policy = id(&solicited);

    // unassigned solicitations are visible to agents
    let visible: Value = api
        .server
        .get("/api/polizas/")
        .authorization_bearer(&agent_token)
        .await
        .json();
    assert_eq!(visible.as_array().unwrap().len(), 1);

    let accepted = api
        .server
        .post(&format!("/api/polizas/{policy}/aceptar/"))
        .authorization_bearer(&agent_token)
        .await;
    accepted.assert_status_ok();
    let accepted: Value = accepted.json();
    assert_eq!(accepted["estado"], "pendiente_pago");
    assert_eq!(accepted["agente"], agent["id"]);
    assert_eq!(accepted["factura"]["estado"], "pendiente");
    assert_eq!(decimal(&accepted["factura"]["monto"]), dec!(2400));

    let issued = chrono::NaiveDate::from_str(accepted["factura"]["fecha_emision"].as_str().unwrap()).unwrap();
    let due = chrono::NaiveDate::from_str(accepted["factura"]["fecha_vencimiento"].as_str().unwrap()).unwrap();
    assert_eq!((due - issued).num_days(), 15);

    // a client cannot accept
    api.server
        .post(&format!("/api/polizas/{policy}/aceptar/"))
        .authorization_bearer(&client_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_qr_payment_confirmed_by_staff() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = id(&api.create_policy(&client, false).await);
    let invoice = api.create_invoice(&policy).await;
    let number = invoice["numero_factura"].as_str().unwrap().to_string();
    let invoice = id(&invoice);
    let token = login(&api.server, "ana", CLIENT_PASSWORD).await;

    let qr = api
        .server
        .post("/api/pagos/iniciar-qr/")
        .authorization_bearer(&token)
        .json(&json!({ "factura": invoice }))
        .await;
    qr.assert_status(StatusCode::CREATED);
    let qr: Value = qr.json();
    assert_eq!(decimal(&qr["monto"]), dec!(1200));
    let payload = qr["qr_payload"].as_str().unwrap();
    assert!(payload.contains(&number));
    assert!(payload.ends_with("|BOB"));
    let payment = qr["pago_id"].as_str().unwrap().to_string();

    let status: Value = api
        .server
        .get(&format!("/api/pagos/estado/{payment}/"))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(status["status"], "pendiente");

    // a pending payment does not settle anything
    assert_eq!(api.policy_status(&policy).await, "cotizacion");

    api.server
        .post(&format!("/api/pagos/{payment}/confirmar/"))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let confirmed = api
        .server
        .post(&format!("/api/pagos/{payment}/confirmar/"))
        .authorization_bearer(&api.admin)
        .await;
    confirmed.assert_status_ok();
    let confirmed: Value = confirmed.json();
    assert_eq!(confirmed["estado"], "completado");
    assert_eq!(confirmed["factura_estado"], "pagada");
    assert_eq!(confirmed["poliza_estado"], "activa");
}

#[tokio::test]
async fn test_notes_are_staff_only() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = id(&api.create_policy(&client, false).await);

    let note = api
        .server
        .post("/api/notas-poliza/")
        .authorization_bearer(&api.admin)
        .json(&json!({
            "poliza": policy,
            "titulo": "Llamar al cliente",
            "contenido": "Confirmar fecha de inicio",
            "tipo_nota": "seguimiento",
        }))
        .await;
    note.assert_status(StatusCode::CREATED);
    assert_eq!(note.json::<Value>()["tipo_nota"], "seguimiento");

    let notes: Value = api
        .server
        .get("/api/notas-poliza/")
        .add_query_param("poliza_id", &policy)
        .authorization_bearer(&api.admin)
        .await
        .json();
    assert_eq!(notes.as_array().unwrap().len(), 1);

    let token = login(&api.server, "ana", CLIENT_PASSWORD).await;
    api.server
        .get("/api/notas-poliza/")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_bootstrap_is_idempotent() {
    let state = mock_state(MockPartyPort::new());

    assert!(services::party::ensure_admin(&state, "admin", "adminpassword123").await.unwrap());
    assert!(!services::party::ensure_admin(&state, "admin", "another-password").await.unwrap());
    assert!(services::party::ensure_admin(&state, "root", "short").await.is_err());

    let server = TestServer::new(create_router(state)).unwrap();
    let token = login(&server, "admin", "adminpassword123").await;
    server
        .get("/api/agentes/")
        .authorization_bearer(&token)
        .await
        .assert_status_ok();
    server
        .post("/api/token/")
        .json(&json!({ "username": "admin", "password": "another-password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_agents_cannot_manage_unassigned_live_policies() {
    let api = setup().await;
    let client = api.create_client("ana", "4829301").await;
    let policy = id(&api.create_policy(&client, true).await);
    let (_, agent) = api.create_agent("carlos").await;

    let claim = api
        .server
        .post("/api/siniestros/")
        .authorization_bearer(&api.admin)
        .json(&json!({
            "poliza": policy,
            "tipo_siniestro": "gastos_medicos",
            "fecha_siniestro": "2025-03-02",
            "descripcion": "Consulta de emergencia",
            "monto_reclamado": "800",
        }))
        .await;
    claim.assert_status(StatusCode::CREATED);
    let claim = id(&claim.json());

    api.server
        .get(&format!("/api/polizas/{policy}/"))
        .authorization_bearer(&agent)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    api.server
        .post(&format!("/api/siniestros/{claim}/aprobar/"))
        .authorization_bearer(&agent)
        .json(&json!({ "monto_aprobado": "800" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    api.server
        .post("/api/facturas/")
        .authorization_bearer(&agent)
        .json(&json!({ "poliza": policy }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // unassigned quotes stay open to agents
    let quoting = id(&api.create_policy(&client, false).await);
    api.server
        .post("/api/facturas/")
        .authorization_bearer(&agent)
        .json(&json!({ "poliza": quoting }))
        .await
        .assert_status(StatusCode::CREATED);
}
