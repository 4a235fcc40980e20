//! PostgreSQL adapter tests
//!
//! Each test starts its own container; run with `cargo test -- --ignored`
//! on a machine with Docker.

use rust_decimal_macros::dec;

use core_kernel::HealthCheckable;
use domain_billing::{BillingPort, Invoice, Payment, PaymentMethod};
use domain_claims::ClaimsPort;
use domain_party::PartyPort;
use domain_policy::{Beneficiary, PolicyPort, PolicyStatus};
use infra_db::{
    PostgresBillingAdapter, PostgresClaimsAdapter, PostgresPartyAdapter, PostgresPolicyAdapter,
};
use test_utils::{
    assert_conflict, assert_not_found, build_claim, build_invoice, db_test, AgentBuilder,
    ClientBuilder, DateFixtures, PolicyBuilder,
};

db_test!(test_health_check_reports_healthy, |pool| {
    let adapter = PostgresPartyAdapter::new(pool);
    let health = adapter.health_check().await;
    assert!(health.is_healthy(), "{:?}", health.message);
});

db_test!(test_client_round_trip_and_unique_identification, |pool| {
    let party = PostgresPartyAdapter::new(pool);
    let client = ClientBuilder::new().with_identification("CI-555").build();
    party.create_client(&client).await.unwrap();

    let stored = party.get_client(client.id()).await.unwrap();
    assert_eq!(stored.user.username, client.user.username);
    assert_eq!(stored.profile, client.profile);
    assert!(stored.user.authenticate("univida-2025").is_ok());

    let by_user = party.find_client_by_user(client.user.id).await.unwrap();
    assert_eq!(by_user.map(|c| c.id()), Some(client.id()));

    let clash = ClientBuilder::new().with_identification("CI-555").build();
    assert_conflict(party.create_client(&clash).await);
    // the user row of the failed client was rolled back with it
    assert!(party
        .find_user_by_username(&clash.user.username)
        .await
        .unwrap()
        .is_none());
});

db_test!(test_agent_deactivation_persists, |pool| {
    let party = PostgresPartyAdapter::new(pool);
    let mut agent = AgentBuilder::new().build();
    party.create_agent(&agent).await.unwrap();

    agent.deactivate();
    party.save_agent(&agent).await.unwrap();

    let stored = party.get_agent(agent.id()).await.unwrap();
    assert!(!stored.user.is_active);
    assert_eq!(stored.profile.status, agent.profile.status);
});

db_test!(test_policy_listing_for_agent, |pool| {
    let party = PostgresPartyAdapter::new(pool.clone());
    let policies = PostgresPolicyAdapter::new(pool);

    let client = ClientBuilder::new().build();
    let agent = AgentBuilder::new().build();
    let other = AgentBuilder::new().build();
    party.create_client(&client).await.unwrap();
    party.create_agent(&agent).await.unwrap();
    party.create_agent(&other).await.unwrap();

    let mine = PolicyBuilder::new().for_client(client.id()).with_agent(agent.id()).build();
    let unassigned = PolicyBuilder::new().for_client(client.id()).build();
    let foreign = PolicyBuilder::new().for_client(client.id()).with_agent(other.id()).build();
    for policy in [&mine, &unassigned, &foreign] {
        policies.create_policy(policy).await.unwrap();
    }

    let visible: Vec<_> = policies
        .list_policies_for_agent(agent.id())
        .await
        .unwrap()
        .iter()
        .map(|p| p.id())
        .collect();
    assert_eq!(visible, vec![mine.id(), unassigned.id()]);

    assert_conflict(
        policies
            .create_policy(
                &PolicyBuilder::new()
                    .for_client(client.id())
                    .with_policy_number(mine.policy_number())
                    .build(),
            )
            .await,
    );
});

db_test!(test_beneficiary_share_ceiling_enforced_in_store, |pool| {
    let party = PostgresPartyAdapter::new(pool.clone());
    let policies = PostgresPolicyAdapter::new(pool);

    let client = ClientBuilder::new().build();
    party.create_client(&client).await.unwrap();
    let policy = PolicyBuilder::new().for_client(client.id()).build();
    policies.create_policy(&policy).await.unwrap();

    let first = Beneficiary::new(policy.id(), "Ana Perez", "hija", dec!(60), None).unwrap();
    let second = Beneficiary::new(policy.id(), "Luis Perez", "hijo", dec!(50), None).unwrap();
    policies.add_beneficiary(&first).await.unwrap();
    assert!(policies.add_beneficiary(&second).await.is_err());

    assert_eq!(policies.list_beneficiaries(policy.id()).await.unwrap(), vec![first.clone()]);
    policies.remove_beneficiary(first.id).await.unwrap();
    assert_not_found(policies.remove_beneficiary(first.id).await);
});

db_test!(test_settlement_is_atomic, |pool| {
    let party = PostgresPartyAdapter::new(pool.clone());
    let policies = PostgresPolicyAdapter::new(pool.clone());
    let billing = PostgresBillingAdapter::new(pool);

    let client = ClientBuilder::new().build();
    party.create_client(&client).await.unwrap();

    let policy = PolicyBuilder::new()
        .for_client(client.id())
        .with_status(PolicyStatus::Active)
        .build();
    let invoice = Invoice::settled_at_issue(
        policy.id(),
        "FAC-20250115-9001".into(),
        policy.annual_premium(),
        DateFixtures::issue_date(),
    )
    .unwrap();
    let payment = Payment::new(invoice.id, invoice.amount, PaymentMethod::Tarjeta).unwrap();
    billing
        .issue_policy_with_settlement(&policy, &invoice, &payment)
        .await
        .unwrap();
    assert!(policies.get_policy(policy.id()).await.unwrap().is_active());

    // invoice number clash: the second policy must not survive
    let again = PolicyBuilder::new()
        .for_client(client.id())
        .with_status(PolicyStatus::Active)
        .build();
    let clash = Invoice::settled_at_issue(
        again.id(),
        "FAC-20250115-9001".into(),
        again.annual_premium(),
        DateFixtures::issue_date(),
    )
    .unwrap();
    let clash_payment = Payment::new(clash.id, clash.amount, PaymentMethod::Tarjeta).unwrap();
    assert_conflict(
        billing
            .issue_policy_with_settlement(&again, &clash, &clash_payment)
            .await,
    );
    assert_not_found(policies.get_policy(again.id()).await);
});

db_test!(test_payment_for_missing_invoice_is_not_found, |pool| {
    let billing = PostgresBillingAdapter::new(pool);
    let payment = Payment::new(core_kernel::InvoiceId::new(), dec!(10), PaymentMethod::Qr).unwrap();
    assert_not_found(billing.record_payment(&payment).await);
});

db_test!(test_claim_round_trip, |pool| {
    let party = PostgresPartyAdapter::new(pool.clone());
    let policies = PostgresPolicyAdapter::new(pool.clone());
    let billing = PostgresBillingAdapter::new(pool.clone());
    let claims = PostgresClaimsAdapter::new(pool);

    let client = ClientBuilder::new().build();
    party.create_client(&client).await.unwrap();
    let policy = PolicyBuilder::new()
        .for_client(client.id())
        .with_status(PolicyStatus::Active)
        .build();
    policies.create_policy(&policy).await.unwrap();
    billing.create_invoice(&build_invoice(&policy)).await.unwrap();

    let mut claim = build_claim(&policy, dec!(5000));
    claims.create_claim(&claim).await.unwrap();

    claim.approve(dec!(4500), None, chrono::Utc::now().date_naive()).unwrap();
    claims.save_claim(&claim).await.unwrap();

    let stored = claims.get_claim(claim.id).await.unwrap();
    assert_eq!(stored.status, claim.status);
    assert_eq!(stored.amount_approved, Some(dec!(4500)));
    assert_eq!(stored.resolution, claim.resolution);
    assert_eq!(stored.resolution_date, claim.resolution_date);
    assert_eq!(claims.list_claims(Some(policy.id())).await.unwrap().len(), 1);
});
