//! Policy Lifecycle Tests
//!
//! Covers quoting, the status machine, term edits and the client
//! deactivation cascade, plus property tests for the premium derivation and
//! the cascade.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AgentId, ClientId, PolicyId};
use domain_policy::{
    assigned_percentage, cascade_client_deactivation, derive_monthly_premium, ensure_share_available,
    Beneficiary, NewPolicy, Policy, PolicyError,
    PolicyEvent, PolicyRecord, PolicyStatus, TermsUpdate,
};
use test_utils::{annual_premium_strategy, assert_policy_status, policy_status_strategy, share_strategy};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_policy(annual: Decimal) -> NewPolicy {
    NewPolicy {
        client_id: ClientId::new(),
        agent_id: None,
        insured_sum: dec!(10000),
        annual_premium: annual,
        monthly_premium: None,
        start_date: date(2025, 1, 1),
        end_date: date(2026, 1, 1),
        coverage: None,
    }
}

fn quoting() -> Policy {
    Policy::quote(new_policy(dec!(1200)), "POL-12345".into()).expect("valid quote")
}

fn with_status(status: PolicyStatus) -> Policy {
    let mut record: PolicyRecord = quoting().into_record();
    record.status = status;
    Policy::restore(record)
}

// ============================================================================
// QUOTING
// ============================================================================

mod quoting {
    use super::*;

    #[test]
    fn test_monthly_premium_scenario() {
        let policy = quoting();
        assert_eq!(policy.status(), PolicyStatus::Quoting);
        assert_eq!(policy.monthly_premium(), dec!(100.00));
    }

    #[test]
    fn test_monthly_premium_table() {
        for (annual, monthly) in [
            (dec!(1200), dec!(100.00)),
            (dec!(1000), dec!(83.33)),
            (dec!(1250), dec!(104.17)),
            (dec!(2400), dec!(200.00)),
            (dec!(1), dec!(0.08)),
        ] {
            assert_eq!(derive_monthly_premium(annual), monthly, "annual {annual}");
        }
    }

    #[test]
    fn test_explicit_monthly_premium_is_kept() {
        let mut input = new_policy(dec!(1200));
        input.monthly_premium = Some(dec!(110));
        let policy = Policy::quote(input, "POL-12345".into()).unwrap();
        assert_eq!(policy.monthly_premium(), dec!(110));
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        let mut input = new_policy(dec!(0));
        assert!(Policy::quote(input.clone(), "POL-1".into()).is_err());

        input.annual_premium = dec!(100);
        input.insured_sum = dec!(-5);
        assert!(Policy::quote(input, "POL-1".into()).is_err());
    }

    #[test]
    fn test_rejects_inverted_dates() {
        let mut input = new_policy(dec!(1200));
        input.end_date = input.start_date;
        let err = Policy::quote(input, "POL-1".into()).unwrap_err();
        assert!(matches!(err, PolicyError::Validation(_)));
    }
}

// ============================================================================
// STATUS MACHINE
// ============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn test_accept_solicitation_assigns_agent() {
        let mut policy = quoting();
        policy.take_events();
        let agent = AgentId::new();

        policy.accept_solicitation(agent).unwrap();

        assert_eq!(policy.status(), PolicyStatus::PendingPayment);
        assert_eq!(policy.agent_id(), Some(agent));
        let events = policy.take_events();
        assert!(matches!(events[0], PolicyEvent::AgentAssigned { .. }));
        assert!(matches!(
            events[1],
            PolicyEvent::StatusChanged {
                from: PolicyStatus::Quoting,
                to: PolicyStatus::PendingPayment,
                ..
            }
        ));
    }

    #[test]
    fn test_accept_requires_quoting() {
        let mut policy = with_status(PolicyStatus::Active);
        assert!(matches!(
            policy.accept_solicitation(AgentId::new()),
            Err(PolicyError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_activate_only_from_quoting() {
        let mut policy = quoting();
        policy.activate().unwrap();
        assert!(policy.is_active());

        let mut pending = with_status(PolicyStatus::PendingPayment);
        assert!(pending.activate().is_err());
    }

    #[test]
    fn test_cancel_only_from_quoting() {
        let mut policy = quoting();
        policy.cancel().unwrap();
        assert_eq!(policy.status(), PolicyStatus::Cancelled);

        for status in [PolicyStatus::Active, PolicyStatus::PendingPayment, PolicyStatus::Expired] {
            let mut policy = with_status(status);
            let err = policy.cancel().unwrap_err();
            assert!(err.to_string().contains("Only policies in quoting status can be cancelled"));
            assert_eq!(policy.status(), status);
        }
    }

    #[test]
    fn test_settle_promotes_quoting_and_pending() {
        for status in [PolicyStatus::Quoting, PolicyStatus::PendingPayment] {
            let mut policy = with_status(status);
            assert!(policy.settle());
            assert_policy_status(&policy, PolicyStatus::Active);
        }
        for status in [PolicyStatus::Active, PolicyStatus::Cancelled, PolicyStatus::Inactive] {
            let mut policy = with_status(status);
            assert!(!policy.settle());
            assert_eq!(policy.status(), status);
        }
    }
}

// ============================================================================
// TERM EDITS
// ============================================================================

mod terms {
    use super::*;

    #[test]
    fn test_new_annual_premium_rederives_monthly() {
        let mut policy = quoting();
        policy
            .update_terms(TermsUpdate {
                annual_premium: Some(dec!(2400)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(policy.annual_premium(), dec!(2400));
        assert_eq!(policy.monthly_premium(), dec!(200.00));
    }

    #[test]
    fn test_coverage_only_edit_keeps_premiums() {
        let mut policy = quoting();
        policy
            .update_terms(TermsUpdate {
                coverage: Some("Cobertura ampliada".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(policy.monthly_premium(), dec!(100.00));
        assert_eq!(policy.record().coverage.as_deref(), Some("Cobertura ampliada"));
    }

    #[test]
    fn test_terms_frozen_after_quoting() {
        let mut policy = with_status(PolicyStatus::Active);
        let err = policy.update_terms(TermsUpdate::default()).unwrap_err();
        assert!(matches!(err, PolicyError::NotModifiable(PolicyStatus::Active)));
    }
}

// ============================================================================
// DEACTIVATION CASCADE
// ============================================================================

mod cascade {
    use super::*;

    #[test]
    fn test_only_live_policies_are_swept() {
        let mut policies: Vec<Policy> = PolicyStatus::ALL.into_iter().map(with_status).collect();
        let changed = cascade_client_deactivation(&mut policies);

        assert_eq!(changed.len(), 3);
        let statuses: Vec<PolicyStatus> = policies.iter().map(Policy::status).collect();
        assert_eq!(
            statuses,
            vec![
                PolicyStatus::Inactive,
                PolicyStatus::Inactive,
                PolicyStatus::Inactive,
                PolicyStatus::Inactive,
                PolicyStatus::Expired,
                PolicyStatus::Cancelled,
            ]
        );
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_twelve_monthly_premiums_recover_annual(annual in annual_premium_strategy()) {
        let policy = Policy::quote(new_policy(annual), "POL-99999".into()).unwrap();
        let monthly = policy.monthly_premium();
        prop_assert!(monthly.scale() <= 2);
        prop_assert!((monthly * dec!(12) - annual).abs() <= dec!(0.06));
    }

    /// Shares admitted one at a time never total more than 100
    #[test]
    fn prop_admitted_shares_stay_within_100(requests in proptest::collection::vec(share_strategy(), 1..12)) {
        let policy = PolicyId::new();
        let mut admitted: Vec<Beneficiary> = Vec::new();

        for share in requests {
            let fits = assigned_percentage(&admitted) + share <= dec!(100);
            prop_assert_eq!(ensure_share_available(&admitted, share).is_ok(), fits);
            if fits {
                admitted.push(Beneficiary::new(policy, "Luis Quispe", "hijo", share, None).unwrap());
            }
            prop_assert!(assigned_percentage(&admitted) <= dec!(100));
        }
    }

    #[test]
    fn prop_cascade_touches_exactly_live_policies(statuses in proptest::collection::vec(policy_status_strategy(), 0..20)) {
        let mut policies: Vec<Policy> = statuses.iter().copied().map(with_status).collect();
        let changed = cascade_client_deactivation(&mut policies);

        let live = statuses.iter().filter(|s| s.is_live()).count();
        prop_assert_eq!(changed.len(), live);
        for (before, after) in statuses.iter().zip(policies.iter()) {
            if before.is_live() {
                prop_assert_eq!(after.status(), PolicyStatus::Inactive);
            } else {
                prop_assert_eq!(after.status(), *before);
            }
        }
    }
}
