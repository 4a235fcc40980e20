//! Billing tests
//!
//! Scenario and property tests for the reconciliation rule.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::ClientId;
use domain_billing::{
    check_payment, completed_total, reconcile, BillingError, Invoice, InvoiceStatus, Payment,
    PaymentMethod, PaymentStatus, Reconciliation,
};
use domain_policy::{NewPolicy, Policy, PolicyStatus};
use test_utils::{assert_invoice_status, assert_policy_status, installments_strategy, payment_method_strategy};

// ============================================================================
// Fixtures
// ============================================================================

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
}

fn quoting_policy() -> Policy {
    Policy::quote(
        NewPolicy {
            client_id: ClientId::new(),
            agent_id: None,
            insured_sum: dec!(10000),
            annual_premium: dec!(1200),
            monthly_premium: None,
            start_date: day(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            coverage: None,
        },
        "POL-55555".into(),
    )
    .unwrap()
}

fn invoice_for(policy: &Policy, amount: Decimal) -> Invoice {
    Invoice::with_due_window(policy.id(), "FAC-20250110-0001".into(), amount, day(), 15).unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn test_two_payments_of_600_activate_quoting_policy() {
        let mut policy = quoting_policy();
        let mut invoice = invoice_for(&policy, dec!(1200));
        let mut payments = Vec::new();

        for _ in 0..2 {
            check_payment(&invoice, &payments, dec!(600)).unwrap();
            payments.push(Payment::new(invoice.id, dec!(600), PaymentMethod::Transferencia).unwrap());
            let outcome = reconcile(&mut invoice, &payments);
            outcome.apply_to(&mut policy);
        }

        assert!(invoice.is_paid());
        assert_eq!(policy.status(), PolicyStatus::Active);
    }

    #[test]
    fn test_partial_payment_leaves_policy_alone() {
        let mut policy = quoting_policy();
        policy.accept_solicitation(core_kernel::AgentId::new()).unwrap();
        let mut invoice = invoice_for(&policy, dec!(1200));
        let payments = vec![Payment::new(invoice.id, dec!(1199.99), PaymentMethod::Tarjeta).unwrap()];

        let outcome = reconcile(&mut invoice, &payments);
        assert_eq!(outcome, Reconciliation::Outstanding(dec!(0.01)));
        assert!(!outcome.apply_to(&mut policy));
        assert_eq!(policy.status(), PolicyStatus::PendingPayment);
    }

    #[test]
    fn test_settlement_does_not_revive_cancelled_policy() {
        let mut policy = quoting_policy();
        let mut invoice = invoice_for(&policy, dec!(100));
        policy.cancel().unwrap();

        let payments = vec![Payment::new(invoice.id, dec!(100), PaymentMethod::Efectivo).unwrap()];
        let outcome = reconcile(&mut invoice, &payments);
        assert!(outcome.is_settled());
        assert!(!outcome.apply_to(&mut policy));
        assert_eq!(policy.status(), PolicyStatus::Cancelled);
    }

    #[test]
    fn test_paid_invoice_rejects_more_payments() {
        let policy = quoting_policy();
        let mut invoice = invoice_for(&policy, dec!(100));
        let payments = vec![Payment::new(invoice.id, dec!(100), PaymentMethod::Efectivo).unwrap()];
        reconcile(&mut invoice, &payments);

        assert!(matches!(
            check_payment(&invoice, &payments, dec!(1)),
            Err(BillingError::InvoiceClosed { .. })
        ));
    }
}

// ============================================================================
// Properties
// ============================================================================

fn any_payment_status() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Pending),
        Just(PaymentStatus::Completed),
        Just(PaymentStatus::Failed),
        Just(PaymentStatus::Refunded),
    ]
}

proptest! {
    /// The invoice is paid iff completed payments reach its amount
    #[test]
    fn prop_paid_iff_completed_total_reaches_amount(
        amount_cents in 1i64..1_000_000,
        payments in proptest::collection::vec((1i64..500_000, any_payment_status()), 0..8),
    ) {
        let policy = quoting_policy();
        let mut invoice = invoice_for(&policy, Decimal::new(amount_cents, 2));
        let payments: Vec<Payment> = payments
            .into_iter()
            .map(|(cents, status)| {
                let mut p = Payment::new(invoice.id, Decimal::new(cents, 2), PaymentMethod::Efectivo).unwrap();
                p.status = status;
                p
            })
            .collect();

        let total = completed_total(&invoice, &payments);
        reconcile(&mut invoice, &payments);
        prop_assert_eq!(invoice.is_paid(), total >= invoice.amount);
    }

    /// Installments adding up to the amount settle the invoice on the last one
    #[test]
    fn prop_installments_settle_on_the_last_payment(
        (amount_cents, installments) in (100i64..500_000)
            .prop_flat_map(|cents| (Just(cents), installments_strategy(cents, 6))),
        method in payment_method_strategy(),
    ) {
        let mut policy = quoting_policy();
        let mut invoice = invoice_for(&policy, Decimal::new(amount_cents, 2));
        let mut payments = Vec::new();
        let last = installments.len() - 1;

        for (i, amount) in installments.into_iter().enumerate() {
            prop_assert!(check_payment(&invoice, &payments, amount).is_ok());
            payments.push(Payment::new(invoice.id, amount, method).unwrap());
            reconcile(&mut invoice, &payments).apply_to(&mut policy);
            if i < last {
                assert_invoice_status(&invoice, InvoiceStatus::Pending);
                prop_assert_eq!(policy.status(), PolicyStatus::Quoting);
            }
        }

        assert_invoice_status(&invoice, InvoiceStatus::Paid);
        assert_policy_status(&policy, PolicyStatus::Active);
    }

    /// Accepted payments never push the completed total past the amount
    #[test]
    fn prop_checked_payments_never_overpay(
        amount_cents in 1i64..1_000_000,
        attempts in proptest::collection::vec(1i64..600_000, 1..10),
    ) {
        let policy = quoting_policy();
        let mut invoice = invoice_for(&policy, Decimal::new(amount_cents, 2));
        let mut payments = Vec::new();

        for cents in attempts {
            let amount = Decimal::new(cents, 2);
            if check_payment(&invoice, &payments, amount).is_ok() {
                payments.push(Payment::new(invoice.id, amount, PaymentMethod::Efectivo).unwrap());
                reconcile(&mut invoice, &payments);
            }
            prop_assert!(completed_total(&invoice, &payments) <= invoice.amount);
        }
    }
}
