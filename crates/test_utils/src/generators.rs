//! Property-Based Test Generators
//!
//! Proptest strategies that respect the domain's value ranges.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_billing::PaymentMethod;
use domain_policy::PolicyStatus;

/// Positive amounts with two decimal places, up to 10 million
pub fn positive_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Annual premiums between 1.00 and 100 000.00
pub fn annual_premium_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Beneficiary shares in (0, 100] with two decimal places
pub fn share_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// A split of an amount into 1..=`max_parts` positive installments that add
/// up exactly
pub fn installments_strategy(total_cents: i64, max_parts: usize) -> impl Strategy<Value = Vec<Decimal>> {
    let max_parts = max_parts.clamp(1, total_cents.max(1) as usize);
    (1..=max_parts).prop_flat_map(move |parts| {
        proptest::collection::btree_set(1..total_cents, parts - 1).prop_map(move |cuts| {
            let mut points: Vec<i64> = Vec::with_capacity(parts + 1);
            points.push(0);
            points.extend(cuts);
            points.push(total_cents);
            points
                .windows(2)
                .map(|w| Decimal::new(w[1] - w[0], 2))
                .collect()
        })
    })
}

pub fn policy_status_strategy() -> impl Strategy<Value = PolicyStatus> {
    proptest::sample::select(PolicyStatus::ALL.to_vec())
}

pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Transferencia),
        Just(PaymentMethod::Tarjeta),
        Just(PaymentMethod::Efectivo),
        Just(PaymentMethod::Cheque),
        Just(PaymentMethod::Qr),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_installments_add_up(parts in installments_strategy(120_000, 6)) {
            let total: Decimal = parts.iter().sum();
            prop_assert_eq!(total, Decimal::new(120_000, 2));
            prop_assert!(parts.iter().all(|p| *p > Decimal::ZERO));
        }

        #[test]
        fn prop_shares_in_range(share in share_strategy()) {
            prop_assert!(share > Decimal::ZERO);
            prop_assert!(share <= Decimal::ONE_HUNDRED);
        }
    }
}
