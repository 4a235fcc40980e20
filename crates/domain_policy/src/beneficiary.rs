//! Beneficiaries
//!
//! Each beneficiary receives a percentage of the benefit. Individual shares
//! lie in (0, 100] and the shares on one policy never add up to more than
//! [`MAX_TOTAL_SHARE`]. Totals below 100 are allowed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{BeneficiaryId, PolicyId};

use crate::error::PolicyError;

pub const MAX_TOTAL_SHARE: Decimal = dec!(100);

/// A named payout recipient on a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub id: BeneficiaryId,
    pub policy_id: PolicyId,
    pub full_name: String,
    pub relationship: String,
    pub percentage: Decimal,
    pub birth_date: Option<NaiveDate>,
}

impl Beneficiary {
    pub fn new(
        policy_id: PolicyId,
        full_name: impl Into<String>,
        relationship: impl Into<String>,
        percentage: Decimal,
        birth_date: Option<NaiveDate>,
    ) -> Result<Self, PolicyError> {
        let full_name = full_name.into();
        let relationship = relationship.into();

        if full_name.trim().is_empty() {
            return Err(PolicyError::validation("beneficiary name is required"));
        }
        if relationship.trim().is_empty() {
            return Err(PolicyError::validation("relationship is required"));
        }
        if percentage <= Decimal::ZERO || percentage > MAX_TOTAL_SHARE {
            return Err(PolicyError::validation(
                "percentage must be greater than 0 and at most 100",
            ));
        }

        Ok(Self {
            id: BeneficiaryId::new_v7(),
            policy_id,
            full_name,
            relationship,
            percentage,
            birth_date,
        })
    }
}

/// Sum of the shares already assigned
pub fn assigned_percentage(beneficiaries: &[Beneficiary]) -> Decimal {
    beneficiaries.iter().map(|b| b.percentage).sum()
}

/// Checks that `requested` still fits next to the existing shares
pub fn ensure_share_available(
    existing: &[Beneficiary],
    requested: Decimal,
) -> Result<(), PolicyError> {
    let assigned = assigned_percentage(existing);
    if assigned + requested > MAX_TOTAL_SHARE {
        return Err(PolicyError::ShareExceeded { assigned, requested });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beneficiary(policy_id: PolicyId, pct: Decimal) -> Beneficiary {
        Beneficiary::new(policy_id, "Ana Quispe", "hija", pct, None).unwrap()
    }

    #[test]
    fn test_percentage_bounds() {
        let policy = PolicyId::new();
        assert!(Beneficiary::new(policy, "Ana", "hija", dec!(0), None).is_err());
        assert!(Beneficiary::new(policy, "Ana", "hija", dec!(100.01), None).is_err());
        assert!(Beneficiary::new(policy, "Ana", "hija", dec!(100), None).is_ok());
        assert!(Beneficiary::new(policy, " ", "hija", dec!(10), None).is_err());
    }

    #[test]
    fn test_share_available_up_to_exactly_100() {
        let policy = PolicyId::new();
        let existing = vec![beneficiary(policy, dec!(60)), beneficiary(policy, dec!(25))];
        assert_eq!(assigned_percentage(&existing), dec!(85));
        assert!(ensure_share_available(&existing, dec!(15)).is_ok());

        match ensure_share_available(&existing, dec!(15.01)) {
            Err(PolicyError::ShareExceeded { assigned, requested }) => {
                assert_eq!(assigned, dec!(85));
                assert_eq!(requested, dec!(15.01));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
