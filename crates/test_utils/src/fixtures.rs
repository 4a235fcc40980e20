//! Pre-built Test Fixtures
//!
//! Consistent, predictable values for unit tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixed dates used across tests
pub struct DateFixtures;

impl DateFixtures {
    /// Standard policy start date (Jan 1, 2025)
    pub fn policy_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")
    }

    /// Standard policy end date (Jan 1, 2026)
    pub fn policy_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date")
    }

    /// Issue date for invoices
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date")
    }

    /// Incident date for claims, safely in the past
    pub fn incident_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date")
    }

    /// Birth date of an adult client
    pub fn birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1985, 7, 20).expect("valid date")
    }
}

/// Standard amounts
pub struct AmountFixtures;

impl AmountFixtures {
    pub fn insured_sum() -> Decimal {
        dec!(100000.00)
    }

    /// Annual premium whose monthly derivation is exact
    pub fn annual_premium() -> Decimal {
        dec!(1200.00)
    }

    pub fn claim_amount() -> Decimal {
        dec!(5000.00)
    }
}

/// Credentials shared by users built in tests
pub struct CredentialFixtures;

impl CredentialFixtures {
    pub fn password() -> &'static str {
        "univida-2025"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_policy::derive_monthly_premium;

    #[test]
    fn test_policy_period_is_ordered() {
        assert!(DateFixtures::policy_end() > DateFixtures::policy_start());
    }

    #[test]
    fn test_annual_fixture_derives_exact_monthly() {
        assert_eq!(derive_monthly_premium(AmountFixtures::annual_premium()), dec!(100));
    }
}
