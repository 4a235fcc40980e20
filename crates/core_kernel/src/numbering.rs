//! Human-readable reference numbers
//!
//! Policies, invoices, claims and agents carry a short business number next to
//! their UUID. Numbers are drawn from a small random space, so callers that
//! persist them must treat a uniqueness conflict as "draw again".

use chrono::{DateTime, Utc};
use rand::Rng;

/// Maximum number of draws a caller should attempt before giving up
pub const MAX_DRAWS: usize = 5;

/// Kinds of business reference numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceNumber {
    /// `POL-` followed by five random digits
    Policy,
    /// `POL-` followed by the request date and its microseconds
    PolicySolicitation,
    /// `FAC-YYYYMMDD-` followed by four random digits
    Invoice,
    /// `SIN-YYYY-` followed by six random digits
    Claim,
    /// `AGT-` followed by four random digits
    AgentCode,
}

impl ReferenceNumber {
    /// Prefix shared by every number of this kind
    pub fn prefix(self) -> &'static str {
        match self {
            ReferenceNumber::Policy | ReferenceNumber::PolicySolicitation => "POL",
            ReferenceNumber::Invoice => "FAC",
            ReferenceNumber::Claim => "SIN",
            ReferenceNumber::AgentCode => "AGT",
        }
    }

    /// Draws a new number using the current time
    pub fn generate(self) -> String {
        self.generate_at(Utc::now())
    }

    /// Draws a new number for the given instant
    pub fn generate_at(self, now: DateTime<Utc>) -> String {
        let mut rng = rand::thread_rng();
        match self {
            ReferenceNumber::Policy => {
                format!("{}-{}", self.prefix(), rng.gen_range(10_000..=99_999))
            }
            ReferenceNumber::PolicySolicitation => format!(
                "{}-{}-{:06}",
                self.prefix(),
                now.format("%Y%m%d"),
                now.timestamp_subsec_micros()
            ),
            ReferenceNumber::Invoice => format!(
                "{}-{}-{:04}",
                self.prefix(),
                now.format("%Y%m%d"),
                rng.gen_range(0..10_000)
            ),
            ReferenceNumber::Claim => format!(
                "{}-{}-{:06}",
                self.prefix(),
                now.format("%Y"),
                rng.gen_range(0..1_000_000)
            ),
            ReferenceNumber::AgentCode => {
                format!("{}-{:04}", self.prefix(), rng.gen_range(0..10_000))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_policy_number_has_five_digits() {
        let number = ReferenceNumber::Policy.generate();
        let suffix = number.strip_prefix("POL-").unwrap();
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_solicitation_number_is_date_derived() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap()
            + chrono::Duration::microseconds(42);
        let number = ReferenceNumber::PolicySolicitation.generate_at(now);
        assert_eq!(number, "POL-20240309-000042");
    }

    #[test]
    fn test_invoice_and_claim_prefixes() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        assert!(ReferenceNumber::Invoice.generate_at(now).starts_with("FAC-20250131-"));
        assert!(ReferenceNumber::Claim.generate_at(now).starts_with("SIN-2025-"));
        assert!(ReferenceNumber::AgentCode.generate_at(now).starts_with("AGT-"));
    }
}
