//! Policy Aggregate Root
//!
//! The Policy aggregate is the consistency boundary for the policy lifecycle.
//!
//! # Invariants
//!
//! - `monthly_premium` equals `annual_premium / 12` (rounded to cents) unless
//!   an explicit non-zero value was supplied
//! - Terms can only change while quoting
//! - Only quoting policies can be cancelled
//! - Nothing returns a policy from `activa` to `inactiva` except the client
//!   deactivation cascade

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, ClientId, CoreError, PolicyId};

use crate::error::PolicyError;
use crate::events::PolicyEvent;

/// Policy lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyStatus {
    #[serde(rename = "cotizacion")]
    Quoting,
    #[serde(rename = "pendiente_pago")]
    PendingPayment,
    #[serde(rename = "activa")]
    Active,
    #[serde(rename = "inactiva")]
    Inactive,
    #[serde(rename = "vencida")]
    Expired,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl PolicyStatus {
    pub const ALL: [PolicyStatus; 6] = [
        PolicyStatus::Quoting,
        PolicyStatus::PendingPayment,
        PolicyStatus::Active,
        PolicyStatus::Inactive,
        PolicyStatus::Expired,
        PolicyStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Quoting => "cotizacion",
            PolicyStatus::PendingPayment => "pendiente_pago",
            PolicyStatus::Active => "activa",
            PolicyStatus::Inactive => "inactiva",
            PolicyStatus::Expired => "vencida",
            PolicyStatus::Cancelled => "cancelada",
        }
    }

    /// States a settled invoice promotes to `activa`
    pub fn awaits_settlement(&self) -> bool {
        matches!(self, PolicyStatus::Quoting | PolicyStatus::PendingPayment)
    }

    /// States swept to `inactiva` when the owning client is deactivated
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            PolicyStatus::Quoting | PolicyStatus::PendingPayment | PolicyStatus::Active
        )
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::unknown_value("policy status", s))
    }
}

/// Monthly premium derived from the annual one, rounded to cents
pub fn derive_monthly_premium(annual_premium: Decimal) -> Decimal {
    (annual_premium / dec!(12)).round_dp(2)
}

/// Input for quoting a new policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPolicy {
    pub client_id: ClientId,
    pub agent_id: Option<AgentId>,
    pub insured_sum: Decimal,
    pub annual_premium: Decimal,
    /// Zero or absent means "derive from the annual premium"
    pub monthly_premium: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub coverage: Option<String>,
}

/// Partial edit of the terms of a quoting policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermsUpdate {
    pub insured_sum: Option<Decimal>,
    pub annual_premium: Option<Decimal>,
    pub monthly_premium: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub coverage: Option<String>,
}

/// Persisted shape of a policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub id: PolicyId,
    pub client_id: ClientId,
    pub agent_id: Option<AgentId>,
    pub policy_number: String,
    pub insured_sum: Decimal,
    pub annual_premium: Decimal,
    pub monthly_premium: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PolicyStatus,
    pub coverage: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The Policy aggregate root
///
/// # State Machine
///
/// - Quoting -> PendingPayment (via accept_solicitation)
/// - Quoting -> Active (via activate, or settle)
/// - PendingPayment -> Active (via settle)
/// - Quoting -> Cancelled (via cancel)
/// - Quoting | PendingPayment | Active -> Inactive (via deactivate_for_client)
#[derive(Debug, Clone, Serialize)]
pub struct Policy {
    #[serde(flatten)]
    record: PolicyRecord,
    /// Domain events to be published
    #[serde(skip)]
    events: Vec<PolicyEvent>,
}

impl Policy {
    /// Quotes a new policy under the given policy number
    ///
    /// # Errors
    ///
    /// Returns a validation error if amounts are not positive or the end date
    /// does not come after the start date.
    pub fn quote(new: NewPolicy, policy_number: String) -> Result<Self, PolicyError> {
        validate_terms(new.insured_sum, new.annual_premium, new.start_date, new.end_date)?;
        if policy_number.trim().is_empty() {
            return Err(PolicyError::validation("policy number is required"));
        }

        let monthly_premium = resolve_monthly(new.annual_premium, new.monthly_premium)?;
        let now = Utc::now();
        let record = PolicyRecord {
            id: PolicyId::new_v7(),
            client_id: new.client_id,
            agent_id: new.agent_id,
            policy_number,
            insured_sum: new.insured_sum,
            annual_premium: new.annual_premium,
            monthly_premium,
            start_date: new.start_date,
            end_date: new.end_date,
            status: PolicyStatus::Quoting,
            coverage: new.coverage,
            created_at: now,
        };

        let events = vec![PolicyEvent::PolicyQuoted {
            policy_id: record.id,
            policy_number: record.policy_number.clone(),
            timestamp: now,
        }];

        Ok(Self { record, events })
    }

    /// Rebuilds a policy from its persisted shape
    pub fn restore(record: PolicyRecord) -> Self {
        Self {
            record,
            events: Vec::new(),
        }
    }

    pub fn record(&self) -> &PolicyRecord {
        &self.record
    }

    pub fn into_record(self) -> PolicyRecord {
        self.record
    }

    pub fn id(&self) -> PolicyId {
        self.record.id
    }

    pub fn policy_number(&self) -> &str {
        &self.record.policy_number
    }

    pub fn status(&self) -> PolicyStatus {
        self.record.status
    }

    pub fn client_id(&self) -> ClientId {
        self.record.client_id
    }

    pub fn agent_id(&self) -> Option<AgentId> {
        self.record.agent_id
    }

    pub fn annual_premium(&self) -> Decimal {
        self.record.annual_premium
    }

    pub fn monthly_premium(&self) -> Decimal {
        self.record.monthly_premium
    }

    pub fn is_active(&self) -> bool {
        self.record.status == PolicyStatus::Active
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<PolicyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replaces the number after a uniqueness conflict; only before first save
    pub fn renumber(&mut self, policy_number: String) {
        self.record.policy_number = policy_number;
    }

    /// Assigns the handling agent without touching the status
    pub fn assign_agent(&mut self, agent_id: AgentId) {
        if self.record.agent_id == Some(agent_id) {
            return;
        }
        self.record.agent_id = Some(agent_id);
        self.events.push(PolicyEvent::AgentAssigned {
            policy_id: self.record.id,
            agent_id,
            timestamp: Utc::now(),
        });
    }

    /// An agent takes over a client solicitation
    ///
    /// # Errors
    ///
    /// Returns error if the policy is not quoting
    pub fn accept_solicitation(&mut self, agent_id: AgentId) -> Result<(), PolicyError> {
        self.ensure_status(PolicyStatus::Quoting, PolicyStatus::PendingPayment)?;
        self.assign_agent(agent_id);
        self.transition(PolicyStatus::PendingPayment);
        Ok(())
    }

    /// Administrative activation; no payment is checked
    ///
    /// # Errors
    ///
    /// Returns error if the policy is not quoting
    pub fn activate(&mut self) -> Result<(), PolicyError> {
        self.ensure_status(PolicyStatus::Quoting, PolicyStatus::Active)?;
        self.transition(PolicyStatus::Active);
        Ok(())
    }

    /// Administrative cancellation
    ///
    /// # Errors
    ///
    /// Returns `NotCancellable` unless the policy is quoting
    pub fn cancel(&mut self) -> Result<(), PolicyError> {
        if self.record.status != PolicyStatus::Quoting {
            return Err(PolicyError::NotCancellable(self.record.status));
        }
        self.transition(PolicyStatus::Cancelled);
        Ok(())
    }

    /// The policy's invoice is fully paid
    ///
    /// Returns true if the status changed. Policies in any other state than
    /// quoting or pending payment are left alone.
    pub fn settle(&mut self) -> bool {
        if !self.record.status.awaits_settlement() {
            return false;
        }
        self.transition(PolicyStatus::Active);
        true
    }

    /// The owning client lost login access
    ///
    /// Returns true if the status changed.
    pub fn deactivate_for_client(&mut self) -> bool {
        if !self.record.status.is_live() {
            return false;
        }
        self.transition(PolicyStatus::Inactive);
        true
    }

    /// Edits terms while quoting
    ///
    /// A new annual premium without an explicit monthly one re-derives the
    /// monthly premium.
    pub fn update_terms(&mut self, update: TermsUpdate) -> Result<(), PolicyError> {
        if self.record.status != PolicyStatus::Quoting {
            return Err(PolicyError::NotModifiable(self.record.status));
        }

        let insured_sum = update.insured_sum.unwrap_or(self.record.insured_sum);
        let annual_premium = update.annual_premium.unwrap_or(self.record.annual_premium);
        let start_date = update.start_date.unwrap_or(self.record.start_date);
        let end_date = update.end_date.unwrap_or(self.record.end_date);
        validate_terms(insured_sum, annual_premium, start_date, end_date)?;

        let monthly_premium = match (update.monthly_premium, update.annual_premium) {
            (Some(_), _) | (None, Some(_)) => resolve_monthly(annual_premium, update.monthly_premium)?,
            (None, None) => self.record.monthly_premium,
        };

        self.record.insured_sum = insured_sum;
        self.record.annual_premium = annual_premium;
        self.record.monthly_premium = monthly_premium;
        self.record.start_date = start_date;
        self.record.end_date = end_date;
        if let Some(coverage) = update.coverage {
            self.record.coverage = Some(coverage);
        }

        self.events.push(PolicyEvent::TermsUpdated {
            policy_id: self.record.id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn ensure_status(&self, expected: PolicyStatus, to: PolicyStatus) -> Result<(), PolicyError> {
        if self.record.status != expected {
            return Err(PolicyError::InvalidStateTransition {
                from: self.record.status,
                to,
            });
        }
        Ok(())
    }

    fn transition(&mut self, to: PolicyStatus) {
        let from = self.record.status;
        self.record.status = to;
        self.events.push(PolicyEvent::StatusChanged {
            policy_id: self.record.id,
            from,
            to,
            timestamp: Utc::now(),
        });
    }
}

/// Sweeps every live policy of a deactivated client to `inactiva`
///
/// Returns the ids of the policies that changed.
pub fn cascade_client_deactivation(policies: &mut [Policy]) -> Vec<PolicyId> {
    policies
        .iter_mut()
        .filter_map(|policy| policy.deactivate_for_client().then(|| policy.id()))
        .collect()
}

fn validate_terms(
    insured_sum: Decimal,
    annual_premium: Decimal,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(), PolicyError> {
    if insured_sum <= Decimal::ZERO {
        return Err(PolicyError::validation("insured sum must be positive"));
    }
    if annual_premium <= Decimal::ZERO {
        return Err(PolicyError::validation("annual premium must be positive"));
    }
    if end_date <= start_date {
        return Err(PolicyError::validation("end date must be after start date"));
    }
    Ok(())
}

fn resolve_monthly(annual_premium: Decimal, explicit: Option<Decimal>) -> Result<Decimal, PolicyError> {
    match explicit {
        Some(monthly) if monthly < Decimal::ZERO => {
            Err(PolicyError::validation("monthly premium cannot be negative"))
        }
        Some(monthly) if !monthly.is_zero() => Ok(monthly),
        _ => Ok(derive_monthly_premium(annual_premium)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_policy() -> NewPolicy {
        NewPolicy {
            client_id: ClientId::new(),
            agent_id: None,
            insured_sum: dec!(10000),
            annual_premium: dec!(1200),
            monthly_premium: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            coverage: Some("Vida entera".into()),
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in PolicyStatus::ALL {
            assert_eq!(status.as_str().parse::<PolicyStatus>().unwrap(), status);
        }
        assert!("borrador".parse::<PolicyStatus>().is_err());
    }

    #[test]
    fn test_quote_emits_event() {
        let mut policy = Policy::quote(new_policy(), "POL-12345".into()).unwrap();
        let events = policy.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "PolicyQuoted");
        assert!(policy.take_events().is_empty());
    }

    #[test]
    fn test_zero_monthly_premium_is_derived() {
        let mut input = new_policy();
        input.monthly_premium = Some(Decimal::ZERO);
        let policy = Policy::quote(input, "POL-12345".into()).unwrap();
        assert_eq!(policy.monthly_premium(), dec!(100.00));
    }

    #[test]
    fn test_serializes_flat_with_spanish_status() {
        let policy = Policy::quote(new_policy(), "POL-12345".into()).unwrap();
        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(json["status"], "cotizacion");
        assert_eq!(json["policy_number"], "POL-12345");
        assert!(json.get("events").is_none());
    }

    #[test]
    fn test_assign_same_agent_twice_records_once() {
        let mut policy = Policy::quote(new_policy(), "POL-12345".into()).unwrap();
        policy.take_events();
        let agent = AgentId::new();
        policy.assign_agent(agent);
        policy.assign_agent(agent);
        assert_eq!(policy.take_events().len(), 1);
    }
}
