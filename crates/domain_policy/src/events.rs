//! Domain events for the policy aggregate
//!
//! The aggregate records what happened; application services drain the
//! events after persisting and write them to the audit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, PolicyId};

use crate::policy::PolicyStatus;

/// Domain events emitted by the Policy aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyEvent {
    /// Policy has been quoted
    PolicyQuoted {
        policy_id: PolicyId,
        policy_number: String,
        timestamp: DateTime<Utc>,
    },

    /// An agent took over the policy
    AgentAssigned {
        policy_id: PolicyId,
        agent_id: AgentId,
        timestamp: DateTime<Utc>,
    },

    /// Status field changed
    StatusChanged {
        policy_id: PolicyId,
        from: PolicyStatus,
        to: PolicyStatus,
        timestamp: DateTime<Utc>,
    },

    /// Monetary terms or dates were edited while quoting
    TermsUpdated {
        policy_id: PolicyId,
        timestamp: DateTime<Utc>,
    },
}

impl PolicyEvent {
    /// Returns the policy ID associated with this event
    pub fn policy_id(&self) -> PolicyId {
        match self {
            PolicyEvent::PolicyQuoted { policy_id, .. } => *policy_id,
            PolicyEvent::AgentAssigned { policy_id, .. } => *policy_id,
            PolicyEvent::StatusChanged { policy_id, .. } => *policy_id,
            PolicyEvent::TermsUpdated { policy_id, .. } => *policy_id,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            PolicyEvent::PolicyQuoted { timestamp, .. } => *timestamp,
            PolicyEvent::AgentAssigned { timestamp, .. } => *timestamp,
            PolicyEvent::StatusChanged { timestamp, .. } => *timestamp,
            PolicyEvent::TermsUpdated { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            PolicyEvent::PolicyQuoted { .. } => "PolicyQuoted",
            PolicyEvent::AgentAssigned { .. } => "AgentAssigned",
            PolicyEvent::StatusChanged { .. } => "StatusChanged",
            PolicyEvent::TermsUpdated { .. } => "TermsUpdated",
        }
    }
}
