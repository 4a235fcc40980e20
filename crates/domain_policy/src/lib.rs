//! Policy Domain
//!
//! A [`Policy`] is the contract between a client and, optionally, the agent
//! who handles it. Beneficiaries and free-text notes hang off a policy.
//!
//! # Policy Lifecycle
//!
//! ```text
//! cotizacion ──aceptar──> pendiente_pago ──settled──> activa
//!     │  └──────────settled / activar───────────────────┘
//!     └──cancelar──> cancelada
//!
//! cotizacion | pendiente_pago | activa ──client deactivated──> inactiva
//! ```
//!
//! `vencida` is only ever set by the store; no transition in this crate
//! produces it.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_policy::{NewPolicy, Policy};
//!
//! let mut policy = Policy::quote(new_policy, "POL-48213".into())?;
//! policy.accept_solicitation(agent_id)?;
//! assert_eq!(policy.status(), PolicyStatus::PendingPayment);
//! ```

pub mod policy;
pub mod beneficiary;
pub mod note;
pub mod events;
pub mod error;
pub mod ports;

pub use policy::{
    cascade_client_deactivation, derive_monthly_premium, NewPolicy, Policy, PolicyRecord,
    PolicyStatus, TermsUpdate,
};
pub use beneficiary::{assigned_percentage, ensure_share_available, Beneficiary, MAX_TOTAL_SHARE};
pub use note::{NoteType, PolicyNote};
pub use events::PolicyEvent;
pub use error::PolicyError;
pub use ports::PolicyPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockPolicyPort;
