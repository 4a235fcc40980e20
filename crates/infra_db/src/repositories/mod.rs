//! Repository implementations for domain entities
//!
//! Repositories own the SQL for one aggregate family and map between
//! database rows and domain types. Queries are built at runtime with
//! `sqlx::query_as::<_, Row>`; statuses are stored as their text codes.
//!
//! Writes that span several tables (user + profile, the policy settlement)
//! run in one transaction.

pub mod policy;
pub mod party;
pub mod billing;
pub mod claims;

pub use policy::PolicyRepository;
pub use party::PartyRepository;
pub use billing::BillingRepository;
pub use claims::ClaimsRepository;
