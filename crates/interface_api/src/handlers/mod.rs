//! HTTP handlers
//!
//! Handlers extract and convert; the work happens in [`crate::services`].

pub mod auth;
pub mod health;
pub mod party;
pub mod policy;
pub mod beneficiaries;
pub mod notes;
pub mod billing;
pub mod claims;
