//! Test Utilities Crate
//!
//! Shared test infrastructure for the brokerage workspace.
//!
//! # Modules
//!
//! - `fixtures`: fixed dates, amounts and credentials
//! - `builders`: builders for users, clients, agents and policies
//! - `database`: PostgreSQL test containers with the schema applied
//! - `assertions`: assertion helpers for domain types
//! - `generators`: proptest strategies for amounts, shares, installments and statuses

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
