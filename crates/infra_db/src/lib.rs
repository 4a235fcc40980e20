//! Infrastructure Database Layer
//!
//! PostgreSQL storage for every domain port, built on SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories own the SQL and
//! translate rows into domain types; adapters wrap a repository, implement
//! the domain's port trait and turn [`DatabaseError`] into `PortError`.
//!
//! ```text
//!   PartyPort   ─► PostgresPartyAdapter   ─► PartyRepository
//!   PolicyPort  ─► PostgresPolicyAdapter  ─► PolicyRepository
//!   BillingPort ─► PostgresBillingAdapter ─► BillingRepository
//!   ClaimsPort  ─► PostgresClaimsAdapter  ─► ClaimsRepository
//! ```
//!
//! Queries are checked at runtime (`sqlx::query_as::<_, Row>`), so building
//! the crate does not need a live database. Status enums are stored as text
//! and parsed back with the domain's `FromStr` implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresPolicyAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/univida")).await?;
//! run_migrations(&pool).await?;
//! let policies = PostgresPolicyAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{
    PostgresBillingAdapter, PostgresClaimsAdapter, PostgresPartyAdapter, PostgresPolicyAdapter,
};
