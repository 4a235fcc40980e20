//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter:
//! - Implements the domain's port trait
//! - Delegates SQL and row mapping to its repository
//! - Converts `DatabaseError` into `PortError`
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::adapters::PostgresPolicyAdapter;
//! use domain_policy::PolicyPort;
//!
//! let port: Arc<dyn PolicyPort> = Arc::new(PostgresPolicyAdapter::new(pool));
//! let policy = port.get_policy(policy_id).await?;
//! ```

pub mod party;
pub mod policy;
pub mod billing;
pub mod claims;

pub use party::PostgresPartyAdapter;
pub use policy::PostgresPolicyAdapter;
pub use billing::PostgresBillingAdapter;
pub use claims::PostgresClaimsAdapter;

use std::time::Instant;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Runs `SELECT 1` against the pool and reports latency
pub(crate) async fn probe(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}
