//! Party Management Domain
//!
//! Everyone who logs in is a [`User`] with exactly one [`Role`]. Clients and
//! agents additionally own a one-to-one profile:
//!
//! - **Client**: birth date, address, identification and health status
//! - **Agent**: agent code, hire date, specialty, commission and office data
//!
//! Accounts are never deleted. Deactivation switches `is_active` off, which
//! blocks login; the policy-side consequences live in `domain_policy`.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_party::{User, Role, PasswordHash, ClientProfile, Client};
//!
//! let user = User::new("maria", Role::Client, PasswordHash::derive("s3cret!"))?;
//! let profile = ClientProfile::new(user.id, birth_date, "Av. Arce 100", "CI-4455")?;
//! let client = Client::new(user, profile);
//! ```

pub mod user;
pub mod credentials;
pub mod client;
pub mod agent;
pub mod error;
pub mod ports;

pub use user::{User, Role};
pub use credentials::PasswordHash;
pub use client::{Client, ClientProfile, DEFAULT_HEALTH_STATUS};
pub use agent::{Agent, AgentProfile, AgentStatus};
pub use error::PartyError;
pub use ports::PartyPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockPartyPort;
