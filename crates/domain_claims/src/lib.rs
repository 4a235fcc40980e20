//! Claims Management Domain
//!
//! A claim (siniestro) is a loss reported against an active policy and
//! resolved by approval or rejection.
//!
//! # Claim Lifecycle
//!
//! ```text
//! reportado -> en_revision -> aprobado -> pagado
//!     │             │
//!     └─────────────┴──────> rechazado
//! ```
//!
//! Approval and rejection are also legal straight from `reportado`. An
//! approved claim always carries an approved amount no larger than the
//! claimed amount, whichever path set it.

pub mod claim;
pub mod error;
pub mod ports;

pub use claim::{
    Claim, ClaimStatus, ClaimType, ClaimUpdate, NewClaim, DEFAULT_APPROVAL_TEXT,
    DEFAULT_REJECTION_TEXT,
};
pub use error::ClaimError;
pub use ports::ClaimsPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockClaimsPort;
