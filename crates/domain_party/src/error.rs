//! Party domain errors

use thiserror::Error;

use core_kernel::CoreError;

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    /// Invalid party data provided
    #[error("Invalid party data: {0}")]
    InvalidData(String),

    /// The user exists but holds a different role
    #[error("User {username} does not have role {expected}")]
    RoleMismatch { username: String, expected: String },

    /// Username/password pair did not match
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Login attempted on a deactivated account
    #[error("Account is inactive")]
    InactiveAccount,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PartyError {
    pub fn invalid(message: impl Into<String>) -> Self {
        PartyError::InvalidData(message.into())
    }
}
