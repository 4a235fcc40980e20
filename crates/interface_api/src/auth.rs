//! Authentication and authorization
//!
//! Login issues a pair of signed tokens: a short-lived access token sent as
//! `Authorization: Bearer ...` and a refresh token that can only be traded
//! for a new access token. Both embed the username and the role.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::UserId;
use domain_party::{Role, User};

use crate::config::ApiConfig;

/// Which of the pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub token_type: TokenType,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// The authenticated user's id
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Access and refresh tokens returned on login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Expected an {expected:?} token")]
    WrongTokenType { expected: TokenType },
}

/// Creates a signed token for the user
pub fn create_token(
    user: &User,
    token_type: TokenType,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let lifetime = i64::try_from(expiration_secs).map_err(|_| AuthError::InvalidToken)?;
    let exp = now + Duration::seconds(lifetime);

    let claims = Claims {
        sub: user.id.as_uuid().to_string(),
        username: user.username.clone(),
        role: user.role,
        token_type,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Issues the access/refresh pair for a freshly authenticated user
pub fn issue_token_pair(user: &User, config: &ApiConfig) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access: create_token(user, TokenType::Access, &config.jwt_secret, config.access_token_secs)?,
        refresh: create_token(user, TokenType::Refresh, &config.jwt_secret, config.refresh_token_secs)?,
    })
}

/// Validates a JWT token of the expected type
pub fn validate_token(token: &str, secret: &str, expected: TokenType) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.token_type != expected {
        return Err(AuthError::WrongTokenType { expected });
    }
    Ok(token_data.claims)
}

/// Checks if the claims carry one of the allowed roles
pub fn has_role(claims: &Claims, allowed: &[Role]) -> bool {
    allowed.contains(&claims.role)
}
