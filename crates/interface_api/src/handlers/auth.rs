//! Token issuance

use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::auth::{create_token, issue_token_pair, validate_token, TokenPair, TokenType};
use crate::dto::auth::{AccessResponse, RefreshRequest, TokenRequest};
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::AppState;

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

/// Exchanges username and password for an access/refresh pair
pub async fn obtain_token(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<TokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let Some(user) = state.party.find_user_by_username(req.username.trim()).await? else {
        warn!(username = %req.username, "login for unknown user");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };
    if let Err(e) = user.authenticate(&req.password) {
        warn!(username = %user.username, error = %e, "login rejected");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let pair = issue_token_pair(&user, &state.config)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
    info!(user_id = %user.id, role = %user.role, "tokens issued");
    Ok(Json(pair))
}

/// Trades a refresh token for a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> Result<Json<AccessResponse>, ApiError> {
    let claims = validate_token(&req.refresh, &state.config.jwt_secret, TokenType::Refresh)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;
    let user_id = claims
        .user_id()
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let user = match state.party.get_user(user_id).await {
        Ok(user) if user.is_active => user,
        Ok(_) => return Err(ApiError::unauthorized("User account is inactive")),
        Err(e) if e.is_not_found() => return Err(ApiError::unauthorized("User not found")),
        Err(e) => return Err(e.into()),
    };

    let access = create_token(
        &user,
        TokenType::Access,
        &state.config.jwt_secret,
        state.config.access_token_secs,
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
    Ok(Json(AccessResponse { access }))
}
