use axum::{
    extract::State,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde_json::Value;

use crate::auth::{Identity, TOKEN_HEADER};
use crate::database::accounts::{self, CredentialError};
use crate::database::models::account::Credentials;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/accounts/login - verify credentials, respond with the account in
/// the body and a freshly issued token in the dedicated header
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials: Credentials = serde_json::from_value(body)
        .map_err(|_| ApiError::validation_error("badly formatted request", None))?;
    credentials
        .validate()
        .map_err(|reason| ApiError::validation_error(reason, None))?;

    let account = match accounts::check_credentials(&state.pool, &credentials).await {
        Ok(account) => account,
        Err(err @ (CredentialError::UnknownEmail | CredentialError::Mismatch)) => {
            // one generic failure for either cause, so callers cannot probe
            // which emails have accounts
            tracing::debug!("login rejected: {}", err);
            return Err(ApiError::unauthorized("invalid account email or password"));
        }
        Err(CredentialError::Database(e)) => return Err(e.into()),
    };

    let identity = Identity::from(&account);
    let token = state.tokens.issue(&identity)?;

    Ok((AppendHeaders([(TOKEN_HEADER, token)]), Json(account)))
}
