use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::Value;

use super::parse_id;
use crate::auth::Identity;
use crate::database::accounts::{self, AccountQuery};
use crate::database::models::account::{
    validate_email_format, validate_password_format, Account, Credentials,
};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/accounts - privileged listing, optionally narrowed by email or
/// roleid (email wins when both are given)
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Account>>, ApiError> {
    for key in params.keys() {
        if key != "email" && key != "roleid" {
            return Err(ApiError::validation_error(
                format!("unknown query parameter: {}", key),
                None,
            ));
        }
    }

    let query = if let Some(email) = params.get("email") {
        validate_email_format(email).map_err(|reason| ApiError::validation_error(reason, None))?;
        Some(AccountQuery::Email(email.clone()))
    } else if let Some(roleid) = params.get("roleid") {
        Some(AccountQuery::Role(parse_id(roleid, "roleid")?))
    } else {
        None
    };

    let accounts = accounts::read_all(&state.pool, query).await?;
    Ok(Json(accounts))
}

/// GET /api/accounts/own - self lookup via the token identity
pub async fn own(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Account>, ApiError> {
    let account = accounts::read_by_id(&state.pool, identity.account_id).await?;
    Ok(Json(account))
}

/// GET /api/accounts/:accountid - privileged lookup
pub async fn get(
    State(state): State<AppState>,
    Path(accountid): Path<String>,
) -> Result<Json<Account>, ApiError> {
    let account_id = parse_id(&accountid, "accountid")?;
    let account = accounts::read_by_id(&state.pool, account_id).await?;
    Ok(Json(account))
}

/// POST /api/accounts - open registration; the store assigns the default role
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Account>, ApiError> {
    let credentials: Credentials = serde_json::from_value(body)
        .map_err(|_| ApiError::validation_error("badly formatted request", None))?;
    credentials
        .validate()
        .map_err(|reason| ApiError::validation_error(reason, None))?;

    let account = accounts::create(&state.pool, &credentials).await?;
    Ok(Json(account))
}

/// PUT /api/accounts/own - optional password change for the caller
pub async fn update_own(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<Value>,
) -> Result<Json<Account>, ApiError> {
    let account = accounts::read_by_id(&state.pool, identity.account_id).await?;

    if let Some(password) = body.get("password") {
        let raw = password.as_str().ok_or_else(|| {
            ApiError::validation_error("password does not match requirements", None)
        })?;
        validate_password_format(raw)
            .map_err(|reason| ApiError::validation_error(reason, None))?;
        accounts::update_password(&state.pool, account.account_id, raw).await?;
    }

    Ok(Json(account))
}

/// DELETE /api/accounts/:accountid - privileged; an administrator may not
/// delete the account behind their own token
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(accountid): Path<String>,
) -> Result<Json<Account>, ApiError> {
    let account_id = parse_id(&accountid, "accountid")?;

    if identity.account_id == account_id {
        return Err(ApiError::forbidden("request denied: cannot delete own account"));
    }

    let account = accounts::delete(&state.pool, account_id).await?;
    Ok(Json(account))
}
