use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::TOKEN_HEADER;
use crate::error::ApiError;
use crate::state::AppState;

/// Token-parsing middleware: decodes the bearer token from the dedicated
/// header and attaches the embedded identity to the request. No store lookup
/// happens here; the token is trusted at face value.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(TOKEN_HEADER)
        .ok_or_else(|| ApiError::unauthorized("access denied: no token provided"))?;

    let token = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("access denied: invalid token"))?;

    let identity = state.tokens.parse(token).map_err(|e| {
        tracing::debug!("token rejected: {}", e);
        ApiError::unauthorized("access denied: invalid token")
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
