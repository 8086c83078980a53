use sqlx::PgPool;

use crate::auth::TokenCodec;

/// Shared application state: the connection pool and the token codec, both
/// constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenCodec,
}
