use axum::{extract::State, Json};

use crate::database::categories;
use crate::database::models::category::Category;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/categories - public full list
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = categories::read_all(&state.pool).await?;
    Ok(Json(categories))
}
