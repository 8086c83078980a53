use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use super::parse_id;
use crate::database::boardgames;
use crate::database::models::boardgame::{Boardgame, BoardgamePatch, NewBoardgame};
use crate::error::ApiError;
use crate::filter::SearchFilters;
use crate::state::AppState;

/// GET /api/boardgames - public filtered search over the catalog
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Boardgame>>, ApiError> {
    let filters = SearchFilters::from_query(&params)?;
    let games = boardgames::search(&state.pool, &filters).await?;
    Ok(Json(games))
}

/// POST /api/boardgames - privileged create
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Boardgame>, ApiError> {
    let new_game: NewBoardgame = serde_json::from_value(body)
        .map_err(|_| ApiError::validation_error("badly formatted request", None))?;
    new_game
        .validate()
        .map_err(|reason| ApiError::validation_error(reason, None))?;

    let game = boardgames::create(&state.pool, &new_game).await?;
    Ok(Json(game))
}

/// PUT /api/boardgames/:boardgameid - privileged partial update; the merged
/// entry is re-validated and title uniqueness is re-checked by the store
/// constraint
pub async fn update(
    State(state): State<AppState>,
    Path(boardgameid): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Boardgame>, ApiError> {
    let boardgame_id = parse_id(&boardgameid, "boardgameid")?;

    let patch: BoardgamePatch = serde_json::from_value(body)
        .map_err(|_| ApiError::validation_error("badly formatted request", None))?;

    let mut game = boardgames::read_by_id(&state.pool, boardgame_id).await?;
    patch.apply(&mut game);
    game.validate()
        .map_err(|reason| ApiError::validation_error(reason, None))?;

    let game = boardgames::update(&state.pool, &game).await?;
    Ok(Json(game))
}

/// DELETE /api/boardgames/:boardgameid - privileged; responds with the
/// deleted entry
pub async fn remove(
    State(state): State<AppState>,
    Path(boardgameid): Path<String>,
) -> Result<Json<Boardgame>, ApiError> {
    let boardgame_id = parse_id(&boardgameid, "boardgameid")?;
    let game = boardgames::delete(&state.pool, boardgame_id).await?;
    Ok(Json(game))
}
