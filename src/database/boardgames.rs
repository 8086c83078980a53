//! Boardgame store access. Reads go through the two-phase shape in
//! `filter::search` (resolve ids, then fetch all category associations for
//! those ids); writes that touch both the entry row and its association rows
//! share one transaction so no reader observes a partial state.

use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::database::models::boardgame::{Boardgame, NewBoardgame};
use crate::database::models::category::Category;
use crate::database::pool::{is_unique_violation, DatabaseError};
use crate::filter::search::{self, BoardgameRow, SearchFilters};

/// Filtered catalog search: resolve matching ids, then reload those entries
/// with their complete category sets.
pub async fn search(pool: &PgPool, filters: &SearchFilters) -> Result<Vec<Boardgame>, DatabaseError> {
    let sql = filters.to_id_sql();

    let mut id_query = sqlx::query_as::<_, (i32,)>(&sql.query);
    for param in &sql.params {
        id_query = bind_param(id_query, param);
    }
    let ids: Vec<i32> = id_query
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|(id,)| id)
        .collect();

    if ids.is_empty() {
        return Ok(Vec::new());
    }
    fetch_by_ids(pool, &ids).await
}

pub async fn read_by_id(pool: &PgPool, boardgame_id: i32) -> Result<Boardgame, DatabaseError> {
    let mut games = fetch_by_ids(pool, &[boardgame_id]).await?;
    match games.pop() {
        Some(game) => Ok(game),
        None => Err(DatabaseError::NotFound(format!(
            "boardgame not found by boardgameid: {}",
            boardgame_id
        ))),
    }
}

/// Insert the entry and its category links in one transaction. Title
/// uniqueness is the store's unique constraint, surfaced as Conflict.
pub async fn create(pool: &PgPool, new_game: &NewBoardgame) -> Result<Boardgame, DatabaseError> {
    let mut tx = pool.begin().await?;

    let (boardgame_id,): (i32,) = sqlx::query_as(
        "INSERT INTO boardgames \
             (title, image_url, description, min_players, max_players, min_time, max_time, min_age) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING boardgame_id",
    )
    .bind(&new_game.title)
    .bind(&new_game.image_url)
    .bind(&new_game.description)
    .bind(new_game.min_players)
    .bind(new_game.max_players)
    .bind(new_game.min_time)
    .bind(new_game.max_time)
    .bind(new_game.min_age)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            DatabaseError::Conflict("boardgame already exists".to_string())
        } else {
            DatabaseError::from(e)
        }
    })?;

    insert_category_links(&mut tx, boardgame_id, &new_game.categories).await?;
    tx.commit().await?;

    read_by_id(pool, boardgame_id).await
}

/// Overwrite the entry row and replace its category associations. The
/// delete-then-insert of the association set stays inside the transaction so
/// there is no observable empty-category window.
pub async fn update(pool: &PgPool, game: &Boardgame) -> Result<Boardgame, DatabaseError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE boardgames SET title = $2, image_url = $3, description = $4, \
             min_players = $5, max_players = $6, min_time = $7, max_time = $8, min_age = $9 \
         WHERE boardgame_id = $1",
    )
    .bind(game.boardgame_id)
    .bind(&game.title)
    .bind(&game.image_url)
    .bind(&game.description)
    .bind(game.min_players)
    .bind(game.max_players)
    .bind(game.min_time)
    .bind(game.max_time)
    .bind(game.min_age)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            DatabaseError::Conflict(format!("boardgame title already in use: {}", game.title))
        } else {
            DatabaseError::from(e)
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!(
            "boardgame not found by boardgameid: {}",
            game.boardgame_id
        )));
    }

    sqlx::query("DELETE FROM boardgame_categories WHERE boardgame_id = $1")
        .bind(game.boardgame_id)
        .execute(&mut *tx)
        .await?;
    insert_category_links(&mut tx, game.boardgame_id, &game.categories).await?;

    tx.commit().await?;

    read_by_id(pool, game.boardgame_id).await
}

/// Remove the entry's association rows and the entry itself together;
/// responds with the entry as it was before deletion.
pub async fn delete(pool: &PgPool, boardgame_id: i32) -> Result<Boardgame, DatabaseError> {
    let game = read_by_id(pool, boardgame_id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM boardgame_categories WHERE boardgame_id = $1")
        .bind(boardgame_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM boardgames WHERE boardgame_id = $1")
        .bind(boardgame_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(game)
}

async fn fetch_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<Boardgame>, DatabaseError> {
    let sql = search::detail_sql(ids.len());
    let mut query = sqlx::query_as::<_, BoardgameRow>(&sql);
    for id in ids {
        query = query.bind(*id);
    }
    let rows = query.fetch_all(pool).await?;
    validated(search::group_rows(rows))
}

fn validated(games: Vec<Boardgame>) -> Result<Vec<Boardgame>, DatabaseError> {
    for game in &games {
        game.validate().map_err(|reason| {
            DatabaseError::Corrupt(format!(
                "boardgame {} does not validate: {}",
                game.boardgame_id, reason
            ))
        })?;
    }
    Ok(games)
}

async fn insert_category_links(
    tx: &mut Transaction<'_, Postgres>,
    boardgame_id: i32,
    categories: &[Category],
) -> Result<(), DatabaseError> {
    for category in categories {
        sqlx::query("INSERT INTO boardgame_categories (boardgame_id, category_id) VALUES ($1, $2)")
            .bind(boardgame_id)
            .bind(category.category_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

fn bind_param<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    value: &'q Value,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match value {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        // search predicates only produce scalar parameters
        other => q.bind(other.to_string()),
    }
}
