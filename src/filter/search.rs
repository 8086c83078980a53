//! Translates optional catalog search criteria into parameterized SQL
//! predicates and reassembles flattened (entry x category) join rows into one
//! logical entry per id.
//!
//! Execution is two-phase: the predicate set first resolves the matching
//! entry ids, then a second query fetches ALL category associations for
//! exactly those ids. Filtering and fetching in one pass would truncate an
//! entry's category list to only the categories that matched the filter.

use std::collections::HashMap;

use serde_json::Value;
use sqlx::FromRow;

use super::error::FilterError;
use crate::database::models::boardgame::Boardgame;
use crate::database::models::category::{Category, CATEGORY_NAME_MAX_LEN};

/// A query string plus its positional bind parameters
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

const ENTRY_CATEGORY_JOIN: &str = "FROM boardgames bg \
     INNER JOIN boardgame_categories bgc ON bg.boardgame_id = bgc.boardgame_id \
     INNER JOIN categories c ON bgc.category_id = c.category_id";

/// Search criteria for the catalog. Every dimension is independently
/// optional; absent dimensions impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Category names; an entry matches if it carries ANY of them
    pub categories: Option<Vec<String>>,
    /// Requested player count; matches entries whose player range contains it
    pub players: Option<i32>,
    /// Available play time; matches entries whose minimum time fits within it
    pub time: Option<i32>,
    /// Player age; matches entries whose minimum age does not exceed it
    pub minage: Option<i32>,
}

impl SearchFilters {
    /// Parse raw query-string parameters. Unknown keys are rejected, numeric
    /// values must be positive integers, and category names are screened
    /// before they participate in predicate assembly.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, FilterError> {
        let mut filters = SearchFilters::default();

        for (key, value) in query {
            match key.as_str() {
                "category" => {
                    // clients occasionally send trailing newlines in the list
                    let names: Vec<String> = value
                        .replace('\n', "")
                        .split(',')
                        .map(|name| name.trim().to_string())
                        .collect();
                    for name in &names {
                        validate_category_name(name)?;
                    }
                    filters.categories = Some(names);
                }
                "players" => filters.players = Some(parse_positive(value, "players")?),
                "time" => filters.time = Some(parse_positive(value, "time")?),
                "minage" => filters.minage = Some(parse_positive(value, "minage")?),
                other => return Err(FilterError::UnknownParameter(other.to_string())),
            }
        }

        Ok(filters)
    }

    /// Phase one: the id-resolution query. Present dimensions combine with
    /// AND; the category list collapses to a single IN predicate (OR across
    /// names). Absent dimensions contribute the identity predicate.
    pub fn to_id_sql(&self) -> SqlResult {
        let mut params: Vec<Value> = Vec::new();
        let mut conditions: Vec<String> = Vec::new();

        match &self.categories {
            Some(names) if !names.is_empty() => {
                let placeholders: Vec<String> = names
                    .iter()
                    .map(|name| {
                        params.push(Value::String(name.clone()));
                        format!("${}", params.len())
                    })
                    .collect();
                conditions.push(format!("c.category_name IN ({})", placeholders.join(", ")));
            }
            _ => conditions.push("1=1".to_string()),
        }

        match self.players {
            Some(players) => {
                params.push(Value::from(players));
                let p = params.len();
                conditions.push(format!("bg.min_players <= ${p} AND ${p} <= bg.max_players"));
            }
            None => conditions.push("1=1".to_string()),
        }

        match self.time {
            Some(time) => {
                params.push(Value::from(time));
                let p = params.len();
                // only the lower bound is consulted; the stored maximum play
                // time does not participate in this predicate
                conditions.push(format!("${p} >= bg.min_time"));
            }
            None => conditions.push("1=1".to_string()),
        }

        match self.minage {
            Some(minage) => {
                params.push(Value::from(minage));
                let p = params.len();
                conditions.push(format!("bg.min_age <= ${p}"));
            }
            None => conditions.push("1=1".to_string()),
        }

        let query = format!(
            "SELECT DISTINCT bg.boardgame_id {} WHERE {}",
            ENTRY_CATEGORY_JOIN,
            conditions.join(" AND ")
        );

        SqlResult { query, params }
    }
}

const DETAIL_COLUMNS: &str = "bg.boardgame_id, bg.title, bg.image_url, bg.description, \
     bg.min_players, bg.max_players, bg.min_time, bg.max_time, bg.min_age, \
     c.category_id, c.category_name";

/// Phase two: fetch every (entry, category) row for the resolved ids. No
/// filter predicate appears here, so each entry comes back with its complete
/// category set. Rows for the same entry are contiguous.
pub fn detail_sql(id_count: usize) -> String {
    let placeholders: Vec<String> = (1..=id_count).map(|i| format!("${}", i)).collect();
    format!(
        "SELECT {} {} WHERE bg.boardgame_id IN ({}) ORDER BY bg.boardgame_id",
        DETAIL_COLUMNS,
        ENTRY_CATEGORY_JOIN,
        placeholders.join(", ")
    )
}

/// One flattened (entry, category) join row
#[derive(Debug, Clone, FromRow)]
pub struct BoardgameRow {
    pub boardgame_id: i32,
    pub title: String,
    pub image_url: Option<String>,
    pub description: String,
    pub min_players: i32,
    pub max_players: i32,
    pub min_time: i32,
    pub max_time: i32,
    pub min_age: i32,
    pub category_id: i32,
    pub category_name: String,
}

/// Group contiguous rows sharing an entry id into one entry with an
/// accumulating category list. Only contiguity is assumed, not a global sort
/// by id.
pub fn group_rows(rows: Vec<BoardgameRow>) -> Vec<Boardgame> {
    let mut games: Vec<Boardgame> = Vec::new();

    for row in rows {
        let category = Category {
            category_id: row.category_id,
            category_name: row.category_name,
        };

        if let Some(last) = games.last_mut() {
            if last.boardgame_id == row.boardgame_id {
                last.categories.push(category);
                continue;
            }
        }

        games.push(Boardgame {
            boardgame_id: row.boardgame_id,
            title: row.title,
            image_url: row.image_url,
            description: row.description,
            min_players: row.min_players,
            max_players: row.max_players,
            min_time: row.min_time,
            max_time: row.max_time,
            min_age: row.min_age,
            categories: vec![category],
        });
    }

    games
}

fn parse_positive(value: &str, name: &'static str) -> Result<i32, FilterError> {
    match value.trim().parse::<i32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(FilterError::InvalidNumber(name)),
    }
}

fn validate_category_name(name: &str) -> Result<(), FilterError> {
    if name.is_empty() || name.len() > CATEGORY_NAME_MAX_LEN {
        return Err(FilterError::InvalidCategory(format!(
            "name must be between 1 and {} characters",
            CATEGORY_NAME_MAX_LEN
        )));
    }
    // statement separators never belong in a category name, bound parameters
    // or not
    if name.contains(';') {
        return Err(FilterError::InvalidCategory(
            "name must not contain ';'".to_string(),
        ));
    }
    Ok(())
}
