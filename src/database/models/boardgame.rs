use serde::{Deserialize, Serialize};

use super::category::Category;

pub const TITLE_MAX_LEN: usize = 100;
pub const IMAGE_URL_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Catalog entry with its complete category set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boardgame {
    #[serde(rename = "boardgameid")]
    pub boardgame_id: i32,
    pub title: String,
    #[serde(rename = "imageurl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "bgdescription")]
    pub description: String,
    #[serde(rename = "minplayers")]
    pub min_players: i32,
    #[serde(rename = "maxplayers")]
    pub max_players: i32,
    #[serde(rename = "mintime")]
    pub min_time: i32,
    #[serde(rename = "maxtime")]
    pub max_time: i32,
    #[serde(rename = "minage")]
    pub min_age: i32,
    pub categories: Vec<Category>,
}

impl Boardgame {
    /// Schema check applied both to inbound payloads and to entries
    /// reconstructed from the store; a stored entry failing this indicates
    /// corruption and fails the whole read.
    pub fn validate(&self) -> Result<(), String> {
        if self.boardgame_id < 1 {
            return Err("boardgameid must be a positive integer".to_string());
        }
        validate_boardgame_fields(
            &self.title,
            self.image_url.as_deref(),
            &self.description,
            &[
                ("minplayers", self.min_players),
                ("maxplayers", self.max_players),
                ("mintime", self.min_time),
                ("maxtime", self.max_time),
                ("minage", self.min_age),
            ],
            &self.categories,
        )
    }
}

/// Creation payload: same shape as `Boardgame` minus the store-assigned id
#[derive(Debug, Clone, Deserialize)]
pub struct NewBoardgame {
    pub title: String,
    #[serde(rename = "imageurl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "bgdescription")]
    pub description: String,
    #[serde(rename = "minplayers")]
    pub min_players: i32,
    #[serde(rename = "maxplayers")]
    pub max_players: i32,
    #[serde(rename = "mintime")]
    pub min_time: i32,
    #[serde(rename = "maxtime")]
    pub max_time: i32,
    #[serde(rename = "minage")]
    pub min_age: i32,
    pub categories: Vec<Category>,
}

impl NewBoardgame {
    pub fn validate(&self) -> Result<(), String> {
        validate_boardgame_fields(
            &self.title,
            self.image_url.as_deref(),
            &self.description,
            &[
                ("minplayers", self.min_players),
                ("maxplayers", self.max_players),
                ("mintime", self.min_time),
                ("maxtime", self.max_time),
                ("minage", self.min_age),
            ],
            &self.categories,
        )
    }
}

/// Partial update payload; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardgamePatch {
    pub title: Option<String>,
    #[serde(rename = "imageurl")]
    pub image_url: Option<String>,
    #[serde(rename = "bgdescription")]
    pub description: Option<String>,
    #[serde(rename = "minplayers")]
    pub min_players: Option<i32>,
    #[serde(rename = "maxplayers")]
    pub max_players: Option<i32>,
    #[serde(rename = "mintime")]
    pub min_time: Option<i32>,
    #[serde(rename = "maxtime")]
    pub max_time: Option<i32>,
    #[serde(rename = "minage")]
    pub min_age: Option<i32>,
    pub categories: Option<Vec<Category>>,
}

impl BoardgamePatch {
    /// Merge present fields over a stored entry; the merged entry is
    /// re-validated by the caller before writing
    pub fn apply(self, game: &mut Boardgame) {
        if let Some(title) = self.title {
            game.title = title;
        }
        if let Some(image_url) = self.image_url {
            game.image_url = Some(image_url);
        }
        if let Some(description) = self.description {
            game.description = description;
        }
        if let Some(min_players) = self.min_players {
            game.min_players = min_players;
        }
        if let Some(max_players) = self.max_players {
            game.max_players = max_players;
        }
        if let Some(min_time) = self.min_time {
            game.min_time = min_time;
        }
        if let Some(max_time) = self.max_time {
            game.max_time = max_time;
        }
        if let Some(min_age) = self.min_age {
            game.min_age = min_age;
        }
        if let Some(categories) = self.categories {
            game.categories = categories;
        }
    }
}

fn validate_boardgame_fields(
    title: &str,
    image_url: Option<&str>,
    description: &str,
    numbers: &[(&str, i32)],
    categories: &[Category],
) -> Result<(), String> {
    if title.is_empty() || title.len() > TITLE_MAX_LEN {
        return Err(format!("title must be between 1 and {} characters", TITLE_MAX_LEN));
    }
    if let Some(raw) = image_url {
        if raw.len() > IMAGE_URL_MAX_LEN {
            return Err(format!(
                "imageurl must be at most {} characters",
                IMAGE_URL_MAX_LEN
            ));
        }
        url::Url::parse(raw).map_err(|_| "imageurl must be a valid URI".to_string())?;
    }
    if description.is_empty() || description.len() > DESCRIPTION_MAX_LEN {
        return Err(format!(
            "bgdescription must be between 1 and {} characters",
            DESCRIPTION_MAX_LEN
        ));
    }
    for (name, value) in numbers {
        if *value < 1 {
            return Err(format!("{} must be a positive integer", name));
        }
    }
    if categories.is_empty() {
        return Err("categories must contain at least one category".to_string());
    }
    for category in categories {
        category.validate()?;
    }
    Ok(())
}
