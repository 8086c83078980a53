use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const CATEGORY_NAME_MAX_LEN: usize = 50;

/// Category label shared across catalog entries (many-to-many)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    #[serde(rename = "categoryid")]
    pub category_id: i32,
    #[serde(rename = "categoryname")]
    pub category_name: String,
}

impl Category {
    pub fn validate(&self) -> Result<(), String> {
        if self.category_id < 1 {
            return Err("categoryid must be a positive integer".to_string());
        }
        if self.category_name.is_empty() || self.category_name.len() > CATEGORY_NAME_MAX_LEN {
            return Err(format!(
                "categoryname must be between 1 and {} characters",
                CATEGORY_NAME_MAX_LEN
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_category_passes() {
        let c = Category {
            category_id: 1,
            category_name: "Strategy".to_string(),
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_empty_and_overlong_names() {
        let c = Category { category_id: 1, category_name: String::new() };
        assert!(c.validate().is_err());

        let c = Category { category_id: 1, category_name: "x".repeat(51) };
        assert!(c.validate().is_err());
    }
}
