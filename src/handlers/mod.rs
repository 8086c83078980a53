pub mod accounts;
pub mod boardgames;
pub mod categories;
pub mod login;

use crate::error::ApiError;

/// Parse a path parameter as a positive integer id; anything else is a
/// validation failure, not a routing miss
pub(crate) fn parse_id(raw: &str, name: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| {
            ApiError::validation_error(format!("{} must be a positive integer", name), None)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_positive_integers_only() {
        assert_eq!(parse_id("12", "accountid").unwrap(), 12);
        assert!(parse_id("0", "accountid").is_err());
        assert!(parse_id("-4", "accountid").is_err());
        assert!(parse_id("twelve", "accountid").is_err());
        assert!(parse_id("1.5", "accountid").is_err());
    }
}
