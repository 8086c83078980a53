use sqlx::PgPool;

use crate::database::models::category::Category;
use crate::database::pool::DatabaseError;

/// Full category list. Each row is re-validated against the category schema;
/// a failing row fails the whole read as corruption.
pub async fn read_all(pool: &PgPool) -> Result<Vec<Category>, DatabaseError> {
    let categories: Vec<Category> =
        sqlx::query_as("SELECT category_id, category_name FROM categories ORDER BY category_id")
            .fetch_all(pool)
            .await?;

    for category in &categories {
        category.validate().map_err(|reason| {
            DatabaseError::Corrupt(format!(
                "category {} does not validate: {}",
                category.category_id, reason
            ))
        })?;
    }

    Ok(categories)
}
