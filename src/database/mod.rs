pub mod accounts;
pub mod boardgames;
pub mod categories;
pub mod models;
pub mod pool;

pub use pool::DatabaseError;
