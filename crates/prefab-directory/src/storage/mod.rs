//! SQLite persistence behind the repository traits.

mod blog;
mod builders;
mod catalog;
mod leads;
mod schema;
mod sqlite;
mod users;

pub use sqlite::SqliteStore;

/// Failure reported by a repository implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} with this {field} already exists")]
    Conflict { entity: &'static str, field: String },
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("the last admin cannot be demoted or removed")]
    LastAdmin,
    #[error("referenced {entity} does not exist")]
    MissingReference { entity: &'static str },
    #[error("database error: {0}")]
    Backend(String),
    #[error("stored value could not be decoded: {0}")]
    Encoding(String),
}
