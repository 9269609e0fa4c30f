use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("{0}")]
    Query(#[from] sqlx::Error),

    /// Column `index` did not hold a value of the requested type.
    #[error("column {index}: expected {expected}")]
    Decode { index: usize, expected: &'static str },

    #[error("driver reported no generated id for insert")]
    MissingInsertId,

    #[error("preparing sqlite path: {0}")]
    Io(#[from] std::io::Error),
}
