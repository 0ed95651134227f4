use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),
}

impl From<DbError> for cohort_core::error::CoreError {
    fn from(value: DbError) -> Self {
        Self::Storage(value.to_string())
    }
}
