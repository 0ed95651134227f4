use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] cohort_service::error::GroupsError),

    #[error(transparent)]
    DatabaseError(#[from] cohort_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] cohort_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
