use cohort_core::error::CoreError;
use cohort_core::types::{GroupId, TenantId};
use thiserror::Error;

/// Groups module errors
#[derive(Error, Debug)]
pub enum GroupsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Group '{name}' already exists in tenant {tenant_id}")]
    GroupAlreadyExists { tenant_id: TenantId, name: String },

    #[error("Group {group_id} is the default group of tenant {tenant_id} and cannot be deleted")]
    CannotDeleteDefaultGroup {
        tenant_id: TenantId,
        group_id: GroupId,
    },

    #[error(transparent)]
    Store(#[from] CoreError),
}

pub type GroupsResult<T> = std::result::Result<T, GroupsError>;

impl GroupsError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
