//! Wire types for the RPC operations, `PascalCase` like the host platform.

use serde::{Deserialize, Serialize};

use cohort_core::model::{DirectoryUser, Group};
use cohort_core::types::{GroupId, TenantId, UserId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateGroupRequest {
    pub tenant_id: TenantId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateGroupRequest {
    pub id: GroupId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteGroupsRequest {
    pub tenant_id: TenantId,
    pub id_list: Vec<GroupId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetGroupRequest {
    pub id: GroupId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetGroupsRequest {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetGroupUsersRequest {
    pub tenant_id: TenantId,
    pub group_id: GroupId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupUsersRequest {
    pub group_id: GroupId,
    pub users_ids: Vec<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaveGroupsOfUserRequest {
    pub user_id: UserId,
    pub groups_ids: Vec<GroupId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserGroupRequest {
    pub user_id: UserId,
    pub group_id: GroupId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeDefaultGroupRequest {
    pub tenant_id: TenantId,
    pub group_id: GroupId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetDefaultGroupRequest {
    pub tenant_id: TenantId,
}

/// Body of the operations keyed by a single user id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserScopedRequest {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TenantDeletedRequest {
    pub tenant_id: TenantId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDeletedRequest {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserCreatedRequest {
    pub user_id: UserId,
    pub tenant_id: TenantId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupDto {
    pub id: GroupId,
    pub tenant_id: TenantId,
    pub name: String,
    pub is_default: bool,
}

impl From<Group> for GroupDto {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            tenant_id: group.tenant_id,
            name: group.name,
            is_default: group.is_default,
        }
    }
}

/// One listing page and the unpaged match count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupListResponse {
    pub count: i64,
    pub items: Vec<GroupDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserSummaryDto {
    pub id: UserId,
    pub public_id: String,
    pub group_id: GroupId,
}

impl From<DirectoryUser> for UserSummaryDto {
    fn from(user: DirectoryUser) -> Self {
        Self {
            id: user.id,
            public_id: user.public_id,
            group_id: user.group_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub error_code: &'static str,
    pub error_message: String,
}
