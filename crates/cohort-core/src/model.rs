use chrono::{DateTime, Utc};

use crate::types::{GroupId, TenantId, UserId};

/// A named group of users inside one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub tenant_id: TenantId,
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One user-in-group row. The join table is the membership source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Membership {
    pub group_id: GroupId,
    pub user_id: UserId,
}

/// The slice of the host platform's user record this module reads and writes.
/// `group_id` is the denormalized current-group reference (0 when unset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub public_id: String,
    pub group_id: GroupId,
}

/// One page of a filtered group listing, with the unpaged match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPage {
    pub items: Vec<Group>,
    pub total: i64,
}
