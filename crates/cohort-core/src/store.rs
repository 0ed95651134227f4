//! Storage trait definitions for the groups module.
//!
//! All operations are async. `GroupStore` owns the module's own tables;
//! `UserDirectory` is the narrow window onto the host platform's user
//! records. Implementations map their backend failures to
//! [`CoreError::Storage`](crate::error::CoreError::Storage); a missing row
//! is `None`, never an error.

use crate::error::CoreResult;
use crate::model::{DirectoryUser, Group, Membership};
use crate::types::{GroupId, TenantId, UserId};

/// Persistence for groups and membership rows.
pub trait GroupStore: Send + Sync {
    /// Inserts a non-default group and returns its id.
    fn create_group(
        &self,
        tenant_id: TenantId,
        name: &str,
    ) -> impl Future<Output = CoreResult<GroupId>> + Send;

    fn group_by_id(&self, id: GroupId) -> impl Future<Output = CoreResult<Option<Group>>> + Send;

    /// Exact-name lookup inside one tenant.
    fn group_by_name(
        &self,
        tenant_id: TenantId,
        name: &str,
    ) -> impl Future<Output = CoreResult<Option<Group>>> + Send;

    /// One page of a tenant's groups, name ascending, filtered by a
    /// case-insensitive substring (`%` and `_` are literals; empty matches
    /// all). `limit` 0 means unbounded.
    fn groups_page(
        &self,
        tenant_id: TenantId,
        offset: i64,
        limit: i64,
        search: &str,
    ) -> impl Future<Output = CoreResult<Vec<Group>>> + Send;

    /// Unpaged count for the same filter as [`Self::groups_page`].
    fn groups_count(
        &self,
        tenant_id: TenantId,
        search: &str,
    ) -> impl Future<Output = CoreResult<i64>> + Send;

    fn set_group_name(
        &self,
        id: GroupId,
        name: &str,
    ) -> impl Future<Output = CoreResult<()>> + Send;

    fn set_group_default(
        &self,
        id: GroupId,
        is_default: bool,
    ) -> impl Future<Output = CoreResult<()>> + Send;

    /// Unconditional row delete; true when a row went away.
    fn delete_group(&self, id: GroupId) -> impl Future<Output = CoreResult<bool>> + Send;

    fn memberships_of_group(
        &self,
        group_id: GroupId,
    ) -> impl Future<Output = CoreResult<Vec<Membership>>> + Send;

    fn memberships_of_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = CoreResult<Vec<Membership>>> + Send;

    /// Inserts the membership row if it does not already exist.
    fn insert_membership(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> impl Future<Output = CoreResult<()>> + Send;

    fn delete_membership(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> impl Future<Output = CoreResult<()>> + Send;

    /// Removes the given users from one group; returns rows deleted.
    fn delete_memberships(
        &self,
        group_id: GroupId,
        user_ids: &[UserId],
    ) -> impl Future<Output = CoreResult<u64>> + Send;

    fn delete_memberships_of_group(
        &self,
        group_id: GroupId,
    ) -> impl Future<Output = CoreResult<u64>> + Send;

    fn delete_memberships_of_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = CoreResult<u64>> + Send;
}

/// Read and write access to the host-owned user records.
pub trait UserDirectory: Send + Sync {
    fn user_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = CoreResult<Option<DirectoryUser>>> + Send;

    /// Fetches the given users, ordered by public id ascending. Unknown ids
    /// are silently absent from the result.
    fn users_by_ids(
        &self,
        ids: &[UserId],
    ) -> impl Future<Output = CoreResult<Vec<DirectoryUser>>> + Send;

    /// Writes the user's current-group reference (0 clears it).
    fn set_user_group(
        &self,
        user_id: UserId,
        group_id: GroupId,
    ) -> impl Future<Output = CoreResult<()>> + Send;

    /// Resets to 0 every current-group reference pointing at `group_id`,
    /// optionally restricted to a set of users; returns rows changed.
    fn clear_group_references(
        &self,
        group_id: GroupId,
        user_ids: Option<&[UserId]>,
    ) -> impl Future<Output = CoreResult<u64>> + Send;
}
