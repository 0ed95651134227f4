//! Group coordination over injected storage.
//!
//! Operations run as sequences of individual store calls, never inside a
//! cross-call transaction; a crash mid-operation can leave partial state,
//! and the default-group read path repairs the one-default-per-tenant
//! invariant on its next run.

use cohort_core::config::GroupsConfig;
use cohort_core::model::{DirectoryUser, Group, GroupPage};
use cohort_core::store::{GroupStore, UserDirectory};
use cohort_core::types::{GroupId, NO_GROUP, TenantId, UserId};

use crate::error::{GroupsError, GroupsResult};

/// Domain logic for tenant-scoped user groups.
///
/// Generic over its two storage dependencies so Postgres is injected in the
/// binary and in-memory fakes in tests.
pub struct GroupCoordinator<S, D>
where
    S: GroupStore,
    D: UserDirectory,
{
    store: S,
    directory: D,
    config: GroupsConfig,
}

impl<S, D> GroupCoordinator<S, D>
where
    S: GroupStore,
    D: UserDirectory,
{
    #[must_use]
    pub fn new(store: S, directory: D, config: GroupsConfig) -> Self {
        Self {
            store,
            directory,
            config,
        }
    }

    /// ## Summary
    /// Creates a group and returns its id. Names are trimmed and, outside
    /// tenant 0, unique per tenant.
    ///
    /// ## Errors
    /// `InvalidInput` for a negative tenant or blank name,
    /// `GroupAlreadyExists` on a name collision.
    #[tracing::instrument(skip(self))]
    pub async fn create_group(&self, tenant_id: TenantId, name: &str) -> GroupsResult<GroupId> {
        if tenant_id < 0 {
            return Err(GroupsError::invalid_input("tenant id must not be negative"));
        }
        let name = valid_name(name)?;

        // Custom groups in tenant 0 are exempt from the uniqueness rule.
        if tenant_id > 0 && self.store.group_by_name(tenant_id, name).await?.is_some() {
            return Err(GroupsError::GroupAlreadyExists {
                tenant_id,
                name: name.to_owned(),
            });
        }

        let id = self.store.create_group(tenant_id, name).await?;

        tracing::info!(group_id = id, tenant_id, "Group created");

        Ok(id)
    }

    /// ## Summary
    /// Renames a group, enforcing the same per-tenant uniqueness as
    /// [`Self::create_group`]. Renaming a group to its current name is a
    /// no-op.
    ///
    /// ## Errors
    /// `InvalidInput` for an unknown group or blank name,
    /// `GroupAlreadyExists` on a name collision.
    #[tracing::instrument(skip(self))]
    pub async fn update_group(&self, group_id: GroupId, name: &str) -> GroupsResult<()> {
        let name = valid_name(name)?;

        let Some(group) = self.store.group_by_id(group_id).await? else {
            return Err(GroupsError::invalid_input("unknown group"));
        };
        if group.name == name {
            return Ok(());
        }

        if group.tenant_id > 0 {
            if let Some(other) = self.store.group_by_name(group.tenant_id, name).await? {
                if other.id != group_id {
                    return Err(GroupsError::GroupAlreadyExists {
                        tenant_id: group.tenant_id,
                        name: name.to_owned(),
                    });
                }
            }
        }

        self.store.set_group_name(group_id, name).await?;

        tracing::info!(group_id, "Group renamed");

        Ok(())
    }

    pub async fn get_group(&self, group_id: GroupId) -> GroupsResult<Option<Group>> {
        if group_id <= 0 {
            return Ok(None);
        }
        Ok(self.store.group_by_id(group_id).await?)
    }

    /// ## Summary
    /// Returns the tenant's default group, repairing the invariant on the
    /// way: with no default flagged the alphabetically first group of the
    /// whole tenant is promoted, and extra flags are demoted. Tenant 0 has
    /// no default.
    #[tracing::instrument(skip(self))]
    pub async fn get_default_group(&self, tenant_id: TenantId) -> GroupsResult<Option<Group>> {
        self.ensure_default_group(tenant_id).await
    }

    /// ## Summary
    /// Makes `group_id` the tenant's default group. Only rows whose flag
    /// actually changes are written, so repeating the call is a no-op.
    ///
    /// ## Errors
    /// `InvalidInput` when the group does not exist or belongs to another
    /// tenant.
    #[tracing::instrument(skip(self))]
    pub async fn change_default_group(
        &self,
        tenant_id: TenantId,
        group_id: GroupId,
    ) -> GroupsResult<()> {
        if tenant_id <= 0 {
            return Err(GroupsError::invalid_input(
                "tenant 0 does not have a default group",
            ));
        }
        let Some(target) = self.store.group_by_id(group_id).await? else {
            return Err(GroupsError::invalid_input("unknown group"));
        };
        if target.tenant_id != tenant_id {
            return Err(GroupsError::invalid_input(
                "group belongs to a different tenant",
            ));
        }

        // Demote first so a crash between writes never leaves two defaults.
        let groups = self.store.groups_page(tenant_id, 0, 0, "").await?;
        for group in &groups {
            if group.id != group_id && group.is_default {
                self.store.set_group_default(group.id, false).await?;
            }
        }
        if !target.is_default {
            self.store.set_group_default(group_id, true).await?;
            tracing::info!(group_id, tenant_id, "Default group changed");
        }

        Ok(())
    }

    /// ## Summary
    /// Deletes a group: its membership rows go first, then every
    /// current-group reference pointing at it is reset, then the row
    /// itself. Returns the ids of the users that were members, for
    /// [`Self::reassign_users_to_default`].
    ///
    /// ## Errors
    /// `InvalidInput` for an unknown group, `CannotDeleteDefaultGroup` for
    /// the tenant default.
    #[tracing::instrument(skip(self))]
    pub async fn delete_group(&self, group_id: GroupId) -> GroupsResult<Vec<UserId>> {
        let Some(group) = self.store.group_by_id(group_id).await? else {
            return Err(GroupsError::invalid_input("unknown group"));
        };
        if group.is_default {
            return Err(GroupsError::CannotDeleteDefaultGroup {
                tenant_id: group.tenant_id,
                group_id,
            });
        }

        let affected = self.delete_group_rows(&group).await?;

        Ok(affected)
    }

    /// ## Summary
    /// Puts the given users into the tenant's default group (membership and
    /// current-group reference). Used after deleting the group they were
    /// in. Per-user failures are logged and skipped; returns the number of
    /// users reassigned. Without a default group nothing happens.
    #[tracing::instrument(skip(self, user_ids), fields(users = user_ids.len()))]
    pub async fn reassign_users_to_default(
        &self,
        tenant_id: TenantId,
        user_ids: &[UserId],
    ) -> GroupsResult<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let Some(default) = self.ensure_default_group(tenant_id).await? else {
            tracing::debug!(tenant_id, "No default group; users left ungrouped");
            return Ok(0);
        };

        let mut reassigned = 0;
        for &user_id in user_ids {
            let result = async {
                self.store.insert_membership(default.id, user_id).await?;
                self.directory.set_user_group(user_id, default.id).await
            }
            .await;
            match result {
                Ok(()) => reassigned += 1,
                Err(error) => {
                    tracing::warn!(user_id, group_id = default.id, %error, "Failed to reassign user to default group");
                }
            }
        }

        Ok(reassigned)
    }

    /// ## Summary
    /// One page of a tenant's groups, name ascending, filtered by a
    /// case-insensitive substring of the name; `total` counts every match.
    /// A `limit` of 0 means no page bound. Repairs the tenant's default
    /// flag before reading.
    ///
    /// ## Errors
    /// `InvalidInput` for a negative tenant, offset, or limit.
    #[tracing::instrument(skip(self))]
    pub async fn get_groups(
        &self,
        tenant_id: TenantId,
        offset: i64,
        limit: i64,
        search: &str,
    ) -> GroupsResult<GroupPage> {
        if tenant_id < 0 {
            return Err(GroupsError::invalid_input("tenant id must not be negative"));
        }
        if offset < 0 || limit < 0 {
            return Err(GroupsError::invalid_input(
                "offset and limit must not be negative",
            ));
        }

        if tenant_id > 0 {
            self.ensure_default_group(tenant_id).await?;
        }

        let items = self
            .store
            .groups_page(tenant_id, offset, limit, search)
            .await?;
        let total = self.store.groups_count(tenant_id, search).await?;

        Ok(GroupPage { items, total })
    }

    /// Users of a group, public id ascending. An unknown group is empty.
    #[tracing::instrument(skip(self))]
    pub async fn get_group_users(&self, group_id: GroupId) -> GroupsResult<Vec<DirectoryUser>> {
        if self.store.group_by_id(group_id).await?.is_none() {
            return Ok(Vec::new());
        }

        let memberships = self.store.memberships_of_group(group_id).await?;
        let ids: Vec<UserId> = memberships.iter().map(|m| m.user_id).collect();

        Ok(self.directory.users_by_ids(&ids).await?)
    }

    /// ## Summary
    /// Adds users to a group. Users already in the group stay untouched.
    ///
    /// ## Errors
    /// `InvalidInput` for an unknown group.
    #[tracing::instrument(skip(self, user_ids), fields(users = user_ids.len()))]
    pub async fn add_to_group(&self, group_id: GroupId, user_ids: &[UserId]) -> GroupsResult<()> {
        if self.store.group_by_id(group_id).await?.is_none() {
            return Err(GroupsError::invalid_input("unknown group"));
        }

        for &user_id in user_ids {
            self.store.insert_membership(group_id, user_id).await?;
        }

        tracing::info!(group_id, users = user_ids.len(), "Users added to group");

        Ok(())
    }

    /// ## Summary
    /// Removes users from a group and resets the current-group reference of
    /// those whose reference pointed at it. Users not in the group are
    /// ignored.
    #[tracing::instrument(skip(self, user_ids), fields(users = user_ids.len()))]
    pub async fn remove_users_from_group(
        &self,
        group_id: GroupId,
        user_ids: &[UserId],
    ) -> GroupsResult<()> {
        if user_ids.is_empty() {
            return Ok(());
        }

        let removed = self.store.delete_memberships(group_id, user_ids).await?;
        self.directory
            .clear_group_references(group_id, Some(user_ids))
            .await?;

        tracing::info!(group_id, removed, "Users removed from group");

        Ok(())
    }

    /// ## Summary
    /// Replaces the set of groups a user belongs to. Memberships present in
    /// both the old and new set are left untouched; if the user's
    /// current-group reference points at a dropped group it is reset.
    ///
    /// ## Errors
    /// `InvalidInput` when one of the listed groups does not exist; nothing
    /// is written in that case.
    #[tracing::instrument(skip(self, group_ids), fields(groups = group_ids.len()))]
    pub async fn save_groups_of_user(
        &self,
        user_id: UserId,
        group_ids: &[GroupId],
    ) -> GroupsResult<()> {
        let mut desired: Vec<GroupId> = group_ids.iter().copied().filter(|&id| id > 0).collect();
        desired.sort_unstable();
        desired.dedup();

        let current: Vec<GroupId> = self
            .store
            .memberships_of_user(user_id)
            .await?
            .iter()
            .map(|m| m.group_id)
            .collect();

        let to_add: Vec<GroupId> = desired
            .iter()
            .copied()
            .filter(|id| !current.contains(id))
            .collect();
        let to_remove: Vec<GroupId> = current
            .iter()
            .copied()
            .filter(|id| !desired.contains(id))
            .collect();

        // Validate every addition before the first write.
        for &group_id in &to_add {
            if self.store.group_by_id(group_id).await?.is_none() {
                return Err(GroupsError::invalid_input("unknown group"));
            }
        }

        for &group_id in &to_remove {
            self.store.delete_membership(group_id, user_id).await?;
        }
        for &group_id in &to_add {
            self.store.insert_membership(group_id, user_id).await?;
        }

        if let Some(user) = self.directory.user_by_id(user_id).await? {
            if user.group_id != NO_GROUP && !desired.contains(&user.group_id) {
                self.directory.set_user_group(user_id, NO_GROUP).await?;
            }
        }

        tracing::info!(
            user_id,
            added = to_add.len(),
            removed = to_remove.len(),
            "User group set saved"
        );

        Ok(())
    }

    /// ## Summary
    /// Writes the user's single-valued current-group reference. A non-zero
    /// group must exist and belong to the user's tenant (tenant-0 groups
    /// are open to everyone); the backing membership row is created when
    /// missing. Group 0 clears the reference and nothing else.
    ///
    /// ## Errors
    /// `InvalidInput` for an unknown user or group, or a group of another
    /// tenant.
    #[tracing::instrument(skip(self))]
    pub async fn update_user_group(&self, user_id: UserId, group_id: GroupId) -> GroupsResult<()> {
        let Some(user) = self.directory.user_by_id(user_id).await? else {
            return Err(GroupsError::invalid_input("unknown user"));
        };

        if group_id == NO_GROUP {
            if user.group_id != NO_GROUP {
                self.directory.set_user_group(user_id, NO_GROUP).await?;
            }
            return Ok(());
        }

        let Some(group) = self.store.group_by_id(group_id).await? else {
            return Err(GroupsError::invalid_input("unknown group"));
        };
        if group.tenant_id != 0 && group.tenant_id != user.tenant_id {
            return Err(GroupsError::invalid_input(
                "group belongs to a different tenant",
            ));
        }

        self.store.insert_membership(group_id, user_id).await?;
        if user.group_id != group_id {
            self.directory.set_user_group(user_id, group_id).await?;
        }

        Ok(())
    }

    /// The user record as the host platform sees it. Callers use it to
    /// resolve the tenant a user belongs to.
    pub async fn get_user(&self, user_id: UserId) -> GroupsResult<Option<DirectoryUser>> {
        if user_id <= 0 {
            return Ok(None);
        }
        Ok(self.directory.user_by_id(user_id).await?)
    }

    /// Groups the user belongs to, group id ascending. Membership rows
    /// pointing at groups that no longer exist are skipped.
    #[tracing::instrument(skip(self))]
    pub async fn get_groups_of_user(&self, user_id: UserId) -> GroupsResult<Vec<Group>> {
        let memberships = self.store.memberships_of_user(user_id).await?;

        let mut groups = Vec::with_capacity(memberships.len());
        for membership in memberships {
            if let Some(group) = self.store.group_by_id(membership.group_id).await? {
                groups.push(group);
            }
        }

        Ok(groups)
    }

    pub async fn get_group_names_of_user(&self, user_id: UserId) -> GroupsResult<Vec<String>> {
        let groups = self.get_groups_of_user(user_id).await?;
        Ok(groups.into_iter().map(|g| g.name).collect())
    }

    /// ## Summary
    /// Platform hook: the host deleted a tenant. Every group of the tenant
    /// is removed, the default included; per-group failures are logged and
    /// the loop continues. Returns the number of groups deleted.
    #[tracing::instrument(skip(self))]
    pub async fn on_tenant_deleted(&self, tenant_id: TenantId) -> GroupsResult<u64> {
        if tenant_id <= 0 {
            return Ok(0);
        }

        let groups = self.store.groups_page(tenant_id, 0, 0, "").await?;
        let mut deleted = 0;
        for group in &groups {
            match self.delete_group_rows(group).await {
                Ok(_) => deleted += 1,
                Err(error) => {
                    tracing::warn!(group_id = group.id, tenant_id, %error, "Failed to delete group of removed tenant");
                }
            }
        }

        tracing::info!(tenant_id, deleted, "Tenant groups deleted");

        Ok(deleted)
    }

    /// Platform hook: the host is deleting a user. Drops the user's
    /// membership rows and clears the current-group reference.
    #[tracing::instrument(skip(self))]
    pub async fn on_user_deleted(&self, user_id: UserId) -> GroupsResult<()> {
        self.store.delete_memberships_of_user(user_id).await?;
        self.directory.set_user_group(user_id, NO_GROUP).await?;

        Ok(())
    }

    /// Platform hook: the host created a user. Assigns the tenant's default
    /// group when `assign_default_on_user_created` is set; otherwise does
    /// nothing.
    #[tracing::instrument(skip(self))]
    pub async fn on_user_created(&self, user_id: UserId, tenant_id: TenantId) -> GroupsResult<()> {
        if !self.config.assign_default_on_user_created {
            return Ok(());
        }
        let Some(default) = self.ensure_default_group(tenant_id).await? else {
            return Ok(());
        };

        self.store.insert_membership(default.id, user_id).await?;
        self.directory.set_user_group(user_id, default.id).await?;

        tracing::info!(user_id, group_id = default.id, "New user assigned to default group");

        Ok(())
    }

    /// Whole-tenant default repair: promote the alphabetically first group
    /// when none is flagged, demote extras when several are.
    async fn ensure_default_group(&self, tenant_id: TenantId) -> GroupsResult<Option<Group>> {
        if tenant_id <= 0 {
            return Ok(None);
        }

        let groups = self.store.groups_page(tenant_id, 0, 0, "").await?;
        let Some(first) = groups.first() else {
            return Ok(None);
        };

        let defaults: Vec<Group> = groups.iter().filter(|g| g.is_default).cloned().collect();
        match defaults.as_slice() {
            [] => {
                self.store.set_group_default(first.id, true).await?;
                tracing::info!(
                    group_id = first.id,
                    tenant_id,
                    "Promoted first group to tenant default"
                );
                Ok(Some(Group {
                    is_default: true,
                    ..first.clone()
                }))
            }
            [only] => Ok(Some(only.clone())),
            [kept, extra @ ..] => {
                tracing::warn!(
                    tenant_id,
                    kept = kept.id,
                    extras = extra.len(),
                    "Multiple default groups; demoting extras"
                );
                for group in extra {
                    self.store.set_group_default(group.id, false).await?;
                }
                Ok(Some(kept.clone()))
            }
        }
    }

    /// Shared cascade for [`Self::delete_group`] and tenant deletion:
    /// memberships, then references, then the group row.
    async fn delete_group_rows(&self, group: &Group) -> GroupsResult<Vec<UserId>> {
        let memberships = self.store.memberships_of_group(group.id).await?;
        let affected: Vec<UserId> = memberships.iter().map(|m| m.user_id).collect();

        self.store.delete_memberships_of_group(group.id).await?;
        self.directory.clear_group_references(group.id, None).await?;
        self.store.delete_group(group.id).await?;

        tracing::info!(
            group_id = group.id,
            tenant_id = group.tenant_id,
            members = affected.len(),
            "Group deleted"
        );

        Ok(affected)
    }
}

/// Trims the name and rejects blank ones.
fn valid_name(name: &str) -> GroupsResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GroupsError::invalid_input("group name must not be empty"));
    }
    Ok(trimmed)
}
