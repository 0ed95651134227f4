#![allow(dead_code)]
//! In-memory storage fakes for coordinator tests.
//!
//! Both fakes share state through an `Arc` so a test keeps a handle for
//! inspection after handing clones to the coordinator. `mutations` counts
//! every mutating trait call issued, whether or not a row changed, which is
//! what the idempotency tests assert on. The fake clock ticks one second per
//! write so timestamp assertions are deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use cohort_core::config::GroupsConfig;
use cohort_core::error::{CoreError, CoreResult};
use cohort_core::model::{DirectoryUser, Group, Membership};
use cohort_core::store::{GroupStore, UserDirectory};
use cohort_core::types::{GroupId, NO_GROUP, TenantId, UserId};
use cohort_service::GroupCoordinator;

#[derive(Default)]
struct StoreState {
    groups: BTreeMap<GroupId, Group>,
    memberships: BTreeMap<(GroupId, UserId), DateTime<Utc>>,
    last_id: GroupId,
    clock: i64,
    mutations: u64,
}

impl StoreState {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        DateTime::<Utc>::from_timestamp(self.clock, 0).expect("valid tick timestamp")
    }
}

#[derive(Clone, Default)]
pub struct MemGroupStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store state poisoned")
    }

    pub fn mutations(&self) -> u64 {
        self.lock().mutations
    }

    /// Flags a group as default behind the coordinator's back, modeling
    /// drifted data.
    pub fn force_default_flag(&self, id: GroupId) {
        let mut state = self.lock();
        if let Some(group) = state.groups.get_mut(&id) {
            group.is_default = true;
        }
    }

    pub fn group_snapshot(&self, id: GroupId) -> Option<Group> {
        self.lock().groups.get(&id).cloned()
    }

    pub fn membership_created_at(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Option<DateTime<Utc>> {
        self.lock().memberships.get(&(group_id, user_id)).copied()
    }

    pub fn membership_count(&self) -> usize {
        self.lock().memberships.len()
    }

    pub fn group_count(&self) -> usize {
        self.lock().groups.len()
    }
}

impl GroupStore for MemGroupStore {
    async fn create_group(&self, tenant_id: TenantId, name: &str) -> CoreResult<GroupId> {
        let mut state = self.lock();
        state.last_id += 1;
        let id = state.last_id;
        let now = state.tick();
        state.groups.insert(
            id,
            Group {
                id,
                tenant_id,
                name: name.to_owned(),
                is_default: false,
                created_at: now,
                updated_at: now,
            },
        );
        state.mutations += 1;
        Ok(id)
    }

    async fn group_by_id(&self, id: GroupId) -> CoreResult<Option<Group>> {
        Ok(self.lock().groups.get(&id).cloned())
    }

    async fn group_by_name(&self, tenant_id: TenantId, name: &str) -> CoreResult<Option<Group>> {
        Ok(self
            .lock()
            .groups
            .values()
            .find(|g| g.tenant_id == tenant_id && g.name == name)
            .cloned())
    }

    async fn groups_page(
        &self,
        tenant_id: TenantId,
        offset: i64,
        limit: i64,
        search: &str,
    ) -> CoreResult<Vec<Group>> {
        let state = self.lock();
        let needle = search.to_lowercase();
        let mut rows: Vec<Group> = state
            .groups
            .values()
            .filter(|g| g.tenant_id == tenant_id)
            .filter(|g| needle.is_empty() || g.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let take = if limit > 0 { limit as usize } else { usize::MAX };
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(take)
            .collect())
    }

    async fn groups_count(&self, tenant_id: TenantId, search: &str) -> CoreResult<i64> {
        let state = self.lock();
        let needle = search.to_lowercase();
        let count = state
            .groups
            .values()
            .filter(|g| g.tenant_id == tenant_id)
            .filter(|g| needle.is_empty() || g.name.to_lowercase().contains(&needle))
            .count();
        Ok(count as i64)
    }

    async fn set_group_name(&self, id: GroupId, name: &str) -> CoreResult<()> {
        let mut state = self.lock();
        let now = state.tick();
        if let Some(group) = state.groups.get_mut(&id) {
            group.name = name.to_owned();
            group.updated_at = now;
        }
        state.mutations += 1;
        Ok(())
    }

    async fn set_group_default(&self, id: GroupId, is_default: bool) -> CoreResult<()> {
        let mut state = self.lock();
        let now = state.tick();
        if let Some(group) = state.groups.get_mut(&id) {
            group.is_default = is_default;
            group.updated_at = now;
        }
        state.mutations += 1;
        Ok(())
    }

    async fn delete_group(&self, id: GroupId) -> CoreResult<bool> {
        let mut state = self.lock();
        state.mutations += 1;
        Ok(state.groups.remove(&id).is_some())
    }

    async fn memberships_of_group(&self, group_id: GroupId) -> CoreResult<Vec<Membership>> {
        Ok(self
            .lock()
            .memberships
            .keys()
            .filter(|(g, _)| *g == group_id)
            .map(|&(group_id, user_id)| Membership { group_id, user_id })
            .collect())
    }

    async fn memberships_of_user(&self, user_id: UserId) -> CoreResult<Vec<Membership>> {
        Ok(self
            .lock()
            .memberships
            .keys()
            .filter(|(_, u)| *u == user_id)
            .map(|&(group_id, user_id)| Membership { group_id, user_id })
            .collect())
    }

    async fn insert_membership(&self, group_id: GroupId, user_id: UserId) -> CoreResult<()> {
        let mut state = self.lock();
        let now = state.tick();
        state.memberships.entry((group_id, user_id)).or_insert(now);
        state.mutations += 1;
        Ok(())
    }

    async fn delete_membership(&self, group_id: GroupId, user_id: UserId) -> CoreResult<()> {
        let mut state = self.lock();
        state.memberships.remove(&(group_id, user_id));
        state.mutations += 1;
        Ok(())
    }

    async fn delete_memberships(&self, group_id: GroupId, user_ids: &[UserId]) -> CoreResult<u64> {
        let mut state = self.lock();
        let mut removed = 0;
        for &user_id in user_ids {
            if state.memberships.remove(&(group_id, user_id)).is_some() {
                removed += 1;
            }
        }
        state.mutations += 1;
        Ok(removed)
    }

    async fn delete_memberships_of_group(&self, group_id: GroupId) -> CoreResult<u64> {
        let mut state = self.lock();
        let before = state.memberships.len();
        state.memberships.retain(|(g, _), _| *g != group_id);
        state.mutations += 1;
        Ok((before - state.memberships.len()) as u64)
    }

    async fn delete_memberships_of_user(&self, user_id: UserId) -> CoreResult<u64> {
        let mut state = self.lock();
        let before = state.memberships.len();
        state.memberships.retain(|(_, u), _| *u != user_id);
        state.mutations += 1;
        Ok((before - state.memberships.len()) as u64)
    }
}

#[derive(Default)]
struct DirectoryState {
    users: BTreeMap<UserId, DirectoryUser>,
    fail_set_for: BTreeSet<UserId>,
    mutations: u64,
}

#[derive(Clone, Default)]
pub struct MemUserDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl MemUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DirectoryState> {
        self.state.lock().expect("directory state poisoned")
    }

    pub fn add_user(&self, id: UserId, tenant_id: TenantId, public_id: &str) {
        self.lock().users.insert(
            id,
            DirectoryUser {
                id,
                tenant_id,
                public_id: public_id.to_owned(),
                group_id: NO_GROUP,
            },
        );
    }

    pub fn group_ref(&self, id: UserId) -> Option<GroupId> {
        self.lock().users.get(&id).map(|u| u.group_id)
    }

    pub fn mutations(&self) -> u64 {
        self.lock().mutations
    }

    /// Makes `set_user_group` fail for one user, for best-effort loop tests.
    pub fn fail_set_user_group_for(&self, id: UserId) {
        self.lock().fail_set_for.insert(id);
    }
}

impl UserDirectory for MemUserDirectory {
    async fn user_by_id(&self, id: UserId) -> CoreResult<Option<DirectoryUser>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> CoreResult<Vec<DirectoryUser>> {
        let state = self.lock();
        let mut users: Vec<DirectoryUser> = state
            .users
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.public_id.cmp(&b.public_id));
        Ok(users)
    }

    async fn set_user_group(&self, user_id: UserId, group_id: GroupId) -> CoreResult<()> {
        let mut state = self.lock();
        if state.fail_set_for.contains(&user_id) {
            return Err(CoreError::Storage("injected directory failure".to_owned()));
        }
        if let Some(user) = state.users.get_mut(&user_id) {
            user.group_id = group_id;
        }
        state.mutations += 1;
        Ok(())
    }

    async fn clear_group_references(
        &self,
        group_id: GroupId,
        user_ids: Option<&[UserId]>,
    ) -> CoreResult<u64> {
        let mut state = self.lock();
        let mut changed = 0;
        for user in state.users.values_mut() {
            let in_scope = user_ids.is_none_or(|ids| ids.contains(&user.id));
            if in_scope && user.group_id == group_id {
                user.group_id = NO_GROUP;
                changed += 1;
            }
        }
        state.mutations += 1;
        Ok(changed)
    }
}

pub type TestCoordinator = GroupCoordinator<MemGroupStore, MemUserDirectory>;

pub fn coordinator() -> (TestCoordinator, MemGroupStore, MemUserDirectory) {
    coordinator_with_config(GroupsConfig {
        assign_default_on_user_created: false,
    })
}

pub fn coordinator_with_config(
    config: GroupsConfig,
) -> (TestCoordinator, MemGroupStore, MemUserDirectory) {
    let store = MemGroupStore::new();
    let directory = MemUserDirectory::new();
    (
        GroupCoordinator::new(store.clone(), directory.clone(), config),
        store,
        directory,
    )
}
