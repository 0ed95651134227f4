use cohort_core::error::CoreResult;
use cohort_core::model::{Group, Membership};
use cohort_core::store::GroupStore;
use cohort_core::types::{GroupId, TenantId, UserId};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use crate::db::connection::DbPool;
use crate::db::query;
use crate::db::schema::{group_user, user_group};
use crate::error::DbError;
use crate::model::group::{GroupRow, NewGroupRow};
use crate::model::membership::{MembershipRow, NewMembershipRow};

/// [`GroupStore`] backed by the module's Postgres tables.
#[derive(Clone)]
pub struct PgGroupStore {
    pool: DbPool,
}

impl PgGroupStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl GroupStore for PgGroupStore {
    async fn create_group(&self, tenant_id: TenantId, name: &str) -> CoreResult<GroupId> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let id = diesel::insert_into(user_group::table)
            .values(NewGroupRow {
                tenant_id,
                name: name.to_owned(),
            })
            .returning(user_group::id)
            .get_result::<GroupId>(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(id)
    }

    async fn group_by_id(&self, id: GroupId) -> CoreResult<Option<Group>> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let row = query::group::by_id(id)
            .select(GroupRow::as_select())
            .first::<GroupRow>(&mut conn)
            .await
            .optional()
            .map_err(DbError::from)?;

        Ok(row.map(Group::from))
    }

    async fn group_by_name(&self, tenant_id: TenantId, name: &str) -> CoreResult<Option<Group>> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let row = query::group::by_name(tenant_id, name)
            .select(GroupRow::as_select())
            .first::<GroupRow>(&mut conn)
            .await
            .optional()
            .map_err(DbError::from)?;

        Ok(row.map(Group::from))
    }

    async fn groups_page(
        &self,
        tenant_id: TenantId,
        offset: i64,
        limit: i64,
        search: &str,
    ) -> CoreResult<Vec<Group>> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let rows = query::group::page(tenant_id, offset, limit, search)
            .select(GroupRow::as_select())
            .load::<GroupRow>(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(rows.into_iter().map(Group::from).collect())
    }

    async fn groups_count(&self, tenant_id: TenantId, search: &str) -> CoreResult<i64> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let count = query::group::filtered(tenant_id, search)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(count)
    }

    async fn set_group_name(&self, id: GroupId, name: &str) -> CoreResult<()> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        diesel::update(user_group::table.find(id))
            .set((
                user_group::name.eq(name),
                user_group::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn set_group_default(&self, id: GroupId, is_default: bool) -> CoreResult<()> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        diesel::update(user_group::table.find(id))
            .set((
                user_group::is_default.eq(is_default),
                user_group::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_group(&self, id: GroupId) -> CoreResult<bool> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let rows = diesel::delete(user_group::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(rows > 0)
    }

    async fn memberships_of_group(&self, group_id: GroupId) -> CoreResult<Vec<Membership>> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let rows = query::membership::for_group(group_id)
            .select(MembershipRow::as_select())
            .load::<MembershipRow>(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(rows.into_iter().map(Membership::from).collect())
    }

    async fn memberships_of_user(&self, user_id: UserId) -> CoreResult<Vec<Membership>> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let rows = query::membership::for_user(user_id)
            .select(MembershipRow::as_select())
            .load::<MembershipRow>(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(rows.into_iter().map(Membership::from).collect())
    }

    async fn insert_membership(&self, group_id: GroupId, user_id: UserId) -> CoreResult<()> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        diesel::insert_into(group_user::table)
            .values(NewMembershipRow { group_id, user_id })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_membership(&self, group_id: GroupId, user_id: UserId) -> CoreResult<()> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        diesel::delete(group_user::table.find((group_id, user_id)))
            .execute(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_memberships(
        &self,
        group_id: GroupId,
        user_ids: &[UserId],
    ) -> CoreResult<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let rows = diesel::delete(
            group_user::table
                .filter(group_user::group_id.eq(group_id))
                .filter(group_user::user_id.eq_any(user_ids.iter().copied())),
        )
        .execute(&mut conn)
        .await
        .map_err(DbError::from)?;

        Ok(rows as u64)
    }

    async fn delete_memberships_of_group(&self, group_id: GroupId) -> CoreResult<u64> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let rows = diesel::delete(group_user::table.filter(group_user::group_id.eq(group_id)))
            .execute(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(rows as u64)
    }

    async fn delete_memberships_of_user(&self, user_id: UserId) -> CoreResult<u64> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let rows = diesel::delete(group_user::table.filter(group_user::user_id.eq(user_id)))
            .execute(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(rows as u64)
    }
}
