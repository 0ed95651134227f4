use cohort_core::error::CoreResult;
use cohort_core::model::DirectoryUser;
use cohort_core::store::UserDirectory;
use cohort_core::types::{GroupId, NO_GROUP, UserId};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use crate::db::connection::DbPool;
use crate::db::query;
use crate::db::schema::platform_user;
use crate::error::DbError;
use crate::model::platform_user::PlatformUserRow;

/// [`UserDirectory`] over the host platform's user table.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: DbPool,
}

impl PgUserDirectory {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserDirectory for PgUserDirectory {
    async fn user_by_id(&self, id: UserId) -> CoreResult<Option<DirectoryUser>> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let row = query::platform_user::by_id(id)
            .select(PlatformUserRow::as_select())
            .first::<PlatformUserRow>(&mut conn)
            .await
            .optional()
            .map_err(DbError::from)?;

        Ok(row.map(DirectoryUser::from))
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> CoreResult<Vec<DirectoryUser>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let rows = query::platform_user::by_ids(ids)
            .select(PlatformUserRow::as_select())
            .load::<PlatformUserRow>(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(rows.into_iter().map(DirectoryUser::from).collect())
    }

    async fn set_user_group(&self, user_id: UserId, group_id: GroupId) -> CoreResult<()> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        diesel::update(platform_user::table.find(user_id))
            .set((
                platform_user::group_id.eq(group_id),
                platform_user::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn clear_group_references(
        &self,
        group_id: GroupId,
        user_ids: Option<&[UserId]>,
    ) -> CoreResult<u64> {
        let mut conn = self.pool.get().await.map_err(DbError::from)?;

        let rows = match user_ids {
            Some(ids) => {
                if ids.is_empty() {
                    return Ok(0);
                }
                diesel::update(
                    platform_user::table
                        .filter(platform_user::group_id.eq(group_id))
                        .filter(platform_user::id.eq_any(ids.iter().copied())),
                )
                .set((
                    platform_user::group_id.eq(NO_GROUP),
                    platform_user::updated_at.eq(chrono::Utc::now()),
                ))
                .execute(&mut conn)
                .await
                .map_err(DbError::from)?
            }
            None => {
                diesel::update(platform_user::table.filter(platform_user::group_id.eq(group_id)))
                    .set((
                        platform_user::group_id.eq(NO_GROUP),
                        platform_user::updated_at.eq(chrono::Utc::now()),
                    ))
                    .execute(&mut conn)
                    .await
                    .map_err(DbError::from)?
            }
        };

        Ok(rows as u64)
    }
}
