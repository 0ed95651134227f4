use diesel::{pg::Pg, prelude::*};

use crate::db::schema;
use crate::model::group::GroupRow;
use crate::model::platform_user::PlatformUserRow;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = schema::group_user)]
#[diesel(check_for_backend(Pg))]
#[diesel(primary_key(group_id, user_id))]
#[diesel(belongs_to(GroupRow, foreign_key = group_id))]
#[diesel(belongs_to(PlatformUserRow, foreign_key = user_id))]
pub struct MembershipRow {
    pub group_id: i32,
    pub user_id: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::group_user)]
pub struct NewMembershipRow {
    pub group_id: i32,
    pub user_id: i32,
}

impl From<MembershipRow> for cohort_core::model::Membership {
    fn from(row: MembershipRow) -> Self {
        Self {
            group_id: row.group_id,
            user_id: row.user_id,
        }
    }
}
