use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// The host platform owns this table; the module only reads identity
/// columns and writes `group_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::platform_user)]
#[diesel(check_for_backend(Pg))]
pub struct PlatformUserRow {
    pub id: i32,
    pub tenant_id: i32,
    pub public_id: String,
    pub group_id: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PlatformUserRow> for cohort_core::model::DirectoryUser {
    fn from(row: PlatformUserRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            public_id: row.public_id,
            group_id: row.group_id,
        }
    }
}
