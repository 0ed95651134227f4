use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::user_group)]
#[diesel(check_for_backend(Pg))]
pub struct GroupRow {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub is_default: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// New groups are never the tenant default; promotion is a separate step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::user_group)]
pub struct NewGroupRow {
    pub tenant_id: i32,
    pub name: String,
}

impl From<GroupRow> for cohort_core::model::Group {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
