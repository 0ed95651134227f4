//! Query builder functions for host platform user rows.

use diesel::prelude::*;

use crate::db::schema::platform_user;

/// ## Summary
/// Returns a query to find a user by ID.
#[must_use]
pub fn by_id(id: i32) -> platform_user::BoxedQuery<'static, diesel::pg::Pg> {
    platform_user::table
        .filter(platform_user::id.eq(id))
        .into_boxed()
}

/// ## Summary
/// Returns a query for a set of users, public id ascending.
#[must_use]
pub fn by_ids(ids: &[i32]) -> platform_user::BoxedQuery<'static, diesel::pg::Pg> {
    platform_user::table
        .filter(platform_user::id.eq_any(ids.to_vec()))
        .order(platform_user::public_id.asc())
        .into_boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_ids_orders_by_public_id() {
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&by_ids(&[3, 1, 2])).to_string();
        assert!(sql.contains("ORDER BY"));
        assert!(sql.contains("public_id"));
    }
}
