//! Query builder functions for membership rows.

use diesel::prelude::*;

use crate::db::schema::group_user;

/// ## Summary
/// Returns a query for a group's membership rows, user id ascending.
#[must_use]
pub fn for_group(group_id: i32) -> group_user::BoxedQuery<'static, diesel::pg::Pg> {
    group_user::table
        .filter(group_user::group_id.eq(group_id))
        .order(group_user::user_id.asc())
        .into_boxed()
}

/// ## Summary
/// Returns a query for a user's membership rows, group id ascending.
#[must_use]
pub fn for_user(user_id: i32) -> group_user::BoxedQuery<'static, diesel::pg::Pg> {
    group_user::table
        .filter(group_user::user_id.eq(user_id))
        .order(group_user::group_id.asc())
        .into_boxed()
}
