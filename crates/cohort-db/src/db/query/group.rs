//! Query builder functions for group rows.

use diesel::prelude::*;

use crate::db::query::text;
use crate::db::schema::user_group;

/// ## Summary
/// Returns a query to select all groups.
#[must_use]
pub fn all() -> user_group::BoxedQuery<'static, diesel::pg::Pg> {
    user_group::table.into_boxed()
}

/// ## Summary
/// Returns a query to find a group by ID.
#[must_use]
pub fn by_id(id: i32) -> user_group::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(user_group::id.eq(id))
}

/// ## Summary
/// Returns a query to find a group by exact name inside one tenant.
#[must_use]
pub fn by_name(tenant_id: i32, name: &str) -> user_group::BoxedQuery<'_, diesel::pg::Pg> {
    all()
        .filter(user_group::tenant_id.eq(tenant_id))
        .filter(user_group::name.eq(name))
}

/// ## Summary
/// Returns a query for a tenant's groups whose name contains `search`,
/// case-insensitively. Wildcards in the term match literally; an empty
/// term matches everything.
#[must_use]
pub fn filtered(tenant_id: i32, search: &str) -> user_group::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = all().filter(user_group::tenant_id.eq(tenant_id));
    if !search.is_empty() {
        query = query.filter(user_group::name.ilike(text::contains_pattern(search)));
    }
    query
}

/// ## Summary
/// Returns one page of [`filtered`], name ascending. A `limit` of 0 means
/// unbounded.
#[must_use]
pub fn page(
    tenant_id: i32,
    offset: i64,
    limit: i64,
    search: &str,
) -> user_group::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = filtered(tenant_id, search)
        .order(user_group::name.asc())
        .offset(offset);
    if limit > 0 {
        query = query.limit(limit);
    }
    query
}
