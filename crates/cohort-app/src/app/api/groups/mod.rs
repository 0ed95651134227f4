//! The user groups RPC surface, one POST operation per path segment.

mod dto;
mod group_ops;
mod healthcheck;
mod hooks;
mod member_ops;
mod respond;

use salvo::Router;

use cohort_core::constants::GROUPS_ROUTE_COMPONENT;

#[must_use]
pub fn routes() -> Router {
    Router::with_path(GROUPS_ROUTE_COMPONENT)
        .push(healthcheck::routes())
        .push(group_ops::routes())
        .push(member_ops::routes())
        .push(hooks::routes())
}
