mod groups;

use salvo::Router;

use crate::middleware::auth::AuthMiddleware;

// Re-export route constants from core
pub use cohort_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, GROUPS_ROUTE_COMPONENT, GROUPS_ROUTE_PREFIX,
    HOOKS_ROUTE_COMPONENT, HOOKS_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the main API router with the groups module mounted behind the
/// identity middleware.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .hoop(AuthMiddleware)
        .push(groups::routes())
}
