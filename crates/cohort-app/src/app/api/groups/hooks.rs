//! Platform lifecycle hooks, called by the host when tenants and users
//! change outside this module.

use salvo::http::StatusCode;
use salvo::prelude::Json;
use salvo::{Depot, Request, Response, Router, handler};
use tracing::{error, warn};

use cohort_core::constants::HOOKS_ROUTE_COMPONENT;
use cohort_core::types::Role;

use super::dto::{TenantDeletedRequest, UserCreatedRequest, UserDeletedRequest};
use super::respond::{
    error_codes, render_error, render_groups_error, render_internal_error, render_not_authorized,
};
use crate::middleware::auth::get_auth_from_depot;
use crate::service_handler::get_coordinator_from_depot;

/// `TenantDeleted`: removes every group of the tenant. Returns the number
/// of groups deleted.
#[handler]
async fn tenant_deleted(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::SuperAdmin) {
        warn!(caller = context.user_id, "Tenant deletion hook denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: TenantDeletedRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse tenant deletion hook");
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "Invalid request body",
            );
            return;
        }
    };

    let coordinator = match get_coordinator_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get coordinator from depot");
            render_internal_error(res);
            return;
        }
    };

    match coordinator.on_tenant_deleted(body.tenant_id).await {
        Ok(deleted) => res.render(Json(deleted)),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `UserDeleted`: drops the user's memberships and current-group reference.
#[handler]
async fn user_deleted(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::SuperAdmin) {
        warn!(caller = context.user_id, "User deletion hook denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: UserDeletedRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse user deletion hook");
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "Invalid request body",
            );
            return;
        }
    };

    let coordinator = match get_coordinator_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get coordinator from depot");
            render_internal_error(res);
            return;
        }
    };

    match coordinator.on_user_deleted(body.user_id).await {
        Ok(()) => res.render(Json(true)),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `UserCreated`: assigns the tenant's default group when the module is
/// configured to do so.
#[handler]
async fn user_created(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::SuperAdmin) {
        warn!(caller = context.user_id, "User creation hook denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: UserCreatedRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse user creation hook");
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "Invalid request body",
            );
            return;
        }
    };

    let coordinator = match get_coordinator_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get coordinator from depot");
            render_internal_error(res);
            return;
        }
    };

    match coordinator.on_user_created(body.user_id, body.tenant_id).await {
        Ok(()) => res.render(Json(true)),
        Err(e) => render_groups_error(res, &e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(HOOKS_ROUTE_COMPONENT)
        .push(Router::with_path("TenantDeleted").post(tenant_deleted))
        .push(Router::with_path("UserDeleted").post(user_deleted))
        .push(Router::with_path("UserCreated").post(user_created))
}
