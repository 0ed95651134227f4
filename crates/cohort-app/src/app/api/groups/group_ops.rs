//! Group-level operations: create, rename, delete, read, list, default flag.

use salvo::http::StatusCode;
use salvo::prelude::Json;
use salvo::{Depot, Request, Response, Router, handler};
use tracing::{error, warn};

use cohort_core::types::{NO_TENANT, Role, UserId};

use super::dto::{
    ChangeDefaultGroupRequest, CreateGroupRequest, DeleteGroupsRequest, GetDefaultGroupRequest,
    GetGroupRequest, GetGroupsRequest, GroupDto, GroupListResponse, UpdateGroupRequest,
};
use super::respond::{
    error_codes, render_error, render_groups_error, render_internal_error, render_not_authorized,
};
use crate::middleware::auth::get_auth_from_depot;
use crate::service_handler::get_coordinator_from_depot;

/// `CreateGroup`: creates a group in a tenant and returns the new id.
#[handler]
async fn create_group(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::TenantAdmin) {
        warn!(caller = context.user_id, "Create group denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: CreateGroupRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse create group request");
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "Invalid request body",
            );
            return;
        }
    };

    if !context.can_manage_tenant(body.tenant_id) {
        warn!(
            caller = context.user_id,
            tenant_id = body.tenant_id,
            "Create group denied"
        );
        render_not_authorized(res, &context);
        return;
    }

    let coordinator = match get_coordinator_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get coordinator from depot");
            render_internal_error(res);
            return;
        }
    };

    match coordinator.create_group(body.tenant_id, &body.name).await {
        Ok(id) => res.render(Json(id)),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `UpdateGroup`: renames a group.
#[handler]
async fn update_group(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::TenantAdmin) {
        warn!(caller = context.user_id, "Update group denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: UpdateGroupRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse update group request");
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

    let group = match coordinator.get_group(body.id).await {
        Ok(Some(g)) => g,
        Ok(None) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "unknown group",
            );
            return;
        }
        Err(e) => {
            render_groups_error(res, &e);
            return;
        }
    };

    if !context.can_manage_tenant(group.tenant_id) {
        warn!(
            caller = context.user_id,
            group_id = body.id,
            "Update group denied"
        );
        render_not_authorized(res, &context);
        return;
    }

    match coordinator.update_group(body.id, &body.name).await {
        Ok(()) => res.render(Json(true)),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `DeleteGroups`: deletes the listed groups of a tenant and moves their
/// members into the tenant's default group. Returns the moved user ids.
/// Ids that no longer exist are skipped.
#[handler]
async fn delete_groups(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::TenantAdmin) {
        warn!(caller = context.user_id, "Delete groups denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: DeleteGroupsRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse delete groups request");
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "Invalid request body",
            );
            return;
        }
    };

    if !context.can_manage_tenant(body.tenant_id) {
        warn!(
            caller = context.user_id,
            tenant_id = body.tenant_id,
            "Delete groups denied"
        );
        render_not_authorized(res, &context);
        return;
    }

    let coordinator = match get_coordinator_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get coordinator from depot");
            render_internal_error(res);
            return;
        }
    };

    let mut affected: Vec<UserId> = Vec::new();
    for &group_id in &body.id_list {
        let group = match coordinator.get_group(group_id).await {
            Ok(g) => g,
            Err(e) => {
                render_groups_error(res, &e);
                return;
            }
        };
        let Some(group) = group else {
            tracing::debug!(group_id, "Skipping unknown group in delete request");
            continue;
        };
        if group.tenant_id != body.tenant_id {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "group belongs to a different tenant",
            );
            return;
        }
        match coordinator.delete_group(group_id).await {
            Ok(users) => affected.extend(users),
            Err(e) => {
                render_groups_error(res, &e);
                return;
            }
        }
    }

    if !affected.is_empty() {
        affected.sort_unstable();
        affected.dedup();
        if let Err(e) = coordinator
            .reassign_users_to_default(body.tenant_id, &affected)
            .await
        {
            render_groups_error(res, &e);
            return;
        }
    }

    res.render(Json(affected));
}

/// `GetGroup`: one group by id, 404 when it does not exist. Groups of
/// tenant 0 are readable by any signed-in user.
#[handler]
async fn get_group(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::NormalUser) {
        render_not_authorized(res, &context);
        return;
    }

    let body: GetGroupRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse get group request");
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

    match coordinator.get_group(body.id).await {
        Ok(Some(group)) => {
            if group.tenant_id != NO_TENANT && !context.can_read_tenant(group.tenant_id) {
                warn!(
                    caller = context.user_id,
                    group_id = body.id,
                    "Get group denied"
                );
                render_not_authorized(res, &context);
                return;
            }
            res.render(Json(GroupDto::from(group)));
        }
        Ok(None) => render_error(
            res,
            StatusCode::NOT_FOUND,
            error_codes::INVALID_INPUT,
            "unknown group",
        ),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `GetGroups`: one page of a tenant's groups plus the total match count.
#[handler]
async fn get_groups(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::TenantAdmin) {
        warn!(caller = context.user_id, "List groups denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: GetGroupsRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse list groups request");
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "Invalid request body",
            );
            return;
        }
    };

    if !context.can_manage_tenant(body.tenant_id) {
        warn!(
            caller = context.user_id,
            tenant_id = body.tenant_id,
            "List groups denied"
        );
        render_not_authorized(res, &context);
        return;
    }

    let coordinator = match get_coordinator_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get coordinator from depot");
            render_internal_error(res);
            return;
        }
    };

    match coordinator
        .get_groups(body.tenant_id, body.offset, body.limit, &body.search)
        .await
    {
        Ok(page) => res.render(Json(GroupListResponse {
            count: page.total,
            items: page.items.into_iter().map(GroupDto::from).collect(),
        })),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `GetDefaultGroup`: the tenant's default group, `null` when the tenant
/// has none.
#[handler]
async fn get_default_group(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::NormalUser) {
        render_not_authorized(res, &context);
        return;
    }

    let body: GetDefaultGroupRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse get default group request");
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "Invalid request body",
            );
            return;
        }
    };

    if !context.can_read_tenant(body.tenant_id) {
        warn!(
            caller = context.user_id,
            tenant_id = body.tenant_id,
            "Get default group denied"
        );
        render_not_authorized(res, &context);
        return;
    }

    let coordinator = match get_coordinator_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get coordinator from depot");
            render_internal_error(res);
            return;
        }
    };

    match coordinator.get_default_group(body.tenant_id).await {
        Ok(group) => res.render(Json(group.map(GroupDto::from))),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `ChangeDefaultGroup`: flags a group as its tenant's default.
#[handler]
async fn change_default_group(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::TenantAdmin) {
        warn!(caller = context.user_id, "Change default group denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: ChangeDefaultGroupRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse change default group request");
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "Invalid request body",
            );
            return;
        }
    };

    if !context.can_manage_tenant(body.tenant_id) {
        warn!(
            caller = context.user_id,
            tenant_id = body.tenant_id,
            "Change default group denied"
        );
        render_not_authorized(res, &context);
        return;
    }

    let coordinator = match get_coordinator_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get coordinator from depot");
            render_internal_error(res);
            return;
        }
    };

    match coordinator
        .change_default_group(body.tenant_id, body.group_id)
        .await
    {
        Ok(()) => res.render(Json(true)),
        Err(e) => render_groups_error(res, &e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path("CreateGroup").post(create_group))
        .push(Router::with_path("UpdateGroup").post(update_group))
        .push(Router::with_path("DeleteGroups").post(delete_groups))
        .push(Router::with_path("GetGroup").post(get_group))
        .push(Router::with_path("GetGroups").post(get_groups))
        .push(Router::with_path("GetDefaultGroup").post(get_default_group))
        .push(Router::with_path("ChangeDefaultGroup").post(change_default_group))
}
