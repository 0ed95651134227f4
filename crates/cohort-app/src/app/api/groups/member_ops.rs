//! Membership operations: who is in a group and which groups a user is in.

use salvo::http::StatusCode;
use salvo::prelude::Json;
use salvo::{Depot, Request, Response, Router, handler};
use tracing::{error, warn};

use cohort_core::types::{Role, UserId};
use cohort_service::error::GroupsResult;

use super::dto::{
    GetGroupUsersRequest, GroupDto, GroupUsersRequest, SaveGroupsOfUserRequest,
    UpdateUserGroupRequest, UserScopedRequest, UserSummaryDto,
};
use super::respond::{
    error_codes, render_error, render_groups_error, render_internal_error, render_not_authorized,
};
use crate::middleware::auth::{AuthContext, get_auth_from_depot};
use crate::service_handler::{AppCoordinator, get_coordinator_from_depot};

/// Tenant admins act on users of their own tenant, superadmins on anyone.
async fn user_in_admin_scope(
    context: &AuthContext,
    coordinator: &AppCoordinator,
    user_id: UserId,
) -> GroupsResult<bool> {
    match context.role {
        Role::SuperAdmin => Ok(true),
        Role::TenantAdmin => {
            let user = coordinator.get_user(user_id).await?;
            Ok(user.is_some_and(|u| u.tenant_id == context.tenant_id))
        }
        Role::NormalUser | Role::Anonymous => Ok(false),
    }
}

/// `GetGroupUsers`: the members of a group, public id ascending. An id that
/// no longer resolves to a group yields an empty list.
#[handler]
async fn get_group_users(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::TenantAdmin) {
        warn!(caller = context.user_id, "List group users denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: GetGroupUsersRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse list group users request");
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
            "List group users denied"
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

    let group = match coordinator.get_group(body.group_id).await {
        Ok(g) => g,
        Err(e) => {
            render_groups_error(res, &e);
            return;
        }
    };
    let Some(group) = group else {
        res.render(Json(Vec::<UserSummaryDto>::new()));
        return;
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

    match coordinator.get_group_users(body.group_id).await {
        Ok(users) => {
            let items: Vec<UserSummaryDto> =
                users.into_iter().map(UserSummaryDto::from).collect();
            res.render(Json(items));
        }
        Err(e) => render_groups_error(res, &e),
    }
}

/// `AddToGroup`: adds users to a group; existing members stay untouched.
#[handler]
async fn add_to_group(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::TenantAdmin) {
        warn!(caller = context.user_id, "Add to group denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: GroupUsersRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse add to group request");
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

    let group = match coordinator.get_group(body.group_id).await {
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
            group_id = body.group_id,
            "Add to group denied"
        );
        render_not_authorized(res, &context);
        return;
    }

    match coordinator.add_to_group(body.group_id, &body.users_ids).await {
        Ok(()) => res.render(Json(true)),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `RemoveUsersFromGroup`: drops users from a group and resets their
/// current-group reference when it pointed at it.
#[handler]
async fn remove_users_from_group(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::TenantAdmin) {
        warn!(caller = context.user_id, "Remove from group denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: GroupUsersRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse remove from group request");
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

    let group = match coordinator.get_group(body.group_id).await {
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
            group_id = body.group_id,
            "Remove from group denied"
        );
        render_not_authorized(res, &context);
        return;
    }

    match coordinator
        .remove_users_from_group(body.group_id, &body.users_ids)
        .await
    {
        Ok(()) => res.render(Json(true)),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `SaveGroupsOfUser`: replaces the full set of groups a user belongs to.
#[handler]
async fn save_groups_of_user(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::TenantAdmin) {
        warn!(caller = context.user_id, "Save user groups denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: SaveGroupsOfUserRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse save user groups request");
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

    let user = match coordinator.get_user(body.user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "unknown user",
            );
            return;
        }
        Err(e) => {
            render_groups_error(res, &e);
            return;
        }
    };

    if !context.can_manage_tenant(user.tenant_id) {
        warn!(
            caller = context.user_id,
            user_id = body.user_id,
            "Save user groups denied"
        );
        render_not_authorized(res, &context);
        return;
    }

    match coordinator
        .save_groups_of_user(body.user_id, &body.groups_ids)
        .await
    {
        Ok(()) => res.render(Json(true)),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `UpdateUserGroup`: writes a user's single-valued current-group
/// reference; 0 clears it.
#[handler]
async fn update_user_group(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let context = match get_auth_from_depot(depot) {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get auth context from depot");
            render_internal_error(res);
            return;
        }
    };

    if !context.role.is_at_least(Role::TenantAdmin) {
        warn!(caller = context.user_id, "Update user group denied");
        render_not_authorized(res, &context);
        return;
    }

    let body: UpdateUserGroupRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse update user group request");
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

    let user = match coordinator.get_user(body.user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            render_error(
                res,
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_INPUT,
                "unknown user",
            );
            return;
        }
        Err(e) => {
            render_groups_error(res, &e);
            return;
        }
    };

    if !context.can_manage_tenant(user.tenant_id) {
        warn!(
            caller = context.user_id,
            user_id = body.user_id,
            "Update user group denied"
        );
        render_not_authorized(res, &context);
        return;
    }

    match coordinator
        .update_user_group(body.user_id, body.group_id)
        .await
    {
        Ok(()) => res.render(Json(true)),
        Err(e) => render_groups_error(res, &e),
    }
}

/// `GetGroupsOfUser`: the groups a user belongs to. Users may query
/// themselves; admins anyone in their tenant.
#[handler]
async fn get_groups_of_user(req: &mut Request, depot: &mut Depot, res: &mut Response) {
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

    let body: UserScopedRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse user groups request");
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

    if !context.is_self(body.user_id) {
        match user_in_admin_scope(&context, &coordinator, body.user_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    caller = context.user_id,
                    user_id = body.user_id,
                    "User groups read denied"
                );
                render_not_authorized(res, &context);
                return;
            }
            Err(e) => {
                render_groups_error(res, &e);
                return;
            }
        }
    }

    match coordinator.get_groups_of_user(body.user_id).await {
        Ok(groups) => {
            let items: Vec<GroupDto> = groups.into_iter().map(GroupDto::from).collect();
            res.render(Json(items));
        }
        Err(e) => render_groups_error(res, &e),
    }
}

/// `GetGroupNamesOfUser`: like `GetGroupsOfUser` but names only.
#[handler]
async fn get_group_names_of_user(req: &mut Request, depot: &mut Depot, res: &mut Response) {
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

    let body: UserScopedRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse user group names request");
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

    if !context.is_self(body.user_id) {
        match user_in_admin_scope(&context, &coordinator, body.user_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    caller = context.user_id,
                    user_id = body.user_id,
                    "User group names read denied"
                );
                render_not_authorized(res, &context);
                return;
            }
            Err(e) => {
                render_groups_error(res, &e);
                return;
            }
        }
    }

    match coordinator.get_group_names_of_user(body.user_id).await {
        Ok(names) => res.render(Json(names)),
        Err(e) => render_groups_error(res, &e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path("GetGroupUsers").post(get_group_users))
        .push(Router::with_path("AddToGroup").post(add_to_group))
        .push(Router::with_path("RemoveUsersFromGroup").post(remove_users_from_group))
        .push(Router::with_path("SaveGroupsOfUser").post(save_groups_of_user))
        .push(Router::with_path("UpdateUserGroup").post(update_user_group))
        .push(Router::with_path("GetGroupsOfUser").post(get_groups_of_user))
        .push(Router::with_path("GetGroupNamesOfUser").post(get_group_names_of_user))
}
