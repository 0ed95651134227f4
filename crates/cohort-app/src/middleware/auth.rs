use salvo::Depot;
use salvo::http::HeaderMap;

use crate::error::AppResult;
use cohort_core::constants::{AUTH_ROLE_HEADER, AUTH_TENANT_ID_HEADER, AUTH_USER_ID_HEADER};
use cohort_core::error::CoreError;
use cohort_core::types::{NO_TENANT, Role, TenantId, UserId};

/// Depot keys written by the middleware in this module
pub mod depot_keys {
    pub const AUTH_CONTEXT: &str = "auth_context";
}

/// The caller identity forwarded by the host platform's gateway.
///
/// Requests missing any part of the header triple run as the anonymous
/// context and fail the per-operation privilege checks downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub role: Role,
}

impl AuthContext {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_id: 0,
            tenant_id: NO_TENANT,
            role: Role::Anonymous,
        }
    }

    /// Whether the caller may administer the given tenant. Tenant admins are
    /// confined to their own tenant; tenant 0 belongs to superadmins.
    #[must_use]
    pub fn can_manage_tenant(&self, tenant_id: TenantId) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::TenantAdmin => tenant_id > 0 && self.tenant_id == tenant_id,
            Role::NormalUser | Role::Anonymous => false,
        }
    }

    /// Whether the caller may read tenant-scoped data. Any member of the
    /// tenant may.
    #[must_use]
    pub fn can_read_tenant(&self, tenant_id: TenantId) -> bool {
        if self.can_manage_tenant(tenant_id) {
            return true;
        }
        self.role.is_at_least(Role::NormalUser) && self.tenant_id == tenant_id
    }

    #[must_use]
    pub fn is_self(&self, user_id: UserId) -> bool {
        self.role.is_at_least(Role::NormalUser) && self.user_id == user_id
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// ## Summary
/// Builds the caller identity from the gateway's `X-Auth-*` headers. A
/// missing or unparseable header yields the anonymous context.
#[must_use]
pub fn context_from_headers(headers: &HeaderMap) -> AuthContext {
    let role = header_str(headers, AUTH_ROLE_HEADER).and_then(Role::from_name);
    let user_id =
        header_str(headers, AUTH_USER_ID_HEADER).and_then(|raw| raw.trim().parse::<UserId>().ok());
    let tenant_id = header_str(headers, AUTH_TENANT_ID_HEADER)
        .and_then(|raw| raw.trim().parse::<TenantId>().ok());

    match (role, user_id, tenant_id) {
        (Some(role), Some(user_id), Some(tenant_id)) if user_id > 0 && tenant_id >= 0 => {
            AuthContext {
                user_id,
                tenant_id,
                role,
            }
        }
        _ => AuthContext::anonymous(),
    }
}

/// ## Summary
/// Middleware that resolves the caller identity and stores it in the depot.
/// Requests are never rejected here; each operation handler decides.
///
/// ## Side Effects
/// Inserts an [`AuthContext`] into the depot under
/// [`depot_keys::AUTH_CONTEXT`].
pub struct AuthMiddleware;

#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, _res, _ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        let context = context_from_headers(req.headers());

        tracing::trace!(
            user_id = context.user_id,
            tenant_id = context.tenant_id,
            role = %context.role,
            "Caller identity resolved"
        );

        depot.insert(depot_keys::AUTH_CONTEXT, context);
    }
}

/// ## Summary
/// Retrieves the caller identity from the depot.
///
/// ## Errors
/// Returns an error if the middleware did not run for this request.
pub fn get_auth_from_depot(depot: &Depot) -> AppResult<AuthContext> {
    depot
        .get::<AuthContext>(depot_keys::AUTH_CONTEXT)
        .copied()
        .map_err(|_err| CoreError::InvariantViolation("Auth context not found in depot").into())
}
