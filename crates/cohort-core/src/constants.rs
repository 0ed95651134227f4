/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const GROUPS_ROUTE_COMPONENT: &str = "groups";
pub const GROUPS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", GROUPS_ROUTE_COMPONENT);

pub const HOOKS_ROUTE_COMPONENT: &str = "hooks";
pub const HOOKS_ROUTE_PREFIX: &str =
    const_str::concat!(GROUPS_ROUTE_PREFIX, "/", HOOKS_ROUTE_COMPONENT);

/// Identity headers forwarded by the host platform's gateway
pub const AUTH_USER_ID_HEADER: &str = "X-Auth-User-Id";
pub const AUTH_TENANT_ID_HEADER: &str = "X-Auth-Tenant-Id";
pub const AUTH_ROLE_HEADER: &str = "X-Auth-Role";
