/// Row identifiers follow the host platform's integer keys.
pub type TenantId = i32;
pub type GroupId = i32;
pub type UserId = i32;

/// Tenant 0 is the shared space for custom groups outside any tenant.
pub const NO_TENANT: TenantId = 0;
/// Group 0 means "no group" in a user's current-group reference.
pub const NO_GROUP: GroupId = 0;

/// Caller role as forwarded by the platform gateway, least privileged first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Anonymous,
    NormalUser,
    TenantAdmin,
    SuperAdmin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::NormalUser => "user",
            Self::TenantAdmin => "tenantadmin",
            Self::SuperAdmin => "superadmin",
        }
    }

    /// ## Summary
    /// Parses a role name from a gateway header value. Unknown names are `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "anonymous" => Some(Self::Anonymous),
            "user" | "normaluser" => Some(Self::NormalUser),
            "tenantadmin" => Some(Self::TenantAdmin),
            "superadmin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_at_least(self, required: Self) -> bool {
        self >= required
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
