//! Uniform error rendering for the RPC surface.

use salvo::Response;
use salvo::http::StatusCode;
use salvo::prelude::Json;

use cohort_core::types::Role;
use cohort_service::error::GroupsError;

use super::dto::ErrorResponse;
use crate::middleware::auth::AuthContext;

/// Wire error codes shared with the host platform
pub mod error_codes {
    pub const INVALID_INPUT: &str = "InvalidInputParameter";
    pub const GROUP_ALREADY_EXISTS: &str = "GroupAlreadyExists";
    pub const CANNOT_DELETE_DEFAULT_GROUP: &str = "CannotDeleteDefaultGroup";
    pub const STORAGE_FAILURE: &str = "StorageFailure";
    pub const NOT_AUTHORIZED: &str = "NotAuthorized";
}

pub fn render_error(
    res: &mut Response,
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) {
    res.status_code(status);
    res.render(Json(ErrorResponse {
        error_code: code,
        error_message: message.into(),
    }));
}

fn groups_error_parts(error: &GroupsError) -> (StatusCode, &'static str) {
    match error {
        GroupsError::InvalidInput(_) => (StatusCode::BAD_REQUEST, error_codes::INVALID_INPUT),
        GroupsError::GroupAlreadyExists { .. } => {
            (StatusCode::CONFLICT, error_codes::GROUP_ALREADY_EXISTS)
        }
        GroupsError::CannotDeleteDefaultGroup { .. } => (
            StatusCode::CONFLICT,
            error_codes::CANNOT_DELETE_DEFAULT_GROUP,
        ),
        GroupsError::Store(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::STORAGE_FAILURE,
        ),
    }
}

/// Renders a service error in the wire error shape. Storage details stay in
/// the log, not in the response body.
pub fn render_groups_error(res: &mut Response, error: &GroupsError) {
    let (status, code) = groups_error_parts(error);
    if matches!(error, GroupsError::Store(_)) {
        tracing::error!(%error, "Storage failure");
        render_error(res, status, code, "Storage failure");
    } else {
        render_error(res, status, code, error.to_string());
    }
}

/// Anonymous callers get 401, authenticated callers short on privilege 403.
pub fn render_not_authorized(res: &mut Response, context: &AuthContext) {
    let status = if context.role == Role::Anonymous {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::FORBIDDEN
    };
    render_error(
        res,
        status,
        error_codes::NOT_AUTHORIZED,
        "Insufficient permissions",
    );
}

pub fn render_internal_error(res: &mut Response) {
    render_error(
        res,
        StatusCode::INTERNAL_SERVER_ERROR,
        error_codes::STORAGE_FAILURE,
        "Internal server error",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_core::error::CoreError;

    #[test]
    fn service_errors_map_to_wire_codes() {
        let (status, code) = groups_error_parts(&GroupsError::invalid_input("bad"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, error_codes::INVALID_INPUT);

        let (status, code) = groups_error_parts(&GroupsError::GroupAlreadyExists {
            tenant_id: 5,
            name: "Staff".to_owned(),
        });
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, error_codes::GROUP_ALREADY_EXISTS);

        let (status, code) = groups_error_parts(&GroupsError::CannotDeleteDefaultGroup {
            tenant_id: 5,
            group_id: 3,
        });
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, error_codes::CANNOT_DELETE_DEFAULT_GROUP);

        let (status, code) =
            groups_error_parts(&GroupsError::Store(CoreError::Storage("down".to_owned())));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, error_codes::STORAGE_FAILURE);
    }
}
