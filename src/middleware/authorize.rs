use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::Identity;
use crate::error::ApiError;

/// The single role name allowed to perform administrative operations
pub const PRIVILEGED_ROLE: &str = "admin";

/// Request-scoped marker set by the role check; its presence is what the
/// authorization check enforces
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

pub fn is_privileged(identity: &Identity) -> bool {
    identity.role.role_name.as_deref() == Some(PRIVILEGED_ROLE)
}

/// Stage one of the gate: flag the request when the caller holds the
/// privileged role. Callers without it pass through unflagged; rejection is
/// deferred to stage two, which keeps this stage the extension point for
/// additional roles.
pub async fn require_role(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("access denied: authentication required"))?;

    if is_privileged(&identity) {
        request.extensions_mut().insert(Authorized);
    }

    Ok(next.run(request).await)
}

/// Stage two of the gate: only requests flagged by stage one may reach the
/// protected operation
pub async fn check_authorized(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<Authorized>().is_none() {
        return Err(ApiError::forbidden("access denied: authorisation failed"));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::account::Role;

    fn identity(role_name: Option<&str>) -> Identity {
        Identity {
            account_id: 1,
            email: "someone@example.com".to_string(),
            role: Role {
                role_id: 1,
                role_name: role_name.map(|s| s.to_string()),
            },
        }
    }

    #[test]
    fn privileged_role_name_is_recognized() {
        assert!(is_privileged(&identity(Some("admin"))));
    }

    #[test]
    fn other_or_missing_role_names_are_not() {
        assert!(!is_privileged(&identity(Some("member"))));
        assert!(!is_privileged(&identity(Some("Admin"))));
        assert!(!is_privileged(&identity(None)));
    }
}
