//! Role-based access control.
//!
//! The extractors wrap [`AuthUser`] and reject with 403 when the role does
//! not match. Admins pass every check.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use studio_core::error::CoreError;
use studio_core::roles::{has_any_role, HR_ROLES, ROLE_ADMIN};

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Reject unless `user` holds one of `allowed` (or is an admin).
pub fn require_role(user: &AuthUser, allowed: &[&str]) -> AppResult<()> {
    if has_any_role(&user.role, allowed) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{}' may not perform this action",
            user.role
        ))))
    }
}

/// Requires the `admin` role.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires an HR role (or admin).
pub struct RequireHr(pub AuthUser);

impl FromRequestParts<AppState> for RequireHr {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !has_any_role(&user.role, HR_ROLES) {
            return Err(AppError::Core(CoreError::Forbidden(
                "HR role required".into(),
            )));
        }
        Ok(RequireHr(user))
    }
}

#[cfg(test)]
mod tests {
    use studio_core::department::Department;
    use studio_core::roles::{LOAN_APPROVER_ROLES, ROLE_EDITOR, ROLE_INVENTORY};

    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: 1,
            role: role.to_string(),
            department: Department::for_role(role),
        }
    }

    #[test]
    fn require_role_accepts_listed_and_admin() {
        assert!(require_role(&user(ROLE_INVENTORY), LOAN_APPROVER_ROLES).is_ok());
        assert!(require_role(&user(ROLE_ADMIN), LOAN_APPROVER_ROLES).is_ok());
    }

    #[test]
    fn require_role_rejects_others() {
        let err = require_role(&user(ROLE_EDITOR), LOAN_APPROVER_ROLES).unwrap_err();
        assert!(matches!(err, AppError::Core(CoreError::Forbidden(_))));
    }
}
