//! Role gates layered over [`AuthUser`].
//!
//! A caller who is signed in but lacks the role gets 403 `FORBIDDEN`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mesa_core::error::CoreError;
use mesa_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(Role) -> bool,
    denial: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if allowed(user.role) {
        Ok(user)
    } else {
        tracing::debug!(user_id = user.user_id, role = %user.role, "Role check failed");
        Err(AppError::Core(CoreError::Forbidden(denial.to_string())))
    }
}

/// Admins only: allow-list management and ticket deletion.
///
/// ```ignore
/// async fn purge(RequireAdmin(admin): RequireAdmin) -> AppResult<StatusCode> { .. }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, |r| r == Role::Admin, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Technicians and admins.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(
            parts,
            state,
            Role::is_staff,
            "Technician or Admin role required",
        )
        .await
        .map(RequireStaff)
    }
}
