//! Header-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mesa_core::authorized_email::normalize_email;
use mesa_core::error::CoreError;
use mesa_core::roles::{Permissions, Role};
use mesa_core::types::DbId;

use crate::auth::{sign_in, USER_EMAIL_HEADER};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller, resolved from the `x-user-email` header against the
/// authorized e-mail list.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Normalized e-mail.
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn permissions(&self) -> Permissions {
        self.role.permissions()
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Missing {USER_EMAIL_HEADER} header"
                )))
            })?;

        if let Some(hit) = state.auth_cache.get(&email).await {
            return Ok(AuthUser {
                user_id: hit.user_id,
                email,
                role: hit.role,
            });
        }

        let user = sign_in(state, &email, None).await?;
        let role = user
            .role
            .parse()
            .map_err(|_| AppError::InternalError(format!("Unknown role '{}'", user.role)))?;
        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
            role,
        })
    }
}
