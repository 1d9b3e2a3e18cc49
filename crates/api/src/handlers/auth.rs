//! Handlers for `/auth`: sign-in verification and profile.

use axum::extract::{Path, State};
use axum::Json;
use mesa_core::authorized_email::{normalize_email, validate_email};
use mesa_core::error::CoreError;
use mesa_core::roles::Permissions;
use mesa_db::models::user::User;
use mesa_db::repositories::{AuthorizedEmailRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::sign_in;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncUserRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmailCheck {
    pub email: String,
    pub authorized: bool,
    pub role: Option<String>,
}

/// The current user together with what their role allows.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub permissions: Permissions,
}

/// POST /api/auth/verify
///
/// Called once after the identity provider signs someone in. Returns the
/// stored user, or 403 `EMAIL_NOT_AUTHORIZED`.
pub async fn verify(
    State(state): State<AppState>,
    Json(input): Json<VerifyRequest>,
) -> AppResult<Json<User>> {
    let email = validate_email(&input.email)?;
    let user = sign_in(&state, &email, input.name.as_deref()).await?;
    tracing::info!(user_id = user.id, email = %user.email, role = %user.role, "User verified");
    Ok(Json(user))
}

/// GET /api/auth/check-email/{email}
///
/// Public: tells the login page whether an address may sign in.
pub async fn check_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<ApiResponse<EmailCheck>>> {
    let email = normalize_email(&email);
    let entry = AuthorizedEmailRepo::find_by_email(&state.pool, &email).await?;
    Ok(Json(ApiResponse::ok(EmailCheck {
        email,
        authorized: entry.is_some(),
        role: entry.map(|e| e.allowed_role),
    })))
}

/// POST /api/auth/sync-user
///
/// Refresh the caller's stored profile from the identity provider session.
pub async fn sync_user(
    user: AuthUser,
    State(state): State<AppState>,
    body: Option<Json<SyncUserRequest>>,
) -> AppResult<Json<ApiResponse<User>>> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let synced = sign_in(&state, &user.email, input.name.as_deref()).await?;
    Ok(Json(ApiResponse::ok(synced)))
}

/// GET /api/auth/me
pub async fn me(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<MeResponse>> {
    let row = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    Ok(Json(MeResponse {
        user: row,
        permissions: user.permissions(),
    }))
}
