//! Handlers for the sign-in allow-list: `/authorized-emails`. Admin only.
//!
//! Every write also brings the matching user row's role in line and drops
//! the affected identities from the auth cache, so changes apply on the
//! next request. An admin can never demote or remove their own entry.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mesa_core::authorized_email::{validate_email, validate_import_entry, ImportSummary};
use mesa_core::error::CoreError;
use mesa_core::roles::{Role, ROLE_USER};
use mesa_core::types::DbId;
use mesa_db::models::authorized_email::{
    AuthorizedEmail, CreateAuthorizedEmail, ImportAuthorizedEmails, UpdateAuthorizedEmail,
};
use mesa_db::repositories::{AuthorizedEmailRepo, UserRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

const SELF_DEMOTION: &str = "You cannot remove your own admin role";

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub summary: ImportSummary,
}

/// GET /api/authorized-emails
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<AuthorizedEmail>>>> {
    let entries = AuthorizedEmailRepo::list(&state.pool).await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// POST /api/authorized-emails
///
/// 409 if the address is already listed.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAuthorizedEmail>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthorizedEmail>>)> {
    let email = validate_email(&input.email)?;
    let role: Role = input.role.parse()?;

    let entry = AuthorizedEmailRepo::create(&state.pool, &email, role.as_str()).await?;
    UserRepo::sync_role(&state.pool, &entry.email, &entry.allowed_role).await?;
    state.auth_cache.invalidate(&entry.email).await;

    tracing::info!(
        entry_id = entry.id,
        email = %entry.email,
        %role,
        admin_id = admin.user_id,
        "Authorized e-mail added",
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(entry))))
}

/// PUT /api/authorized-emails/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAuthorizedEmail>,
) -> AppResult<Json<ApiResponse<AuthorizedEmail>>> {
    let role: Role = input.role.parse()?;
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "AuthorizedEmail",
            id,
        })
    };
    let current = AuthorizedEmailRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    if current.email == admin.email && role != Role::Admin {
        return Err(AppError::BadRequest(SELF_DEMOTION.into()));
    }

    let entry = AuthorizedEmailRepo::update_role(&state.pool, id, role.as_str())
        .await?
        .ok_or_else(not_found)?;
    UserRepo::sync_role(&state.pool, &entry.email, &entry.allowed_role).await?;
    state.auth_cache.invalidate(&entry.email).await;

    tracing::info!(entry_id = id, email = %entry.email, %role, admin_id = admin.user_id, "Authorized e-mail role changed");
    Ok(Json(ApiResponse::ok(entry)))
}

/// DELETE /api/authorized-emails/{id}
///
/// Admins cannot remove their own address. The removed user keeps their
/// row, demoted to `user`, and can no longer sign in.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Option<()>>>> {
    let entry = AuthorizedEmailRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AuthorizedEmail",
            id,
        }))?;
    if entry.email == admin.email {
        return Err(AppError::BadRequest(
            "You cannot remove your own authorized e-mail".into(),
        ));
    }

    AuthorizedEmailRepo::delete(&state.pool, id).await?;
    // The account stays for ticket history but loses any elevated role.
    UserRepo::sync_role(&state.pool, &entry.email, ROLE_USER).await?;
    state.auth_cache.invalidate(&entry.email).await;

    tracing::info!(entry_id = id, email = %entry.email, admin_id = admin.user_id, "Authorized e-mail removed");
    Ok(Json(ApiResponse::ok(None)))
}

/// POST /api/authorized-emails/import
///
/// Each entry is validated and upserted on its own; bad entries are counted
/// in the summary instead of failing the request.
pub async fn import(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<ImportAuthorizedEmails>,
) -> AppResult<Json<ImportResponse>> {
    if input.emails.is_empty() {
        return Err(AppError::BadRequest("No e-mails to import".into()));
    }

    let mut summary = ImportSummary::default();
    for entry in &input.emails {
        let (email, role) = match validate_import_entry(entry) {
            Ok(valid) => valid,
            Err(CoreError::Validation(msg)) => {
                summary.record_failure(entry.email.trim(), msg);
                continue;
            }
            Err(other) => return Err(other.into()),
        };
        if email == admin.email && role != Role::Admin {
            summary.record_failure(email, SELF_DEMOTION);
            continue;
        }

        let stored = AuthorizedEmailRepo::upsert(&state.pool, &email, role.as_str()).await;
        match stored {
            Ok(stored) => {
                UserRepo::sync_role(&state.pool, &stored.email, &stored.allowed_role).await?;
                summary.record_success();
            }
            Err(e) => {
                tracing::error!(%email, error = %e, "Failed to import authorized e-mail");
                summary.record_failure(email, "Could not be saved");
            }
        }
    }
    state.auth_cache.clear().await;

    tracing::info!(
        admin_id = admin.user_id,
        total = summary.total,
        success = summary.success,
        failed = summary.failed,
        "Authorized e-mails imported",
    );
    Ok(Json(ImportResponse {
        success: true,
        summary,
    }))
}
