//! Identity resolution for the `x-user-email` header.
//!
//! The identity provider runs in front of this service; requests carry the
//! signed-in address and the allow-list decides whether (and as what) it may
//! act. [`sign_in`] is the uncached path, used by the extractor on a cache
//! miss and by `POST /auth/verify`.

pub mod cache;

use mesa_core::authorized_email::{default_display_name, normalize_email};
use mesa_core::error::CoreError;
use mesa_core::roles::Role;
use mesa_db::models::user::{UpsertUser, User};
use mesa_db::repositories::{AuthorizedEmailRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying the signed-in user's e-mail.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Check `email` against the allow-list and create or refresh its user row.
///
/// The user's role always mirrors the allow-list entry. A non-blank `name`
/// replaces the stored display name. The result is cached.
pub async fn sign_in(state: &AppState, email: &str, name: Option<&str>) -> AppResult<User> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Missing user e-mail".into(),
        )));
    }

    // Read before the lookup so a concurrent allow-list change wins.
    let generation = state.auth_cache.generation().await;
    let Some(entry) = AuthorizedEmailRepo::find_by_email(&state.pool, &email).await? else {
        tracing::warn!(%email, "Rejected e-mail not on the authorized list");
        state.auth_cache.invalidate(&email).await;
        return Err(AppError::Core(CoreError::EmailNotAuthorized(email)));
    };

    let role: Role = entry.allowed_role.parse().map_err(|_| {
        AppError::InternalError(format!(
            "Authorized e-mail {} has unknown role '{}'",
            entry.email, entry.allowed_role
        ))
    })?;

    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let mut user = UserRepo::upsert(
        &state.pool,
        &UpsertUser {
            email: email.clone(),
            name: name.map_or_else(|| default_display_name(&email), str::to_string),
            role: role.as_str().to_string(),
        },
    )
    .await?;

    if let Some(name) = name {
        if user.name != name {
            if let Some(renamed) = UserRepo::update_name(&state.pool, user.id, name).await? {
                user = renamed;
            }
        }
    }

    if !state
        .auth_cache
        .insert_if_current(&email, user.id, role, generation)
        .await
    {
        tracing::debug!(%email, "Allow-list changed during sign-in; result not cached");
    }
    tracing::debug!(user_id = user.id, %email, %role, "Signed in");
    Ok(user)
}
