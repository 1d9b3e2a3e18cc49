use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /verify                -> verify
/// GET  /check-email/{email}   -> check_email
/// POST /sync-user             -> sync_user
/// GET  /me                    -> me
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verify", post(auth::verify))
        .route("/check-email/{email}", get(auth::check_email))
        .route("/sync-user", post(auth::sync_user))
        .route("/me", get(auth::me))
}
