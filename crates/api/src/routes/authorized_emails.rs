use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::authorized_emails;
use crate::state::AppState;

/// Routes mounted at `/authorized-emails`. All require the admin role.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// PUT    /{id}      -> update
/// DELETE /{id}      -> delete
/// POST   /import    -> import
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(authorized_emails::list).post(authorized_emails::create),
        )
        .route(
            "/{id}",
            put(authorized_emails::update).delete(authorized_emails::delete),
        )
        .route("/import", post(authorized_emails::import))
}
