//! Route definitions for the `/tickets` resource, including the nested
//! messages and attachments.

use axum::routing::get;
use axum::Router;

use crate::handlers::{attachments, messages, tickets};
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> delete
///
/// GET    /{id}/messages                 -> messages::list
/// POST   /{id}/messages                 -> messages::create
///
/// GET    /{id}/attachments              -> attachments::list
/// POST   /{id}/attachments              -> attachments::upload
/// GET    /attachments/{id}/download     -> attachments::download
/// GET    /attachments/{id}/view         -> attachments::view
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list).post(tickets::create))
        .route(
            "/{id}",
            get(tickets::get_by_id)
                .put(tickets::update)
                .delete(tickets::delete),
        )
        .route("/{id}/messages", get(messages::list).post(messages::create))
        .route(
            "/{id}/attachments",
            get(attachments::list).post(attachments::upload),
        )
        .route("/attachments/{id}/download", get(attachments::download))
        .route("/attachments/{id}/view", get(attachments::view))
}
