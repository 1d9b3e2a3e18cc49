use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Catalog routes, merged at the `/api` root.
///
/// ```text
/// GET /modules        -> list_modules
/// GET /ticket-types   -> list_ticket_types
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/modules", get(catalog::list_modules))
        .route("/ticket-types", get(catalog::list_ticket_types))
}
