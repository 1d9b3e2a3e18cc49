//! Read-only catalogs used to fill the new-ticket form.

use axum::extract::State;
use axum::Json;
use mesa_db::models::catalog::{Module, TicketType};
use mesa_db::repositories::CatalogRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/modules
pub async fn list_modules(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Module>>> {
    Ok(Json(CatalogRepo::list_modules(&state.pool).await?))
}

/// GET /api/ticket-types
pub async fn list_ticket_types(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TicketType>>> {
    Ok(Json(CatalogRepo::list_ticket_types(&state.pool).await?))
}
