//! Dashboard summary for the signed-in user.

use axum::extract::State;
use axum::Json;
use mesa_core::dashboard::{recent, TicketStats, RECENT_TICKETS};
use mesa_db::models::ticket::{TicketListParams, TicketView};
use mesa_db::repositories::TicketRepo;
use serde::Serialize;

use super::tickets::list_visible;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: TicketStats,
    pub recent_tickets: Vec<TicketView>,
}

/// GET /api/dashboard/stats
///
/// Counters over every ticket the caller can see, plus the most recent few.
pub async fn stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DashboardResponse>> {
    let owner = (!user.permissions().can_view_all_tickets).then_some(user.user_id);
    let counts = TicketRepo::count_stats(&state.pool, owner, user.user_id).await?;

    let latest = list_visible(
        &state,
        &user,
        &TicketListParams::default(),
        RECENT_TICKETS as i64,
        0,
    )
    .await?;

    Ok(Json(DashboardResponse {
        stats: counts.into(),
        recent_tickets: recent(&latest, RECENT_TICKETS),
    }))
}
