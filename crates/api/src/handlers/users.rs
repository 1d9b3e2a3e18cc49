use axum::extract::State;
use axum::Json;
use mesa_db::models::user::UserRef;
use mesa_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

/// GET /api/users/technicians
///
/// Users a ticket can be assigned to.
pub async fn list_technicians(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserRef>>> {
    let staff = UserRepo::list_staff(&state.pool).await?;
    Ok(Json(staff.iter().map(UserRef::from).collect()))
}
