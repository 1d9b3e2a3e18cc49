//! Handlers for a ticket's conversation: `/tickets/{id}/messages`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mesa_core::error::CoreError;
use mesa_core::ticket::validate_message_body;
use mesa_core::types::DbId;
use mesa_db::models::message::{CreateMessage, MessageView};
use mesa_db::repositories::MessageRepo;

use super::tickets::load_visible_ticket;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/tickets/{id}/messages
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<Json<Vec<MessageView>>> {
    load_visible_ticket(&state, &user, ticket_id).await?;
    let messages = MessageRepo::list_by_ticket(
        &state.pool,
        ticket_id,
        user.permissions().can_see_internal_messages,
    )
    .await?;
    Ok(Json(messages))
}

/// POST /api/tickets/{id}/messages
///
/// Internal notes are staff-only.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Json(input): Json<CreateMessage>,
) -> AppResult<(StatusCode, Json<MessageView>)> {
    load_visible_ticket(&state, &user, ticket_id).await?;
    validate_message_body(&input.body)?;
    if input.is_internal && !user.permissions().can_see_internal_messages {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only technicians and admins can post internal notes".into(),
        )));
    }

    let message = MessageRepo::create(&state.pool, ticket_id, user.user_id, &input).await?;
    tracing::info!(
        ticket_id,
        message_id = message.id,
        user_id = user.user_id,
        internal = message.is_internal,
        "Message posted",
    );
    Ok((StatusCode::CREATED, Json(message)))
}
