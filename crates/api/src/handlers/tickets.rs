//! Handlers for the `/tickets` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mesa_core::error::CoreError;
use mesa_core::roles::Role;
use mesa_core::ticket::{
    derive_subject, validate_new_ticket, validate_priority, validate_status, validate_transition,
    NewTicketForm, DEFAULT_PRIORITY, MAX_DESCRIPTION_LENGTH, MAX_SUBJECT_LENGTH, STATUS_IN_PROGRESS,
    STATUS_OPEN,
};
use mesa_core::types::DbId;
use mesa_db::models::ticket::{
    CreateTicket, NewTicket, Ticket, TicketDetail, TicketListParams, TicketView, UpdateTicket,
};
use mesa_db::repositories::{
    AttachmentRepo, CatalogRepo, MessageRepo, TicketRepo, UserRepo,
};
use mesa_db::{clamp_limit, clamp_offset};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Whether `user` may see `ticket` at all.
fn can_view(user: &AuthUser, ticket: &Ticket) -> bool {
    user.permissions().can_view_all_tickets || ticket.user_id == user.user_id
}

/// Load a ticket row, failing with 404 if absent and 403 if the caller may
/// not see it.
pub(crate) async fn load_visible_ticket(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<Ticket> {
    let ticket = TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;
    if !can_view(user, &ticket) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this ticket".into(),
        )));
    }
    Ok(ticket)
}

async fn load_view(state: &AppState, id: DbId) -> AppResult<TicketView> {
    TicketRepo::find_view_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))
}

/// Tickets the caller may see, unpaginated; shared with the dashboard.
pub(crate) async fn list_visible(
    state: &AppState,
    user: &AuthUser,
    params: &TicketListParams,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<TicketView>> {
    let owner = (!user.permissions().can_view_all_tickets).then_some(user.user_id);
    Ok(TicketRepo::list_filtered(&state.pool, params, owner, limit, offset).await?)
}

/// GET /api/tickets
///
/// Newest first. Callers without the view-all permission only get their own.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TicketListParams>,
) -> AppResult<Json<Vec<TicketView>>> {
    if let Some(status) = &params.status {
        validate_status(status)?;
    }
    if let Some(priority) = params.priority {
        validate_priority(priority)?;
    }
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);
    let tickets = list_visible(&state, &user, &params, limit, offset).await?;
    Ok(Json(tickets))
}

/// GET /api/tickets/{id}
///
/// Ticket with its conversation. Internal notes are only included for staff.
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TicketDetail>> {
    load_visible_ticket(&state, &user, id).await?;
    let ticket = load_view(&state, id).await?;
    let messages = MessageRepo::list_by_ticket(
        &state.pool,
        id,
        user.permissions().can_see_internal_messages,
    )
    .await?;
    Ok(Json(TicketDetail { ticket, messages }))
}

/// POST /api/tickets
///
/// A blank subject is derived from the first line of the description.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTicket>,
) -> AppResult<(StatusCode, Json<TicketDetail>)> {
    let form = NewTicketForm {
        module_id: Some(input.module_id),
        ticket_type_id: Some(input.ticket_type_id),
        subject: input.subject.clone().unwrap_or_default(),
        description: input.description.clone(),
        priority: input.priority,
        files: Vec::new(),
    };
    let mut field_errors = validate_new_ticket(&form).err().unwrap_or_default();

    if !CatalogRepo::module_exists(&state.pool, input.module_id).await? {
        field_errors.insert("module_id".into(), "Unknown module".into());
    }
    if !CatalogRepo::ticket_type_exists(&state.pool, input.ticket_type_id).await? {
        field_errors.insert("ticket_type_id".into(), "Unknown ticket type".into());
    }
    if !field_errors.is_empty() {
        return Err(AppError::InvalidFields(field_errors));
    }

    let description = input.description.trim().to_string();
    let subject = match form.subject.trim() {
        "" => derive_subject(&description),
        s => s.to_string(),
    };

    let ticket = TicketRepo::create(
        &state.pool,
        &NewTicket {
            subject,
            description,
            priority: input.priority.unwrap_or(DEFAULT_PRIORITY),
            user_id: user.user_id,
            module_id: input.module_id,
            ticket_type_id: input.ticket_type_id,
        },
    )
    .await?;
    tracing::info!(ticket_id = ticket.id, code = %ticket.code, user_id = user.user_id, "Ticket created");

    let ticket = load_view(&state, ticket.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(TicketDetail {
            ticket,
            messages: Vec::new(),
        }),
    ))
}

/// PUT /api/tickets/{id}
///
/// Status, priority and assignee are staff-only. Owners may reword their own
/// ticket while it is still open. A technician who starts work on an
/// unassigned ticket takes it.
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTicket>,
) -> AppResult<Json<TicketView>> {
    if input.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    let ticket = load_visible_ticket(&state, &user, id).await?;
    let perms = user.permissions();

    let workflow_change =
        input.status.is_some() || input.priority.is_some() || input.assigned_to.is_some();
    if workflow_change && !perms.can_change_status {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only technicians and admins can change status, priority or assignee".into(),
        )));
    }

    let content_change = input.subject.is_some() || input.description.is_some();
    let owner_may_edit = ticket.user_id == user.user_id && ticket.status == STATUS_OPEN;
    if content_change && !(perms.can_edit_tickets || owner_may_edit) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner can edit a ticket, and only while it is open".into(),
        )));
    }

    let subject = match input.subject.as_deref().map(str::trim) {
        Some("") => {
            return Err(AppError::Core(CoreError::Validation(
                "Subject cannot be empty".into(),
            )))
        }
        Some(s) if s.chars().count() > MAX_SUBJECT_LENGTH => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Subject exceeds {MAX_SUBJECT_LENGTH} characters"
            ))))
        }
        other => other.map(str::to_string),
    };
    let description = match input.description.as_deref().map(str::trim) {
        Some("") => {
            return Err(AppError::Core(CoreError::Validation(
                "Description cannot be empty".into(),
            )))
        }
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LENGTH => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Description exceeds {MAX_DESCRIPTION_LENGTH} characters"
            ))))
        }
        other => other.map(str::to_string),
    };

    if let Some(status) = &input.status {
        validate_transition(&ticket.status, status)?;
    }
    if let Some(priority) = input.priority {
        validate_priority(priority)?;
    }

    let mut assigned_to = input.assigned_to;
    if let Some(assignee_id) = assigned_to {
        let assignee = UserRepo::find_by_id(&state.pool, assignee_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Assignee {assignee_id} does not exist"
                )))
            })?;
        if UserRepo::find_staff_by_id(&state.pool, assignee.id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(
                "Tickets can only be assigned to technicians or admins".into(),
            )));
        }
    }

    let starts_work = input.status.as_deref() == Some(STATUS_IN_PROGRESS)
        && ticket.status != STATUS_IN_PROGRESS;
    if starts_work
        && user.role == Role::Technician
        && ticket.assigned_to.is_none()
        && assigned_to.is_none()
    {
        assigned_to = Some(user.user_id);
    }

    let changes = UpdateTicket {
        subject,
        description,
        status: input.status,
        priority: input.priority,
        assigned_to,
    };
    // Permission and transition checks above read `ticket.status`; the write
    // only lands if nobody moved the ticket in between.
    if TicketRepo::update(&state.pool, id, &changes, Some(ticket.status.as_str()))
        .await?
        .is_none()
    {
        return Err(match TicketRepo::find_by_id(&state.pool, id).await? {
            Some(_) => AppError::Core(CoreError::Conflict(
                "Ticket was changed by someone else; reload and try again".into(),
            )),
            None => AppError::Core(CoreError::NotFound {
                entity: "Ticket",
                id,
            }),
        });
    }

    tracing::info!(
        ticket_id = id,
        user_id = user.user_id,
        status = ?changes.status,
        assigned_to = ?changes.assigned_to,
        "Ticket updated",
    );

    Ok(Json(load_view(&state, id).await?))
}

/// DELETE /api/tickets/{id}
///
/// Admin only. Messages and attachment rows cascade; stored files are
/// removed afterwards and failures there are only logged.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let paths = AttachmentRepo::storage_paths_for_ticket(&state.pool, id).await?;
    if !TicketRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }));
    }

    for path in &paths {
        if let Err(e) = state.storage.remove(path).await {
            tracing::warn!(ticket_id = id, %path, error = %e, "Failed to remove attachment file");
        }
    }
    if let Err(e) = state.storage.remove_ticket_dir(id).await {
        tracing::warn!(ticket_id = id, error = %e, "Failed to remove ticket directory");
    }

    tracing::info!(ticket_id = id, user_id = admin.user_id, files = paths.len(), "Ticket deleted");
    Ok(StatusCode::NO_CONTENT)
}
