//! Ticket entity model, joined read models and DTOs.

use mesa_core::dashboard::{TicketFacts, TicketStats};
use mesa_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::catalog::{Module, TicketType};
use crate::models::message::MessageView;
use crate::models::user::UserRef;

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub code: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub priority: i32,
    pub user_id: DbId,
    pub module_id: DbId,
    pub ticket_type_id: DbId,
    pub assigned_to: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A ticket joined with its owner, module, type and assignee.
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: DbId,
    pub code: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub priority: i32,
    pub user_id: DbId,
    pub module_id: DbId,
    pub ticket_type_id: DbId,
    pub assigned_to: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub user_name: String,
    pub user_email: String,
    pub user_role: String,
    pub module_label: String,
    pub ticket_type_label: String,
    pub assignee_name: Option<String>,
    pub assignee_email: Option<String>,
    pub assignee_role: Option<String>,
}

/// Ticket as returned by list endpoints: nested owner, module, type and
/// optional assignee.
#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    pub id: DbId,
    pub code: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub priority: i32,
    pub user_id: DbId,
    pub module_id: DbId,
    pub ticket_type_id: DbId,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub user: UserRef,
    pub module: Module,
    pub ticket_type: TicketType,
    pub assigned_to_user: Option<UserRef>,
}

impl From<TicketRow> for TicketView {
    fn from(r: TicketRow) -> Self {
        let assigned_to_user = match (r.assigned_to, r.assignee_name, r.assignee_email) {
            (Some(id), Some(name), Some(email)) => Some(UserRef {
                id,
                name,
                email,
                role: r.assignee_role.unwrap_or_default(),
            }),
            _ => None,
        };
        Self {
            id: r.id,
            code: r.code,
            subject: r.subject,
            description: r.description,
            status: r.status,
            priority: r.priority,
            user_id: r.user_id,
            module_id: r.module_id,
            ticket_type_id: r.ticket_type_id,
            resolved_at: r.resolved_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
            user: UserRef {
                id: r.user_id,
                name: r.user_name,
                email: r.user_email,
                role: r.user_role,
            },
            module: Module {
                id: r.module_id,
                label: r.module_label,
            },
            ticket_type: TicketType {
                id: r.ticket_type_id,
                label: r.ticket_type_label,
            },
            assigned_to_user,
        }
    }
}

impl TicketFacts for TicketView {
    fn status(&self) -> &str {
        &self.status
    }

    fn owner_email(&self) -> &str {
        &self.user.email
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// Ticket detail: the list view plus its conversation.
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: TicketView,
    pub messages: Vec<MessageView>,
}

/// DTO for filing a new ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicket {
    pub module_id: DbId,
    pub ticket_type_id: DbId,
    #[serde(default)]
    pub subject: Option<String>,
    pub description: String,
    pub priority: Option<i32>,
}

/// Values actually inserted, after defaults are applied.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub priority: i32,
    pub user_id: DbId,
    pub module_id: DbId,
    pub ticket_type_id: DbId,
}

/// DTO for updating a ticket. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTicket {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub assigned_to: Option<DbId>,
}

impl UpdateTicket {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assigned_to.is_none()
    }
}

/// Query parameters for listing tickets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketListParams {
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub module_id: Option<DbId>,
    pub assigned_to: Option<DbId>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Dashboard counters computed in SQL by [`crate::repositories::TicketRepo::count_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct TicketCounts {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub mine: i64,
}

impl From<TicketCounts> for TicketStats {
    fn from(c: TicketCounts) -> Self {
        let n = |v: i64| usize::try_from(v).unwrap_or(0);
        TicketStats {
            total: n(c.total),
            open: n(c.open),
            in_progress: n(c.in_progress),
            resolved: n(c.resolved),
            mine: n(c.mine),
        }
    }
}
