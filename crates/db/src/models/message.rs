//! Ticket conversation messages.

use mesa_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::user::UserRef;

/// A message joined with its sender.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: DbId,
    pub ticket_id: DbId,
    pub body: String,
    pub is_internal: bool,
    pub created_at: Timestamp,
    pub sender_id: DbId,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_role: String,
}

/// Message as returned inside a ticket detail.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub id: DbId,
    pub ticket_id: DbId,
    pub body: String,
    pub is_internal: bool,
    pub created_at: Timestamp,
    pub sender: UserRef,
}

impl From<MessageRow> for MessageView {
    fn from(r: MessageRow) -> Self {
        Self {
            id: r.id,
            ticket_id: r.ticket_id,
            body: r.body,
            is_internal: r.is_internal,
            created_at: r.created_at,
            sender: UserRef {
                id: r.sender_id,
                name: r.sender_name,
                email: r.sender_email,
                role: r.sender_role,
            },
        }
    }
}

/// DTO for posting a message to a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessage {
    pub body: String,
    #[serde(default)]
    pub is_internal: bool,
}
