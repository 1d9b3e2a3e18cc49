//! Wire types, mirroring what the server sends and accepts.

use mesa_core::authorized_email::ImportSummary;
use mesa_core::dashboard::{TicketFacts, TicketStats};
use mesa_core::roles::Permissions;
use mesa_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// `GET /auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct Me {
    #[serde(flatten)]
    pub user: User,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailCheck {
    pub email: String,
    pub authorized: bool,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: DbId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    pub id: DbId,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: DbId,
    pub ticket_id: DbId,
    pub body: String,
    pub is_internal: bool,
    pub created_at: Timestamp,
    pub sender: UserRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub user: UserRef,
    pub module: Module,
    pub ticket_type: TicketType,
    pub assigned_to_user: Option<UserRef>,
    /// Only present on detail responses.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl TicketFacts for Ticket {
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

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateTicket {
    pub module_id: DbId,
    pub ticket_type_id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

/// Partial ticket update; unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTicket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<DbId>,
}

/// Filters for `GET /tickets`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dashboard {
    pub stats: TicketStats,
    pub recent_tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub uploaded_by: DbId,
    pub created_at: Timestamp,
    pub uploader: Option<UserRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResult {
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedEmail {
    pub id: DbId,
    pub email: String,
    pub allowed_role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// `{success, data}` envelope used by the allow-list and auth helpers.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportResult {
    pub summary: ImportSummary,
}
