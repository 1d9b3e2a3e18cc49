//! Ticket attachment metadata. File bytes live on disk; only the relative
//! storage path is kept here.

use mesa_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::user::UserRef;

/// A row from the `attachments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attachment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub uploaded_by: DbId,
    pub created_at: Timestamp,
}

/// An attachment joined with its uploader.
#[derive(Debug, Clone, FromRow)]
pub struct AttachmentRow {
    #[sqlx(flatten)]
    pub attachment: Attachment,
    pub uploader_name: String,
    pub uploader_email: String,
    pub uploader_role: String,
}

/// Attachment as returned by the listing and upload endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentView {
    #[serde(flatten)]
    pub attachment: Attachment,
    pub uploader: UserRef,
}

impl From<AttachmentRow> for AttachmentView {
    fn from(r: AttachmentRow) -> Self {
        let uploader = UserRef {
            id: r.attachment.uploaded_by,
            name: r.uploader_name,
            email: r.uploader_email,
            role: r.uploader_role,
        };
        Self {
            attachment: r.attachment,
            uploader,
        }
    }
}

/// DTO for recording a stored upload.
#[derive(Debug, Clone)]
pub struct CreateAttachment {
    pub ticket_id: DbId,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub uploaded_by: DbId,
}
