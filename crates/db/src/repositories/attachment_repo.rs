//! Repository for the `attachments` table.

use mesa_core::types::DbId;
use sqlx::PgPool;

use crate::models::attachment::{Attachment, AttachmentRow, AttachmentView, CreateAttachment};

const COLUMNS: &str = "\
    id, ticket_id, filename, mime_type, size_bytes, storage_path, uploaded_by, created_at";

const SELECT_JOINED: &str = "\
    SELECT a.id, a.ticket_id, a.filename, a.mime_type, a.size_bytes, a.storage_path, \
           a.uploaded_by, a.created_at, \
           u.name AS uploader_name, u.email AS uploader_email, u.role AS uploader_role \
    FROM attachments a JOIN users u ON u.id = a.uploaded_by";

pub struct AttachmentRepo;

impl AttachmentRepo {
    /// Record a stored upload.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAttachment,
    ) -> Result<Attachment, sqlx::Error> {
        let query = format!(
            "INSERT INTO attachments \
                (ticket_id, filename, mime_type, size_bytes, storage_path, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attachment>(&query)
            .bind(input.ticket_id)
            .bind(&input.filename)
            .bind(&input.mime_type)
            .bind(input.size_bytes)
            .bind(&input.storage_path)
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Attachment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attachments WHERE id = $1");
        sqlx::query_as::<_, Attachment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_view_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AttachmentView>, sqlx::Error> {
        let query = format!("{SELECT_JOINED} WHERE a.id = $1");
        let row = sqlx::query_as::<_, AttachmentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(AttachmentView::from))
    }

    /// Attachments of a ticket, oldest first.
    pub async fn list_by_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<AttachmentView>, sqlx::Error> {
        let query = format!("{SELECT_JOINED} WHERE a.ticket_id = $1 ORDER BY a.created_at, a.id");
        let rows = sqlx::query_as::<_, AttachmentRow>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(AttachmentView::from).collect())
    }

    /// Storage paths of a ticket's files, for cleanup before the ticket row
    /// (and, by cascade, these rows) is deleted.
    pub async fn storage_paths_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT storage_path FROM attachments WHERE ticket_id = $1",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
    }
}
