//! Repository for the `ticket_messages` table.

use mesa_core::types::DbId;
use sqlx::PgPool;

use crate::models::message::{CreateMessage, MessageRow, MessageView};

/// Joined select producing [`MessageRow`] from a relation aliased `msg`.
const SELECT_JOINED: &str = "\
    SELECT msg.id, msg.ticket_id, msg.body, msg.is_internal, msg.created_at, \
           msg.sender_id, u.name AS sender_name, u.email AS sender_email, \
           u.role AS sender_role";

pub struct MessageRepo;

impl MessageRepo {
    /// Post a message and return it with its sender resolved.
    pub async fn create(
        pool: &PgPool,
        ticket_id: DbId,
        sender_id: DbId,
        input: &CreateMessage,
    ) -> Result<MessageView, sqlx::Error> {
        let query = format!(
            "WITH msg AS (
                INSERT INTO ticket_messages (ticket_id, sender_id, body, is_internal)
                VALUES ($1, $2, $3, $4)
                RETURNING id, ticket_id, sender_id, body, is_internal, created_at
             )
             {SELECT_JOINED}
             FROM msg JOIN users u ON u.id = msg.sender_id"
        );
        let row = sqlx::query_as::<_, MessageRow>(&query)
            .bind(ticket_id)
            .bind(sender_id)
            .bind(input.body.trim())
            .bind(input.is_internal)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// A ticket's conversation in posting order.
    ///
    /// Internal notes are left out unless `include_internal` is set.
    pub async fn list_by_ticket(
        pool: &PgPool,
        ticket_id: DbId,
        include_internal: bool,
    ) -> Result<Vec<MessageView>, sqlx::Error> {
        let query = format!(
            "{SELECT_JOINED}
             FROM ticket_messages msg JOIN users u ON u.id = msg.sender_id
             WHERE msg.ticket_id = $1 AND ($2 OR NOT msg.is_internal)
             ORDER BY msg.created_at, msg.id"
        );
        let rows = sqlx::query_as::<_, MessageRow>(&query)
            .bind(ticket_id)
            .bind(include_internal)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(MessageView::from).collect())
    }
}
