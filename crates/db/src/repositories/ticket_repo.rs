//! Repository for the `tickets` table.

use chrono::Datelike;
use mesa_core::ticket::{
    format_ticket_code, STATUS_CLOSED, STATUS_IN_PROGRESS, STATUS_OPEN, STATUS_RESOLVED,
};
use mesa_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket::{
    NewTicket, Ticket, TicketCounts, TicketListParams, TicketRow, TicketView, UpdateTicket,
};

/// Column list for plain `tickets` queries.
const COLUMNS: &str = "\
    id, code, subject, description, status, priority, user_id, module_id, \
    ticket_type_id, assigned_to, resolved_at, created_at, updated_at";

/// Joined select producing [`TicketRow`]; callers append `WHERE`/`ORDER BY`.
const SELECT_JOINED: &str = "\
    SELECT t.id, t.code, t.subject, t.description, t.status, t.priority, \
           t.user_id, t.module_id, t.ticket_type_id, t.assigned_to, t.resolved_at, \
           t.created_at, t.updated_at, \
           u.name AS user_name, u.email AS user_email, u.role AS user_role, \
           m.label AS module_label, tt.label AS ticket_type_label, \
           a.name AS assignee_name, a.email AS assignee_email, a.role AS assignee_role \
    FROM tickets t \
    JOIN users u ON u.id = t.user_id \
    JOIN modules m ON m.id = t.module_id \
    JOIN ticket_types tt ON tt.id = t.ticket_type_id \
    LEFT JOIN users a ON a.id = t.assigned_to";

/// Provides CRUD operations for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert a ticket, assigning its public code from the reserved id.
    ///
    /// The id is drawn from the sequence first so the code can embed it;
    /// both happen in one transaction.
    pub async fn create(pool: &PgPool, input: &NewTicket) -> Result<Ticket, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "SELECT nextval(pg_get_serial_sequence('tickets', 'id'))",
        )
        .fetch_one(&mut *tx)
        .await?;

        let code = format_ticket_code(chrono::Utc::now().year(), id);

        let query = format!(
            "INSERT INTO tickets \
                (id, code, subject, description, priority, user_id, module_id, ticket_type_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(&code)
            .bind(&input.subject)
            .bind(&input.description)
            .bind(input.priority)
            .bind(input.user_id)
            .bind(input.module_id)
            .bind(input.ticket_type_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ticket)
    }

    /// Find a ticket row by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a ticket with its owner, module, type and assignee resolved.
    pub async fn find_view_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TicketView>, sqlx::Error> {
        let query = format!("{SELECT_JOINED} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TicketRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(TicketView::from))
    }

    /// List tickets with optional filters, newest first.
    ///
    /// `owner_id` restricts the result to one submitter's tickets; it is how
    /// callers without the view-all permission are scoped.
    pub async fn list_filtered(
        pool: &PgPool,
        params: &TicketListParams,
        owner_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TicketView>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if owner_id.is_some() {
            conditions.push(format!("t.user_id = ${param_idx}"));
            param_idx += 1;
        }
        if params.status.is_some() {
            conditions.push(format!("t.status = ${param_idx}"));
            param_idx += 1;
        }
        if params.priority.is_some() {
            conditions.push(format!("t.priority = ${param_idx}"));
            param_idx += 1;
        }
        if params.module_id.is_some() {
            conditions.push(format!("t.module_id = ${param_idx}"));
            param_idx += 1;
        }
        if params.assigned_to.is_some() {
            conditions.push(format!("t.assigned_to = ${param_idx}"));
            param_idx += 1;
        }
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if search.is_some() {
            conditions.push(format!(
                "(t.subject ILIKE ${param_idx} OR t.description ILIKE ${param_idx} \
                 OR t.code ILIKE ${param_idx})"
            ));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "{SELECT_JOINED} {where_clause} \
             ORDER BY t.created_at DESC, t.id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, TicketRow>(&query);

        if let Some(uid) = owner_id {
            q = q.bind(uid);
        }
        if let Some(s) = &params.status {
            q = q.bind(s);
        }
        if let Some(p) = params.priority {
            q = q.bind(p);
        }
        if let Some(m) = params.module_id {
            q = q.bind(m);
        }
        if let Some(a) = params.assigned_to {
            q = q.bind(a);
        }
        if let Some(s) = search {
            q = q.bind(format!("%{}%", escape_like(s)));
        }
        q = q.bind(limit).bind(offset);

        let rows = q.fetch_all(pool).await?;
        Ok(rows.into_iter().map(TicketView::from).collect())
    }

    /// Dashboard counters over every ticket the viewer can see.
    ///
    /// `owner_id` scopes the counts the same way as [`TicketRepo::list_filtered`];
    /// `mine` counts tickets filed by `viewer_id`.
    pub async fn count_stats(
        pool: &PgPool,
        owner_id: Option<DbId>,
        viewer_id: DbId,
    ) -> Result<TicketCounts, sqlx::Error> {
        sqlx::query_as::<_, TicketCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status = $3) AS open,
                    COUNT(*) FILTER (WHERE status = $4) AS in_progress,
                    COUNT(*) FILTER (WHERE status IN ($5, $6)) AS resolved,
                    COUNT(*) FILTER (WHERE user_id = $2) AS mine
             FROM tickets
             WHERE $1::BIGINT IS NULL OR user_id = $1",
        )
        .bind(owner_id)
        .bind(viewer_id)
        .bind(STATUS_OPEN)
        .bind(STATUS_IN_PROGRESS)
        .bind(STATUS_RESOLVED)
        .bind(STATUS_CLOSED)
        .fetch_one(pool)
        .await
    }

    /// Update a ticket. Only non-`None` fields in `input` are applied.
    ///
    /// `resolved_at` is stamped the first time the ticket reaches `resolved`
    /// or `closed`, and cleared when it goes back to `open`/`in_progress`.
    ///
    /// With `expected_status`, the row is only written if its status is
    /// still that value, so a transition checked against a stale read cannot
    /// land. Returns `None` if no row matched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTicket,
        expected_status: Option<&str>,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET
                subject = COALESCE($2, subject),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                assigned_to = COALESCE($6, assigned_to),
                resolved_at = CASE
                    WHEN $4::TEXT IS NULL THEN resolved_at
                    WHEN $4::TEXT IN ('resolved', 'closed') THEN COALESCE(resolved_at, NOW())
                    ELSE NULL
                END
             WHERE id = $1 AND ($7::TEXT IS NULL OR status = $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(&input.subject)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.priority)
            .bind(input.assigned_to)
            .bind(expected_status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a ticket; messages and attachment rows cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
