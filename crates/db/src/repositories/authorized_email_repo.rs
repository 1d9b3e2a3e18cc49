//! Repository for the `authorized_emails` table.

use mesa_core::types::DbId;
use sqlx::PgPool;

use crate::models::authorized_email::AuthorizedEmail;

const COLUMNS: &str = "id, email, allowed_role, created_at, updated_at";

/// Provides CRUD operations for the sign-in allow-list.
///
/// E-mails must be normalized (see `mesa_core::authorized_email`) before
/// they reach this layer; the table enforces lower case.
pub struct AuthorizedEmailRepo;

impl AuthorizedEmailRepo {
    /// List every entry ordered by e-mail.
    pub async fn list(pool: &PgPool) -> Result<Vec<AuthorizedEmail>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authorized_emails ORDER BY email");
        sqlx::query_as::<_, AuthorizedEmail>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AuthorizedEmail>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authorized_emails WHERE id = $1");
        sqlx::query_as::<_, AuthorizedEmail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<AuthorizedEmail>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authorized_emails WHERE email = $1");
        sqlx::query_as::<_, AuthorizedEmail>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new entry. A duplicate e-mail fails on `uq_authorized_emails_email`.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        role: &str,
    ) -> Result<AuthorizedEmail, sqlx::Error> {
        let query = format!(
            "INSERT INTO authorized_emails (email, allowed_role)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuthorizedEmail>(&query)
            .bind(email)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Insert or overwrite the role of an entry.
    pub async fn upsert(
        pool: &PgPool,
        email: &str,
        role: &str,
    ) -> Result<AuthorizedEmail, sqlx::Error> {
        let query = format!(
            "INSERT INTO authorized_emails (email, allowed_role)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_authorized_emails_email
             DO UPDATE SET allowed_role = EXCLUDED.allowed_role
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuthorizedEmail>(&query)
            .bind(email)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Change the role of an entry. Returns `None` if it does not exist.
    pub async fn update_role(
        pool: &PgPool,
        id: DbId,
        role: &str,
    ) -> Result<Option<AuthorizedEmail>, sqlx::Error> {
        let query = format!(
            "UPDATE authorized_emails SET allowed_role = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuthorizedEmail>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Remove an entry. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM authorized_emails WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
