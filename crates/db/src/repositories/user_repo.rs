//! Repository for the `users` table.

use mesa_core::roles::{ROLE_ADMIN, ROLE_TECHNICIAN};
use mesa_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{UpsertUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, role, created_at, updated_at";

/// Allow-listed addresses holding a staff role; binds `$1`/`$2`.
const STAFF_EMAILS: &str =
    "SELECT email FROM authorized_emails WHERE allowed_role IN ($1, $2)";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user on first sign-in, or refresh the role of an existing one.
    ///
    /// The stored name is left alone on conflict; use [`UserRepo::update_name`]
    /// to change it.
    pub async fn upsert(pool: &PgPool, input: &UpsertUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, name, role)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_users_email
             DO UPDATE SET role = EXCLUDED.role
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by (already normalized) e-mail.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Replace the display name. Returns `None` if the user does not exist.
    pub async fn update_name(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET name = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Propagate an allow-list role change to the matching user, if any.
    ///
    /// Returns `true` if a user row was updated.
    pub async fn sync_role(pool: &PgPool, email: &str, role: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE email = $1 AND role <> $2")
            .bind(email)
            .bind(role)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Users who can be assigned tickets (admins and technicians), by name.
    ///
    /// Staff status comes from the allow-list, so a user whose entry was
    /// removed or downgraded drops out even before their next sign-in.
    pub async fn list_staff(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE email IN ({STAFF_EMAILS})
             ORDER BY name, id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(ROLE_ADMIN)
            .bind(ROLE_TECHNICIAN)
            .fetch_all(pool)
            .await
    }

    /// Find a user by ID, but only if the allow-list still grants them a
    /// staff role.
    pub async fn find_staff_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE id = $3 AND email IN ({STAFF_EMAILS})"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(ROLE_ADMIN)
            .bind(ROLE_TECHNICIAN)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
