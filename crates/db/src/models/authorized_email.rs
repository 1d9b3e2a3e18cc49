//! Authorized e-mail (sign-in allow-list) model and DTOs.

use mesa_core::authorized_email::ImportEntry;
use mesa_core::roles::ROLE_USER;
use mesa_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `authorized_emails` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuthorizedEmail {
    pub id: DbId,
    pub email: String,
    pub allowed_role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding an address to the allow-list.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthorizedEmail {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

/// DTO for changing the role granted to an address.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAuthorizedEmail {
    pub role: String,
}

/// Request body for the bulk import endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportAuthorizedEmails {
    pub emails: Vec<ImportEntry>,
}

fn default_role() -> String {
    ROLE_USER.to_string()
}
