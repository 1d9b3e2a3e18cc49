//! Ticket categorization catalogs (modules and ticket types).

use mesa_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `modules` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Module {
    pub id: DbId,
    pub label: String,
}

/// A row from the `ticket_types` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TicketType {
    pub id: DbId,
    pub label: String,
}
