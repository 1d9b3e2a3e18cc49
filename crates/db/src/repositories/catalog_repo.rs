//! Read access to the seeded `modules` and `ticket_types` catalogs.

use mesa_core::types::DbId;
use sqlx::PgPool;

use crate::models::catalog::{Module, TicketType};

pub struct CatalogRepo;

impl CatalogRepo {
    pub async fn list_modules(pool: &PgPool) -> Result<Vec<Module>, sqlx::Error> {
        sqlx::query_as::<_, Module>("SELECT id, label FROM modules ORDER BY id")
            .fetch_all(pool)
            .await
    }

    pub async fn list_ticket_types(pool: &PgPool) -> Result<Vec<TicketType>, sqlx::Error> {
        sqlx::query_as::<_, TicketType>("SELECT id, label FROM ticket_types ORDER BY id")
            .fetch_all(pool)
            .await
    }

    pub async fn module_exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM modules WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn ticket_type_exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM ticket_types WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
