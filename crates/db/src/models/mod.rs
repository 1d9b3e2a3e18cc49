//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Joined read models (`*Row`) are flattened query results that convert into
//! the nested shapes the API returns.

pub mod attachment;
pub mod authorized_email;
pub mod catalog;
pub mod message;
pub mod ticket;
pub mod user;
