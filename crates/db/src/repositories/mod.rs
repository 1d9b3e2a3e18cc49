//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod attachment_repo;
pub mod authorized_email_repo;
pub mod catalog_repo;
pub mod message_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use attachment_repo::AttachmentRepo;
pub use authorized_email_repo::AuthorizedEmailRepo;
pub use catalog_repo::CatalogRepo;
pub use message_repo::MessageRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
