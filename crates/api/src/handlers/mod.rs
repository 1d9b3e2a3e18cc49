pub mod attachments;
pub mod auth;
pub mod authorized_emails;
pub mod catalog;
pub mod dashboard;
pub mod messages;
pub mod tickets;
pub mod users;
