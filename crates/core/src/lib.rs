//! Domain rules for the clinical helpdesk.
//!
//! Everything here is pure: no I/O, no database access. The API server and
//! the client library both depend on these rules so that validation and
//! permission checks agree on both sides of the wire.

pub mod attachment;
pub mod authorized_email;
pub mod dashboard;
pub mod error;
pub mod roles;
pub mod ticket;
pub mod types;
