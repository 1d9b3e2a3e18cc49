//! Typed client for the helpdesk API, plus the session gate and the page
//! state the web UI builds on.

pub mod api;
pub mod dto;
pub mod error;
pub mod gate;
pub mod pages;

pub use api::{ApiClient, Session, UploadFile, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use gate::{AuthGate, GateDecision};
pub use pages::{AuthorizedEmailsPage, TicketBoard};
