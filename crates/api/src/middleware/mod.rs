//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- resolves the caller from the `x-user-email` header.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.
//! - [`rbac::RequireStaff`] -- requires `admin` or `technician`.

pub mod auth;
pub mod rbac;
