pub mod auth;
pub mod authorized_emails;
pub mod catalog;
pub mod health;
pub mod tickets;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/verify                                  sign-in check (public, POST)
/// /auth/check-email/{email}                     allow-list lookup (public)
/// /auth/sync-user                               refresh profile (POST)
/// /auth/me                                      current user + permissions
///
/// /tickets                                      list, create
/// /tickets/{id}                                 get, update, delete (admin)
/// /tickets/{id}/messages                        list, create
/// /tickets/{id}/attachments                     list, upload (multipart)
/// /tickets/attachments/{id}/download            file as attachment
/// /tickets/attachments/{id}/view                file inline (images, PDF)
///
/// /dashboard/stats                              counters + recent tickets
/// /modules                                      module catalog
/// /ticket-types                                 ticket type catalog
/// /users/technicians                            assignable staff (staff only)
///
/// /authorized-emails                            list, create (admin only)
/// /authorized-emails/{id}                       update role, delete
/// /authorized-emails/import                     bulk upsert (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/tickets", tickets::router())
        .nest("/authorized-emails", authorized_emails::router())
        .merge(catalog::router())
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .route("/users/technicians", get(handlers::users::list_technicians))
}
