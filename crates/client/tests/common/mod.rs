//! Stub API server and JSON fixtures shared by the client tests.

#![allow(dead_code)]

use axum::Router;
use mesa_client::{ApiClient, Session};
use serde_json::{json, Value};

pub const ANA: &str = "ana@clinic.org";
pub const ADMIN: &str = "admin@clinic.org";

const TS: &str = "2026-03-01T09:00:00Z";

/// Serve `router` on an ephemeral port and return its `/api` base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

pub fn client_as(base_url: &str, email: &str) -> ApiClient {
    ApiClient::new(base_url).with_session(Session::new(email, Some("Test".into())))
}

pub fn user_json(id: i64, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "name": email.split('@').next().unwrap(),
        "email": email,
        "role": role,
        "created_at": TS,
        "updated_at": TS,
    })
}

pub fn user_ref_json(id: i64, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "name": email.split('@').next().unwrap(),
        "email": email,
        "role": role,
    })
}

pub fn ticket_json(id: i64, owner: &str, subject: &str, status: &str) -> Value {
    json!({
        "id": id,
        "code": format!("TK-2026-{id:06}"),
        "subject": subject,
        "description": format!("{subject}: details"),
        "status": status,
        "priority": 2,
        "user_id": 1,
        "module_id": 1,
        "ticket_type_id": 2,
        "resolved_at": null,
        "created_at": TS,
        "updated_at": TS,
        "user": user_ref_json(1, owner, "user"),
        "module": {"id": 1, "label": "HIS - Asistencial"},
        "ticket_type": {"id": 2, "label": "Problema"},
        "assigned_to_user": null,
    })
}

pub fn authorized_email_json(id: i64, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "allowed_role": role,
        "created_at": TS,
        "updated_at": TS,
    })
}

pub fn error_json(message: &str, code: &str) -> Value {
    json!({ "error": message, "code": code })
}
