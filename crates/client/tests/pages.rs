mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use common::*;
use mesa_client::dto::{TicketQuery, UpdateTicket};
use mesa_client::pages::NO_VALID_EMAILS;
use mesa_client::{AuthorizedEmailsPage, ClientError, TicketBoard, UploadFile};
use mesa_core::ticket::NewTicketForm;
use serde_json::{json, Value};

fn form(description: &str) -> NewTicketForm {
    NewTicketForm {
        module_id: Some(1),
        ticket_type_id: Some(2),
        subject: String::new(),
        description: description.into(),
        priority: None,
        files: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Ticket board
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_description_is_rejected_before_any_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/api/tickets",
            post(|State(calls): State<Arc<AtomicUsize>>| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                StatusCode::CREATED
            }),
        )
        .with_state(calls.clone());
    let base = serve(router).await;
    let mut board = TicketBoard::new(client_as(&base, ANA));

    let err = board.create(form("   "), Vec::new()).await.unwrap_err();

    let ClientError::Validation(fields) = err else {
        panic!("expected a validation error");
    };
    assert!(fields.contains_key("description"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(board.tickets.is_empty());
}

#[tokio::test]
async fn rejected_files_are_reported_per_index() {
    let base = serve(Router::new()).await;
    let mut board = TicketBoard::new(client_as(&base, ANA));
    let files = vec![UploadFile {
        name: "run.exe".into(),
        mime_type: "application/x-msdownload".into(),
        bytes: vec![0; 4],
    }];

    let err = board.create(form("Printer down"), files).await.unwrap_err();
    assert_matches!(err, ClientError::Validation(fields) if fields.contains_key("file_0"));
}

#[tokio::test]
async fn created_ticket_is_prepended_even_if_upload_fails() {
    let router = Router::new()
        .route(
            "/api/tickets",
            get(|| async { Json(json!([ticket_json(1, ANA, "Old one", "open")])) }).post(
                |Json(body): Json<Value>| async move {
                    assert!(body.get("subject").is_none());
                    assert_eq!(body["description"], "Scanner offline");
                    (
                        StatusCode::CREATED,
                        Json(ticket_json(2, ANA, "Scanner offline", "open")),
                    )
                },
            ),
        )
        .route(
            "/api/tickets/{id}/attachments",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
    let base = serve(router).await;
    let mut board = TicketBoard::new(client_as(&base, ANA));
    board.fetch(&TicketQuery::default()).await.unwrap();

    let files = vec![UploadFile {
        name: "error.png".into(),
        mime_type: "image/png".into(),
        bytes: vec![1, 2, 3],
    }];
    let ticket = board.create(form("  Scanner offline "), files).await.unwrap();

    assert_eq!(ticket.id, 2);
    let ids: Vec<_> = board.tickets.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(board.error.is_none());
    assert_eq!(board.stats().open, 2);
    assert_eq!(board.stats().mine, 2);
}

#[tokio::test]
async fn update_replaces_and_delete_removes() {
    let router = Router::new()
        .route(
            "/api/tickets",
            get(|| async {
                Json(json!([
                    ticket_json(1, ANA, "First", "open"),
                    ticket_json(2, ANA, "Second", "open"),
                ]))
            }),
        )
        .route(
            "/api/tickets/{id}",
            axum::routing::put(|Path(id): Path<i64>| async move {
                Json(ticket_json(id, ANA, "First", "in_progress"))
            })
            .delete(|| async { StatusCode::NO_CONTENT }),
        );
    let base = serve(router).await;
    let mut board = TicketBoard::new(client_as(&base, ANA));
    board.fetch(&TicketQuery::default()).await.unwrap();

    let change = UpdateTicket {
        status: Some("in_progress".into()),
        ..Default::default()
    };
    board.update(1, &change).await.unwrap();
    assert_eq!(board.tickets[0].status, "in_progress");
    assert_eq!(board.stats().in_progress, 1);

    board.delete(2).await.unwrap();
    assert_eq!(board.tickets.len(), 1);
    assert_eq!(board.recent().len(), 1);
}

#[tokio::test]
async fn failed_fetch_sets_the_error_banner() {
    let router = Router::new().route(
        "/api/tickets",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_json("An internal error occurred", "INTERNAL_ERROR")),
            )
        }),
    );
    let base = serve(router).await;
    let mut board = TicketBoard::new(client_as(&base, ANA));

    assert!(board.fetch(&TicketQuery::default()).await.is_err());
    assert_eq!(board.error.as_deref(), Some("An internal error occurred"));
}

// ---------------------------------------------------------------------------
// Authorized e-mails page
// ---------------------------------------------------------------------------

type Rows = Arc<Mutex<Vec<Value>>>;

/// Minimal in-memory allow-list API.
async fn allow_list_server(initial: Vec<Value>) -> (String, Rows) {
    let rows: Rows = Arc::new(Mutex::new(initial));
    let router = Router::new()
        .route(
            "/api/authorized-emails",
            get(|State(rows): State<Rows>| async move {
                let data = rows.lock().unwrap().clone();
                Json(json!({ "success": true, "data": data }))
            }),
        )
        .route(
            "/api/authorized-emails/{id}",
            delete(|State(rows): State<Rows>, Path(id): Path<i64>| async move {
                rows.lock().unwrap().retain(|r| r["id"] != id);
                Json(json!({ "success": true, "data": null }))
            }),
        )
        .route(
            "/api/authorized-emails/import",
            post(|State(rows): State<Rows>, Json(body): Json<Value>| async move {
                let entries = body["emails"].as_array().cloned().unwrap_or_default();
                let mut rows = rows.lock().unwrap();
                for entry in &entries {
                    let id = rows.len() as i64 + 100;
                    rows.push(authorized_email_json(
                        id,
                        entry["email"].as_str().unwrap(),
                        entry["role"].as_str().unwrap(),
                    ));
                }
                Json(json!({
                    "success": true,
                    "summary": {"total": entries.len(), "success": entries.len(),
                                "failed": 0, "errors": []},
                }))
            }),
        )
        .with_state(rows.clone());
    (serve(router).await, rows)
}

#[tokio::test]
async fn deleting_an_email_removes_its_row() {
    let (base, _) = allow_list_server(vec![
        authorized_email_json(1, ADMIN, "admin"),
        authorized_email_json(2, ANA, "user"),
    ])
    .await;
    let mut page = AuthorizedEmailsPage::new(client_as(&base, ADMIN));
    page.load().await.unwrap();
    assert_eq!(page.rows.len(), 2);

    page.delete(2).await.unwrap();

    assert_eq!(page.rows.len(), 1);
    assert!(page.rows.iter().all(|r| r.email != ANA));
    assert!(page.success.is_some());
}

#[tokio::test]
async fn import_with_nothing_usable_shows_an_error() {
    let (base, rows) = allow_list_server(Vec::new()).await;
    let mut page = AuthorizedEmailsPage::new(client_as(&base, ADMIN));

    let err = page.import_text("\n  header only\n").await.unwrap_err();

    assert_matches!(err, ClientError::Validation(_));
    assert_eq!(page.error.as_deref(), Some(NO_VALID_EMAILS));
    assert!(rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn import_defaults_missing_roles_to_user_and_reloads() {
    let (base, _) = allow_list_server(Vec::new()).await;
    let mut page = AuthorizedEmailsPage::new(client_as(&base, ADMIN));

    let summary = page.import_text("a@b.com,admin\nc@d.com").await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[0].allowed_role, "admin");
    assert_eq!(page.rows[1].email, "c@d.com");
    assert_eq!(page.rows[1].allowed_role, "user");
    assert!(page.error.is_none());
}

#[tokio::test]
async fn forbidden_add_sets_the_error_banner() {
    let router = Router::new().route(
        "/api/authorized-emails",
        post(|| async {
            (
                StatusCode::FORBIDDEN,
                Json(error_json("Admin role required", "FORBIDDEN")),
            )
        }),
    );
    let base = serve(router).await;
    let mut page = AuthorizedEmailsPage::new(client_as(&base, ANA));

    let err = page.add("new@clinic.org", "user").await.unwrap_err();
    assert_matches!(err, ClientError::Unauthorized { .. });
    assert_eq!(page.error.as_deref(), Some("Admin role required"));
    assert!(page.rows.is_empty());
}
