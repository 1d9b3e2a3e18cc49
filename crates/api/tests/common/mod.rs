#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use mesa_db::models::authorized_email::AuthorizedEmail;
use mesa_db::repositories::AuthorizedEmailRepo;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use mesa_api::auth::USER_EMAIL_HEADER;
use mesa_api::config::ServerConfig;
use mesa_api::router::build_app_router;
use mesa_api::state::AppState;

pub const ADMIN: &str = "admin@clinic.org";
pub const TECH: &str = "tech@clinic.org";
pub const AUDITOR: &str = "auditor@clinic.org";
pub const ANA: &str = "ana@clinic.org";
pub const LUIS: &str = "luis@clinic.org";

/// A test application plus the temporary directory backing its attachments.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub storage_dir: TempDir,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build a test `ServerConfig` storing attachments under `dir`.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        attachment_dir: dir.path().to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        max_files_per_upload: 3,
        auth_cache_ttl_secs: 300,
        bootstrap_admin_emails: Vec::new(),
    }
}

/// Build the full application with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let storage_dir = tempfile::tempdir().unwrap();
    let config = test_config(&storage_dir);
    let state = AppState::new(pool, config.clone());
    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        storage_dir,
    }
}

/// Build the app with the usual cast already on the allow-list.
pub async fn build_seeded_app(pool: PgPool) -> TestApp {
    authorize(&pool, ADMIN, "admin").await;
    authorize(&pool, TECH, "technician").await;
    authorize(&pool, AUDITOR, "auditor").await;
    authorize(&pool, ANA, "user").await;
    authorize(&pool, LUIS, "user").await;
    build_test_app(pool)
}

pub async fn authorize(pool: &PgPool, email: &str, role: &str) -> AuthorizedEmail {
    AuthorizedEmailRepo::create(pool, email, role).await.unwrap()
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    as_email: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(email) = as_email {
        builder = builder.header(USER_EMAIL_HEADER, email);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_as(app: Router, uri: &str, email: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(email), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_as(
    app: Router,
    uri: &str,
    email: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(email), Some(body)).await
}

pub async fn put_json_as(
    app: Router,
    uri: &str,
    email: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(email), Some(body)).await
}

pub async fn delete_as(app: Router, uri: &str, email: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(email), None).await
}

/// Send a multipart upload of `(filename, content_type, bytes)` parts under
/// the `files` field.
pub async fn upload_as(
    app: Router,
    uri: &str,
    email: &str,
    files: &[(&str, &str, &[u8])],
) -> Response<Body> {
    const BOUNDARY: &str = "mesa-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    for (name, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; \
                 filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(USER_EMAIL_HEADER, email)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// File a ticket through the API and return its JSON.
pub async fn create_ticket(app: Router, email: &str, subject: &str) -> serde_json::Value {
    let response = post_json_as(
        app,
        "/api/tickets",
        email,
        serde_json::json!({
            "module_id": 1,
            "ticket_type_id": 2,
            "subject": subject,
            "description": format!("{subject}: details"),
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}
