//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app.app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["storage_ready"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_attachment_dir_degrades_health(pool: PgPool) {
    let app = common::build_test_app(pool);
    std::fs::remove_dir_all(app.storage_dir.path()).unwrap();

    let json = body_json(get(app.app(), "/health").await).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["storage_ready"], false);
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app.app(), "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn catalogs_are_served(pool: PgPool) {
    let app = common::build_seeded_app(pool).await;

    let modules = body_json(common::get_as(app.app(), "/api/modules", common::ANA).await).await;
    assert_eq!(modules.as_array().unwrap().len(), 3);
    assert_eq!(modules[0]["label"], "HIS - Asistencial");

    let types = body_json(common::get_as(app.app(), "/api/ticket-types", common::ANA).await).await;
    assert_eq!(types.as_array().unwrap().len(), 5);
}
