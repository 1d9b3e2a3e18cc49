//! HTTP-level tests for allow-list administration.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_ticket, delete_as, get_as, post_json_as, put_json_as, ADMIN, ANA, TECH,
};
use mesa_db::repositories::{AuthorizedEmailRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn list_is_enveloped_and_sorted(pool: PgPool) {
    let app = common::build_seeded_app(pool).await;
    let json = body_json(get_as(app.app(), "/api/authorized-emails", ADMIN).await).await;

    assert_eq!(json["success"], true);
    let emails: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["email"].as_str().unwrap().to_string())
        .collect();
    let mut sorted = emails.clone();
    sorted.sort();
    assert_eq!(emails, sorted);
    assert_eq!(emails.len(), 5);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_normalizes_and_rejects_duplicates(pool: PgPool) {
    let app = common::build_seeded_app(pool).await;

    let response = post_json_as(
        app.app(),
        "/api/authorized-emails",
        ADMIN,
        json!({ "email": "  Nurse@Clinic.org ", "role": "auditor" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["email"], "nurse@clinic.org");
    assert_eq!(json["data"]["allowed_role"], "auditor");

    let response = post_json_as(
        app.app(),
        "/api/authorized-emails",
        ADMIN,
        json!({ "email": "nurse@clinic.org" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_bad_input(pool: PgPool) {
    let app = common::build_seeded_app(pool).await;

    let response = post_json_as(
        app.app(),
        "/api/authorized-emails",
        ADMIN,
        json!({ "email": "not an email" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_as(
        app.app(),
        "/api/authorized-emails",
        ADMIN,
        json!({ "email": "ok@clinic.org", "role": "root" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_role_syncs_existing_user(pool: PgPool) {
    let app = common::build_seeded_app(pool.clone()).await;
    get_as(app.app(), "/api/auth/me", ANA).await;

    let entry = AuthorizedEmailRepo::find_by_email(&pool, ANA).await.unwrap().unwrap();
    let response = put_json_as(
        app.app(),
        &format!("/api/authorized-emails/{}", entry.id),
        ADMIN,
        json!({ "role": "auditor" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["allowed_role"], "auditor");

    let user = UserRepo::find_by_email(&pool, ANA).await.unwrap().unwrap();
    assert_eq!(user.role, "auditor");

    let response = put_json_as(
        app.app(),
        "/api/authorized-emails/999999",
        ADMIN,
        json!({ "role": "user" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_returns_null_data_and_protects_self(pool: PgPool) {
    let app = common::build_seeded_app(pool.clone()).await;

    let ana = AuthorizedEmailRepo::find_by_email(&pool, ANA).await.unwrap().unwrap();
    let response = delete_as(app.app(), &format!("/api/authorized-emails/{}", ana.id), ADMIN).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["data"].is_null());

    let me = AuthorizedEmailRepo::find_by_email(&pool, ADMIN).await.unwrap().unwrap();
    let response = delete_as(app.app(), &format!("/api/authorized-emails/{}", me.id), ADMIN).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(AuthorizedEmailRepo::find_by_id(&pool, me.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn removing_a_technician_revokes_staff_standing(pool: PgPool) {
    let app = common::build_seeded_app(pool.clone()).await;
    let me = body_json(get_as(app.app(), "/api/auth/me", TECH).await).await;
    let tech_id = me["id"].clone();
    let ticket = create_ticket(app.app(), ANA, "Monitor flickers").await;

    let entry = AuthorizedEmailRepo::find_by_email(&pool, TECH).await.unwrap().unwrap();
    let response = delete_as(app.app(), &format!("/api/authorized-emails/{}", entry.id), ADMIN).await;
    assert_eq!(response.status(), StatusCode::OK);

    let user = UserRepo::find_by_email(&pool, TECH).await.unwrap().unwrap();
    assert_eq!(user.role, "user");

    let staff = body_json(get_as(app.app(), "/api/users/technicians", ADMIN).await).await;
    assert!(staff.as_array().unwrap().iter().all(|u| u["email"] != TECH));

    let response = put_json_as(
        app.app(),
        &format!("/api/tickets/{}", ticket["id"]),
        ADMIN,
        json!({ "assigned_to": tech_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_as(app.app(), "/api/auth/me", TECH).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_cannot_demote_own_entry(pool: PgPool) {
    let app = common::build_seeded_app(pool.clone()).await;
    let me = AuthorizedEmailRepo::find_by_email(&pool, ADMIN).await.unwrap().unwrap();

    let response = put_json_as(
        app.app(),
        &format!("/api/authorized-emails/{}", me.id),
        ADMIN,
        json!({ "role": "user" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    // Re-stating the current role is harmless.
    let response = put_json_as(
        app.app(),
        &format!("/api/authorized-emails/{}", me.id),
        ADMIN,
        json!({ "role": "admin" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_as(
        app.app(),
        "/api/authorized-emails/import",
        ADMIN,
        json!({
            "emails": [
                { "email": "Admin@Clinic.org", "role": "user" },
                { "email": "porter@clinic.org" },
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["summary"]["success"], 1);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["summary"]["errors"][0]["email"], ADMIN);

    let me = AuthorizedEmailRepo::find_by_email(&pool, ADMIN).await.unwrap().unwrap();
    assert_eq!(me.allowed_role, "admin");
    let response = get_as(app.app(), "/api/authorized-emails", ADMIN).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn import_upserts_and_reports_failures(pool: PgPool) {
    let app = common::build_seeded_app(pool.clone()).await;

    let response = post_json_as(
        app.app(),
        "/api/authorized-emails/import",
        ADMIN,
        json!({
            "emails": [
                { "email": "New.Doctor@Clinic.org", "role": "technician" },
                { "email": "reception@clinic.org" },
                { "email": "ana@clinic.org", "role": "auditor" },
                { "email": "broken-address", "role": "user" },
                { "email": "x@clinic.org", "role": "superuser" },
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["summary"]["total"], 5);
    assert_eq!(json["summary"]["success"], 3);
    assert_eq!(json["summary"]["failed"], 2);
    assert_eq!(json["summary"]["errors"][0]["email"], "broken-address");

    let doctor = AuthorizedEmailRepo::find_by_email(&pool, "new.doctor@clinic.org")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doctor.allowed_role, "technician");
    let reception = AuthorizedEmailRepo::find_by_email(&pool, "reception@clinic.org")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reception.allowed_role, "user");
    let ana = AuthorizedEmailRepo::find_by_email(&pool, ANA).await.unwrap().unwrap();
    assert_eq!(ana.allowed_role, "auditor");
    assert!(app.state.auth_cache.is_empty().await);

    let response = post_json_as(
        app.app(),
        "/api/authorized-emails/import",
        ADMIN,
        json!({ "emails": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
