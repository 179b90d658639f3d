//! Integration tests for the invitation lifecycle.
//!
//! These tests require a PostgreSQL database pointed to by
//! `TEST_DATABASE_URL` and are ignored by default. Run them with:
//!
//! ```sh
//! TEST_DATABASE_URL=postgres://... cargo test -p taskboard-api -- --ignored
//! ```

mod common;

use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use common::*;

#[tokio::test]
#[ignore]
async fn test_issue_and_verify_invitation() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let admin = login_seeded_user(&app, &pool, "admin").await;
    let invitee = unique_test_email();

    let invitation = issue_invitation(&app, &admin, &invitee, None).await;

    let token = invitation["token"].as_str().unwrap();
    assert_eq!(invitation["email"].as_str().unwrap(), invitee);
    assert_eq!(invitation["role"].as_str().unwrap(), "member");
    assert!(invitation["invitation_url"]
        .as_str()
        .unwrap()
        .contains(&format!("/login?token={}", token)));

    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/invitations/verify?token={}",
            token
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["status"].as_str().unwrap(), "valid");
    assert_eq!(body["email"].as_str().unwrap(), invitee);
    assert_eq!(body["role"].as_str().unwrap(), "member");
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_invitation_expires_exactly_seven_days_after_creation() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let admin = login_seeded_user(&app, &pool, "admin").await;
    let invitation = issue_invitation(&app, &admin, &unique_test_email(), None).await;
    let id: uuid::Uuid = invitation["id"].as_str().unwrap().parse().unwrap();

    let (secs,): (f64,) = sqlx::query_as(
        "SELECT EXTRACT(EPOCH FROM (expires_at - created_at))::float8 FROM invitations WHERE id = $1",
    )
    .bind(id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(secs, 7.0 * 24.0 * 3600.0);
}

#[tokio::test]
#[ignore]
async fn test_verify_unknown_token_returns_not_found_status() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    // Well-formed but never issued
    let token = shared::token::generate_invitation_token();

    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/invitations/verify?token={}",
            token
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["status"].as_str().unwrap(), "not_found");
    assert!(body["email"].is_null());
    assert!(body["expires_at"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_verify_empty_and_malformed_tokens() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    for uri in [
        "/api/v1/invitations/verify?token=",
        "/api/v1/invitations/verify",
        "/api/v1/invitations/verify?token=%21%21%21",
        "/api/v1/invitations/verify?token=short",
    ] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "uri: {}", uri);

        let body = parse_response_body(response).await;
        assert_eq!(body["status"].as_str().unwrap(), "not_found", "uri: {}", uri);
    }
}

#[tokio::test]
#[ignore]
async fn test_register_consumes_invitation() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let admin = login_seeded_user(&app, &pool, "admin").await;
    let invitee = unique_test_email();
    let invitation = issue_invitation(&app, &admin, &invitee, None).await;
    let token = invitation["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            serde_json::json!({ "token": token, "password": "SecureP@ss123!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    assert_eq!(body["email"].as_str().unwrap(), invitee);
    assert!(body["tokens"]["access_token"].is_string());

    // The invitation is now spent
    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/invitations/verify?token={}",
            token
        )))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["status"].as_str().unwrap(), "already_used");

    // A second registration with the same token is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            serde_json::json!({ "token": token, "password": "AnotherP@ss123!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_weak_password_without_spending_invitation() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let admin = login_seeded_user(&app, &pool, "admin").await;
    let invitation = issue_invitation(&app, &admin, &unique_test_email(), None).await;
    let token = invitation["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            serde_json::json!({ "token": token, "password": "weak" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The invitation is still usable
    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/invitations/verify?token={}",
            token
        )))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["status"].as_str().unwrap(), "valid");
}

#[tokio::test]
#[ignore]
async fn test_expired_invitation_cannot_be_used() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let admin = login_seeded_user(&app, &pool, "admin").await;
    let invitation = issue_invitation(&app, &admin, &unique_test_email(), None).await;
    let id: uuid::Uuid = invitation["id"].as_str().unwrap().parse().unwrap();
    let token = invitation["token"].as_str().unwrap().to_string();

    sqlx::query("UPDATE invitations SET expires_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/invitations/verify?token={}",
            token
        )))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["status"].as_str().unwrap(), "expired");

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            serde_json::json!({ "token": token, "password": "SecureP@ss123!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_used_wins_over_expired() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let admin = login_seeded_user(&app, &pool, "admin").await;
    let invitation = issue_invitation(&app, &admin, &unique_test_email(), None).await;
    let id: uuid::Uuid = invitation["id"].as_str().unwrap().parse().unwrap();
    let token = invitation["token"].as_str().unwrap().to_string();

    sqlx::query(
        "UPDATE invitations SET used = true, expires_at = NOW() - INTERVAL '1 hour' WHERE id = $1",
    )
    .bind(id)
    .execute(&pool)
    .await
    .unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/invitations/verify?token={}",
            token
        )))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["status"].as_str().unwrap(), "already_used");
}

#[tokio::test]
#[ignore]
async fn test_list_and_delete_invitations() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let admin = login_seeded_user(&app, &pool, "admin").await;
    let invitee = unique_test_email();
    let invitation = issue_invitation(&app, &admin, &invitee, Some("admin")).await;
    let id = invitation["id"].as_str().unwrap().to_string();
    let token = invitation["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get_request_with_auth(
            "/api/v1/admin/invitations?limit=100",
            &admin.access_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    let listed = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"].as_str() == Some(&id))
        .expect("Issued invitation missing from listing");
    assert_eq!(listed["email"].as_str().unwrap(), invitee);
    assert_eq!(listed["role"].as_str().unwrap(), "admin");

    let response = app
        .clone()
        .oneshot(delete_request_with_auth(
            &format!("/api/v1/admin/invitations/{}", id),
            &admin.access_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The deleted invitation is gone from the listing
    let response = app
        .clone()
        .oneshot(get_request_with_auth(
            "/api/v1/admin/invitations?limit=100",
            &admin.access_token,
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|i| i["id"].as_str() != Some(&id)));

    // And its token no longer resolves
    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/invitations/verify?token={}",
            token
        )))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["status"].as_str().unwrap(), "not_found");

    // Deleting again answers 404
    let response = app
        .clone()
        .oneshot(delete_request_with_auth(
            &format!("/api/v1/admin/invitations/{}", id),
            &admin.access_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_cleanup_retains_recently_expired_invitations() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let admin = login_seeded_user(&app, &pool, "admin").await;

    let recent = issue_invitation(&app, &admin, &unique_test_email(), None).await;
    let recent_id: uuid::Uuid = recent["id"].as_str().unwrap().parse().unwrap();
    let recent_token = recent["token"].as_str().unwrap().to_string();

    let stale = issue_invitation(&app, &admin, &unique_test_email(), None).await;
    let stale_id: uuid::Uuid = stale["id"].as_str().unwrap().parse().unwrap();
    let stale_token = stale["token"].as_str().unwrap().to_string();

    sqlx::query("UPDATE invitations SET expires_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(recent_id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE invitations SET expires_at = NOW() - INTERVAL '8 days' WHERE id = $1")
        .bind(stale_id)
        .execute(&pool)
        .await
        .unwrap();

    let repo = persistence::repositories::InvitationRepository::new(pool.clone());
    repo.delete_expired().await.unwrap();

    // Inside the retention window the more specific answer survives
    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/invitations/verify?token={}",
            recent_token
        )))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["status"].as_str().unwrap(), "expired");

    // Past the window the row is gone
    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/invitations/verify?token={}",
            stale_token
        )))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["status"].as_str().unwrap(), "not_found");
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_manage_invitations() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let member = login_seeded_user(&app, &pool, "member").await;

    let response = app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/admin/invitations",
            serde_json::json!({ "email": unique_test_email() }),
            &member.access_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get_request_with_auth(
            "/api/v1/admin/invitations",
            &member.access_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_invitation_requires_authentication() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/admin/invitations",
            serde_json::json!({ "email": unique_test_email() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
