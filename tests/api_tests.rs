//! End-to-end API tests driving the full router through axum-test.

use axum_test::TestServer;
use rstest::rstest;
use serde_json::json;
use shoprate::{api::routes::create_router, auth::AuthService, db::DbClient, AppState, Role};
use std::sync::Arc;

const TEST_SECRET: &str = "integration-test-secret-32-chars!";

async fn create_test_state() -> AppState {
    let db = Arc::new(
        DbClient::new_memory()
            .await
            .expect("Failed to create in-memory database"),
    );
    let auth_service = Arc::new(AuthService::new(TEST_SECRET.to_string(), 3600));

    AppState { db, auth_service }
}

async fn create_test_server() -> (TestServer, AppState) {
    let state = create_test_state().await;
    let server = TestServer::new(create_router(state.clone())).unwrap();
    (server, state)
}

/// Creates an account with the given role directly in the database and
/// returns (user_id, token).
async fn seed_account(state: &AppState, name: &str, email: &str, role: Role) -> (String, String) {
    let hash = state
        .auth_service
        .hash_password("password123")
        .expect("hash");
    let user = state
        .db
        .create_user(name, email, "1 Seed Street", &hash, role)
        .await
        .expect("seed user");
    let token = state
        .auth_service
        .issue_token(&user.id, role)
        .expect("token");
    (user.id, token)
}

async fn seed_store(state: &AppState, owner_id: &str, name: &str) -> String {
    state
        .db
        .create_store(owner_id, name, "store@example.com", "2 Shop Street", None)
        .await
        .expect("seed store")
        .id
}

// ============= Health =============

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

// ============= Auth =============

#[tokio::test]
async fn test_register_then_duplicate_email_rejected() {
    let (server, _) = create_test_server().await;

    let body = json!({
        "name": "A",
        "email": "a@x.com",
        "address": "addr",
        "password": "pw"
    });

    let response = server.post("/api/auth/register").json(&body).await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let json: serde_json::Value = response.json();
    assert!(json["token"].is_string());
    assert_eq!(json["user"]["role"], "user");
    assert!(
        json["user"].get("passwordHash").is_none() && json["user"].get("password_hash").is_none(),
        "password hash must never be returned"
    );

    // Identical second registration
    let response = server.post("/api/auth/register").json(&body).await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "Email already registered");
}

#[tokio::test]
async fn test_register_missing_field_rejected() {
    let (server, state) = create_test_server().await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({"name": "A", "email": "a@x.com", "password": "pw"}))
        .await;

    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "All fields are required");

    // Nothing was written
    assert_eq!(state.db.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn test_login_flows() {
    let (server, _) = create_test_server().await;

    server
        .post("/api/auth/register")
        .json(&json!({
            "name": "B",
            "email": "b@x.com",
            "address": "addr",
            "password": "secret-pw"
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    // Success
    let response = server
        .post("/api/auth/login")
        .json(&json!({"email": "b@x.com", "password": "secret-pw"}))
        .await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert!(json["token"].is_string());

    // Unknown email
    server
        .post("/api/auth/login")
        .json(&json!({"email": "nobody@x.com", "password": "secret-pw"}))
        .await
        .assert_status_not_found();

    // Wrong password
    server
        .post("/api/auth/login")
        .json(&json!({"email": "b@x.com", "password": "wrong"}))
        .await
        .assert_status_unauthorized();
}

// ============= Auth middleware =============

#[tokio::test]
async fn test_protected_route_without_token_is_401() {
    let (server, _) = create_test_server().await;

    let response = server.get("/api/store").add_query_param("name", "foo").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_malformed_authorization_header_is_401() {
    let (server, _) = create_test_server().await;

    let response = server
        .get("/api/store")
        .add_header("authorization", "Token abc123")
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_invalid_token_is_403() {
    let (server, _) = create_test_server().await;

    let response = server
        .get("/api/store")
        .authorization_bearer("not.a.token")
        .await;
    response.assert_status_forbidden();
}

#[tokio::test]
async fn test_user_token_rejected_on_admin_routes() {
    let (server, state) = create_test_server().await;
    let (_, user_token) = seed_account(&state, "Plain", "plain@x.com", Role::User).await;

    for path in [
        "/api/user",
        "/api/admin/dashboard",
        "/api/admin/users",
        "/api/admin/stores",
    ] {
        let response = server.get(path).authorization_bearer(&user_token).await;
        response.assert_status_forbidden();
    }
}

// ============= Ratings =============

#[rstest]
#[case(0)]
#[case(6)]
#[case(-3)]
#[tokio::test]
async fn test_out_of_range_rating_rejected(#[case] score: i64) {
    let (server, state) = create_test_server().await;
    let (owner_id, _) = seed_account(&state, "Owner", "owner@x.com", Role::Owner).await;
    let (user_id, token) = seed_account(&state, "Rater", "rater@x.com", Role::User).await;
    let store_id = seed_store(&state, &owner_id, "S1").await;

    let response = server
        .post("/api/rating")
        .authorization_bearer(&token)
        .json(&json!({"storeId": store_id, "rating": score, "userId": user_id}))
        .await;

    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "Rating must be between 1 and 5");

    // No row was written
    assert_eq!(state.db.count_ratings().await.unwrap(), 0);
}

#[tokio::test]
async fn test_rating_for_missing_store_is_404() {
    let (server, state) = create_test_server().await;
    let (_, token) = seed_account(&state, "Rater", "rater@x.com", Role::User).await;

    let response = server
        .post("/api/rating")
        .authorization_bearer(&token)
        .json(&json!({"storeId": "no-such-store", "rating": 4}))
        .await;

    response.assert_status_not_found();
    assert_eq!(state.db.count_ratings().await.unwrap(), 0);
}

#[tokio::test]
async fn test_rating_lifecycle_and_stats() {
    let (server, state) = create_test_server().await;
    let (owner_id, _) = seed_account(&state, "Owner", "owner@x.com", Role::Owner).await;
    let (_, token1) = seed_account(&state, "Rater1", "r1@x.com", Role::User).await;
    let (_, token2) = seed_account(&state, "Rater2", "r2@x.com", Role::User).await;
    let store_id = seed_store(&state, &owner_id, "Rated").await;

    // Stats before any rating exists
    server
        .get(&format!("/api/rating/stats/{}", store_id))
        .authorization_bearer(&token1)
        .await
        .assert_status_not_found();

    let response = server
        .post("/api/rating")
        .authorization_bearer(&token1)
        .json(&json!({"storeId": store_id, "rating": 4, "comment": "good"}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    let rating_id = created["id"].as_str().unwrap().to_string();

    server
        .post("/api/rating")
        .authorization_bearer(&token2)
        .json(&json!({"storeId": store_id, "rating": 5}))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    // Two-decimal mean and count
    let response = server
        .get(&format!("/api/rating/stats/{}", store_id))
        .authorization_bearer(&token1)
        .await;
    response.assert_status_ok();
    let stats: serde_json::Value = response.json();
    assert_eq!(stats["averageRating"], "4.50");
    assert_eq!(stats["totalRatings"], 2);

    // Listing joins rater and store
    let response = server
        .get("/api/rating")
        .add_query_param("storeId", &store_id)
        .authorization_bearer(&token1)
        .await;
    response.assert_status_ok();
    let listed: serde_json::Value = response.json();
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert!(listed[0]["user"]["name"].is_string());
    assert_eq!(listed[0]["store"]["id"], store_id.as_str());

    // Edit in place
    let response = server
        .put(&format!("/api/rating/{}", rating_id))
        .authorization_bearer(&token1)
        .json(&json!({"rating": 2, "comment": "changed"}))
        .await;
    response.assert_status_ok();

    let response = server
        .get(&format!("/api/rating/stats/{}", store_id))
        .authorization_bearer(&token1)
        .await;
    let stats: serde_json::Value = response.json();
    assert_eq!(stats["averageRating"], "3.50");
}

#[tokio::test]
async fn test_update_missing_rating_is_404() {
    let (server, state) = create_test_server().await;
    let (_, token) = seed_account(&state, "Rater", "rater@x.com", Role::User).await;

    let response = server
        .put("/api/rating/no-such-rating")
        .authorization_bearer(&token)
        .json(&json!({"rating": 3}))
        .await;

    response.assert_status_not_found();
}

// ============= Stores =============

#[tokio::test]
async fn test_store_listing_reports_null_average_for_unrated() {
    let (server, state) = create_test_server().await;
    let (owner_id, token) = seed_account(&state, "Owner", "owner@x.com", Role::Owner).await;
    seed_store(&state, &owner_id, "Quiet").await;

    let response = server.get("/api/store").authorization_bearer(&token).await;
    response.assert_status_ok();
    let stores: serde_json::Value = response.json();
    assert_eq!(stores.as_array().unwrap().len(), 1);
    assert!(stores[0]["averageRating"].is_null());
    assert_eq!(stores[0]["totalRatings"], 0);
}

#[tokio::test]
async fn test_store_substring_filter() {
    let (server, state) = create_test_server().await;
    let (owner_id, token) = seed_account(&state, "Owner", "owner@x.com", Role::Owner).await;
    seed_store(&state, &owner_id, "Coffee Corner").await;
    seed_store(&state, &owner_id, "Book Nook").await;

    let response = server
        .get("/api/store")
        .add_query_param("name", "coffee")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let stores: serde_json::Value = response.json();
    assert_eq!(stores.as_array().unwrap().len(), 1);
    assert_eq!(stores[0]["name"], "Coffee Corner");
}

#[tokio::test]
async fn test_create_store_requires_existing_owner() {
    let (server, state) = create_test_server().await;
    let (owner_id, token) = seed_account(&state, "Owner", "owner@x.com", Role::Owner).await;

    // Missing field
    server
        .post("/api/store")
        .authorization_bearer(&token)
        .json(&json!({"name": "Incomplete", "email": "i@x.com"}))
        .await
        .assert_status_bad_request();

    // Unknown owner
    server
        .post("/api/store")
        .authorization_bearer(&token)
        .json(&json!({
            "name": "Orphan", "address": "a", "email": "o@x.com", "ownerId": "ghost"
        }))
        .await
        .assert_status_not_found();

    // Valid
    let response = server
        .post("/api/store")
        .authorization_bearer(&token)
        .json(&json!({
            "name": "Real", "address": "a", "email": "r@x.com", "ownerId": owner_id
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let store: serde_json::Value = response.json();
    assert_eq!(store["ownerId"], owner_id.as_str());
}

#[tokio::test]
async fn test_plain_user_cannot_create_store() {
    let (server, state) = create_test_server().await;
    let (user_id, token) = seed_account(&state, "Plain", "plain@x.com", Role::User).await;

    server
        .post("/api/store")
        .authorization_bearer(&token)
        .json(&json!({
            "name": "Nope", "address": "a", "email": "n@x.com", "ownerId": user_id
        }))
        .await
        .assert_status_forbidden();
}

#[tokio::test]
async fn test_update_store_enforces_ownership() {
    let (server, state) = create_test_server().await;
    let (owner1_id, _) = seed_account(&state, "Owner1", "o1@x.com", Role::Owner).await;
    let (_, owner2_token) = seed_account(&state, "Owner2", "o2@x.com", Role::Owner).await;
    let (_, admin_token) = seed_account(&state, "Admin", "admin@x.com", Role::Admin).await;
    let store1 = seed_store(&state, &owner1_id, "S1").await;

    // Owner of S2 (not S1) is forbidden
    server
        .put(&format!("/api/store/{}", store1))
        .authorization_bearer(&owner2_token)
        .json(&json!({"name": "Hijacked"}))
        .await
        .assert_status_forbidden();

    // Admin may update anyone's store
    let response = server
        .put(&format!("/api/store/{}", store1))
        .authorization_bearer(&admin_token)
        .json(&json!({"name": "Renamed", "image": "http://img.example/s.png"}))
        .await;
    response.assert_status_ok();
    let store: serde_json::Value = response.json();
    assert_eq!(store["name"], "Renamed");
    assert_eq!(store["image"], "http://img.example/s.png");
}

#[tokio::test]
async fn test_delete_store_cascades_and_enforces_ownership() {
    let (server, state) = create_test_server().await;
    let (owner1_id, owner1_token) = seed_account(&state, "Owner1", "o1@x.com", Role::Owner).await;
    let (_, owner2_token) = seed_account(&state, "Owner2", "o2@x.com", Role::Owner).await;
    let (rater_id, _) = seed_account(&state, "Rater", "rater@x.com", Role::User).await;
    let store1 = seed_store(&state, &owner1_id, "Doomed").await;

    state
        .db
        .create_rating(&rater_id, &store1, 3, None)
        .await
        .expect("seed rating");

    // Unrelated owner cannot delete
    server
        .delete(&format!("/api/store/{}", store1))
        .authorization_bearer(&owner2_token)
        .await
        .assert_status_forbidden();

    // The store's owner can; ratings go with it
    let response = server
        .delete(&format!("/api/store/{}", store1))
        .authorization_bearer(&owner1_token)
        .await;
    response.assert_status_ok();

    server
        .get(&format!("/api/store/{}", store1))
        .authorization_bearer(&owner1_token)
        .await
        .assert_status_not_found();
    assert_eq!(state.db.count_ratings().await.unwrap(), 0);

    // Deleting again is a 404
    server
        .delete(&format!("/api/store/{}", store1))
        .authorization_bearer(&owner1_token)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_stores_by_owner_self_admin_and_forbidden() {
    let (server, state) = create_test_server().await;
    let (owner1_id, owner1_token) = seed_account(&state, "Owner1", "o1@x.com", Role::Owner).await;
    let (_, owner2_token) = seed_account(&state, "Owner2", "o2@x.com", Role::Owner).await;
    let (_, admin_token) = seed_account(&state, "Admin", "admin@x.com", Role::Admin).await;
    seed_store(&state, &owner1_id, "Mine").await;

    // Self
    let response = server
        .get(&format!("/api/store/owner/{}", owner1_id))
        .authorization_bearer(&owner1_token)
        .await;
    response.assert_status_ok();
    let stores: serde_json::Value = response.json();
    assert_eq!(stores.as_array().unwrap().len(), 1);

    // Another owner is forbidden
    let response = server
        .get(&format!("/api/store/owner/{}", owner1_id))
        .authorization_bearer(&owner2_token)
        .await;
    response.assert_status_forbidden();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "Forbidden: You can only view your own stores");

    // Admin bypass
    server
        .get(&format!("/api/store/owner/{}", owner1_id))
        .authorization_bearer(&admin_token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_owner_store_ratings() {
    let (server, state) = create_test_server().await;
    let (owner_id, owner_token) = seed_account(&state, "Owner", "owner@x.com", Role::Owner).await;
    let (rater_id, user_token) = seed_account(&state, "Rater", "rater@x.com", Role::User).await;
    let store_id = seed_store(&state, &owner_id, "Mine").await;

    state
        .db
        .create_rating(&rater_id, &store_id, 5, Some("great"))
        .await
        .expect("seed rating");

    let response = server
        .get(&format!("/api/store/{}/ratings", owner_id))
        .authorization_bearer(&owner_token)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body[0]["storeId"], store_id.as_str());
    assert_eq!(body[0]["ratings"][0]["user"]["name"], "Rater");

    // A user owning no stores yields 404
    let response = server
        .get(&format!("/api/store/{}/ratings", rater_id))
        .authorization_bearer(&user_token)
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_get_store_detail() {
    let (server, state) = create_test_server().await;
    let (owner_id, token) = seed_account(&state, "Owner", "owner@x.com", Role::Owner).await;
    let (rater_id, _) = seed_account(&state, "Rater", "rater@x.com", Role::User).await;
    let store_id = seed_store(&state, &owner_id, "Detailed").await;

    state
        .db
        .create_rating(&rater_id, &store_id, 4, None)
        .await
        .expect("seed rating");

    let response = server
        .get(&format!("/api/store/{}", store_id))
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["owner"]["id"], owner_id.as_str());
    assert_eq!(detail["averageRating"], 4.0);
    assert_eq!(detail["ratings"].as_array().unwrap().len(), 1);
}

// ============= Users =============

#[tokio::test]
async fn test_password_update_requires_value_and_takes_effect() {
    let (server, _) = create_test_server().await;

    server
        .post("/api/auth/register")
        .json(&json!({
            "name": "C", "email": "c@x.com", "address": "addr", "password": "old-pw"
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let login: serde_json::Value = server
        .post("/api/auth/login")
        .json(&json!({"email": "c@x.com", "password": "old-pw"}))
        .await
        .json();
    let token = login["token"].as_str().unwrap().to_string();

    // Empty password rejected
    let response = server
        .put("/api/user/password")
        .authorization_bearer(&token)
        .json(&json!({"newPassword": ""}))
        .await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "New password is required");

    // Valid change
    server
        .put("/api/user/password")
        .authorization_bearer(&token)
        .json(&json!({"newPassword": "new-pw"}))
        .await
        .assert_status_ok();

    // Old password no longer works, new one does
    server
        .post("/api/auth/login")
        .json(&json!({"email": "c@x.com", "password": "old-pw"}))
        .await
        .assert_status_unauthorized();
    server
        .post("/api/auth/login")
        .json(&json!({"email": "c@x.com", "password": "new-pw"}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_admin_user_listing_filters_and_sorting() {
    let (server, state) = create_test_server().await;
    let (_, admin_token) = seed_account(&state, "Admin", "admin@x.com", Role::Admin).await;
    seed_account(&state, "Alice", "alice@x.com", Role::User).await;
    seed_account(&state, "Bob", "bob@x.com", Role::Owner).await;

    let response = server
        .get("/api/user")
        .add_query_param("role", "owner")
        .authorization_bearer(&admin_token)
        .await;
    response.assert_status_ok();
    let users: serde_json::Value = response.json();
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["name"], "Bob");

    let response = server
        .get("/api/user")
        .add_query_param("sortKey", "name")
        .add_query_param("sortOrder", "asc")
        .authorization_bearer(&admin_token)
        .await;
    response.assert_status_ok();
    let users: serde_json::Value = response.json();
    assert_eq!(users[0]["name"], "Admin");
    assert_eq!(users[2]["name"], "Bob");

    // Unknown sort key is rejected, not interpolated
    server
        .get("/api/user")
        .add_query_param("sortKey", "password_hash")
        .authorization_bearer(&admin_token)
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_admin_get_and_update_user() {
    let (server, state) = create_test_server().await;
    let (_, admin_token) = seed_account(&state, "Admin", "admin@x.com", Role::Admin).await;
    let (user_id, _) = seed_account(&state, "Target", "target@x.com", Role::User).await;

    server
        .get("/api/user/no-such-user")
        .authorization_bearer(&admin_token)
        .await
        .assert_status_not_found();

    let response = server
        .get(&format!("/api/user/{}", user_id))
        .authorization_bearer(&admin_token)
        .await;
    response.assert_status_ok();
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["email"], "target@x.com");
    assert!(detail["stores"].is_array());
    assert!(detail["ratings"].is_array());

    // Partial update: only the role changes
    let response = server
        .put(&format!("/api/user/{}", user_id))
        .authorization_bearer(&admin_token)
        .json(&json!({"role": "owner"}))
        .await;
    response.assert_status_ok();
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["role"], "owner");
    assert_eq!(updated["name"], "Target");

    // Invalid role is rejected
    server
        .put(&format!("/api/user/{}", user_id))
        .authorization_bearer(&admin_token)
        .json(&json!({"role": "superuser"}))
        .await
        .assert_status_bad_request();
}

// ============= Admin =============

#[tokio::test]
async fn test_admin_dashboard_counts() {
    let (server, state) = create_test_server().await;
    let (_, admin_token) = seed_account(&state, "Admin", "admin@x.com", Role::Admin).await;
    let (owner_id, _) = seed_account(&state, "Owner", "owner@x.com", Role::Owner).await;
    let (rater_id, _) = seed_account(&state, "Rater", "rater@x.com", Role::User).await;
    let store_id = seed_store(&state, &owner_id, "Counted").await;
    state
        .db
        .create_rating(&rater_id, &store_id, 5, None)
        .await
        .expect("seed rating");

    let response = server
        .get("/api/admin/dashboard")
        .authorization_bearer(&admin_token)
        .await;
    response.assert_status_ok();
    let stats: serde_json::Value = response.json();
    assert_eq!(stats["totalUsers"], 3);
    assert_eq!(stats["totalStores"], 1);
    assert_eq!(stats["totalRatings"], 1);
}

#[tokio::test]
async fn test_admin_add_user() {
    let (server, state) = create_test_server().await;
    let (_, admin_token) = seed_account(&state, "Admin", "admin@x.com", Role::Admin).await;

    let response = server
        .post("/api/admin/users")
        .authorization_bearer(&admin_token)
        .json(&json!({
            "name": "New Owner", "email": "no@x.com", "password": "pw",
            "address": "addr", "role": "owner"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let user: serde_json::Value = response.json();
    assert_eq!(user["role"], "owner");

    // Email taken
    let response = server
        .post("/api/admin/users")
        .authorization_bearer(&admin_token)
        .json(&json!({
            "name": "Dup", "email": "no@x.com", "password": "pw",
            "address": "addr", "role": "user"
        }))
        .await;
    response.assert_status_bad_request();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "User already exists");

    // Invalid role
    server
        .post("/api/admin/users")
        .authorization_bearer(&admin_token)
        .json(&json!({
            "name": "Bad", "email": "bad@x.com", "password": "pw",
            "address": "addr", "role": "root"
        }))
        .await
        .assert_status_bad_request();

    assert_eq!(state.db.count_users().await.unwrap(), 2);
}

#[tokio::test]
async fn test_admin_user_details_owner_rating() {
    let (server, state) = create_test_server().await;
    let (_, admin_token) = seed_account(&state, "Admin", "admin@x.com", Role::Admin).await;
    let (owner_id, _) = seed_account(&state, "Owner", "owner@x.com", Role::Owner).await;
    let (rater_id, _) = seed_account(&state, "Rater", "rater@x.com", Role::User).await;

    // Owner with no ratings reports 0
    let response = server
        .get(&format!("/api/admin/users/{}", owner_id))
        .authorization_bearer(&admin_token)
        .await;
    response.assert_status_ok();
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["rating"], 0.0);

    // Non-owner carries no rating field
    let response = server
        .get(&format!("/api/admin/users/{}", rater_id))
        .authorization_bearer(&admin_token)
        .await;
    let detail: serde_json::Value = response.json();
    assert!(detail.get("rating").is_none());

    // Rated owner reports the average
    let store_id = seed_store(&state, &owner_id, "Rated").await;
    state
        .db
        .create_rating(&rater_id, &store_id, 4, None)
        .await
        .expect("seed rating");

    let response = server
        .get(&format!("/api/admin/users/{}", owner_id))
        .authorization_bearer(&admin_token)
        .await;
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["rating"], 4.0);
}

#[tokio::test]
async fn test_admin_store_listing_uses_two_decimal_strings() {
    let (server, state) = create_test_server().await;
    let (_, admin_token) = seed_account(&state, "Admin", "admin@x.com", Role::Admin).await;
    let (owner_id, _) = seed_account(&state, "Owner", "owner@x.com", Role::Owner).await;
    let (rater_id, _) = seed_account(&state, "Rater", "rater@x.com", Role::User).await;
    let rated = seed_store(&state, &owner_id, "Rated").await;
    seed_store(&state, &owner_id, "Unrated").await;
    state
        .db
        .create_rating(&rater_id, &rated, 5, None)
        .await
        .expect("seed rating");

    let response = server
        .get("/api/admin/stores")
        .authorization_bearer(&admin_token)
        .await;
    response.assert_status_ok();
    let stores: serde_json::Value = response.json();
    let rows = stores.as_array().unwrap();
    let by_name = |name: &str| rows.iter().find(|s| s["name"] == name).unwrap();
    assert_eq!(by_name("Rated")["rating"], "5.00");
    assert_eq!(by_name("Unrated")["rating"], "0.00");
}
