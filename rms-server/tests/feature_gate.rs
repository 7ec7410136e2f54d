//! Module gate behavior: default-deny on disabled modules, owner/manager
//! bypass, and the login path that issues the tokens in the first place.

mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::{PASSWORD, TestApp, expect_data, json_body};

#[tokio::test]
async fn test_disabled_module_rejects_regular_staff() {
    let app = TestApp::spawn().await;
    // Restaurant 2 has the inventory module switched off
    let token = app.token_for("staff2", "staff", 2);

    let response = app
        .request("GET", "/api/inventory/stock", Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["code"], "E1002");
}

#[tokio::test]
async fn test_owner_and_manager_bypass_disabled_module() {
    let app = TestApp::spawn().await;

    for role in ["owner", "manager"] {
        let token = app.token_for("boss2", role, 2);
        let response = app
            .request("GET", "/api/inventory/stock", Some(&token), None)
            .await;
        assert_eq!(response.status(), StatusCode::OK, "{role} should bypass");
    }
}

#[tokio::test]
async fn test_enabled_module_admits_regular_staff() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);

    let stock =
        expect_data(app.request("GET", "/api/inventory/stock", Some(&token), None).await).await;
    assert!(!stock.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unconfigured_module_counts_as_disabled() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);

    // Wipe restaurant 1's pos flag entirely; absence must deny, not admit
    sqlx::query("DELETE FROM module_config WHERE restaurant_id = 1 AND module = 'pos'")
        .execute(&app.state.db.pool)
        .await
        .unwrap();

    let response = app.request("GET", "/api/pos/orders", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_flag_lookup_failure_denies_instead_of_erroring() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);

    // Kill the pool under the gate so the flag lookup fails outright
    app.state.db.pool.close().await;

    let response = app
        .request("GET", "/api/inventory/stock", Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["code"], "E1002");
}

#[tokio::test]
async fn test_gated_routes_require_authentication() {
    let app = TestApp::spawn().await;

    let response = app.request("GET", "/api/pos/orders", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/pos/orders", Some("not-a-jwt"), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_module_flag_listing() {
    let app = TestApp::spawn().await;
    let token = app.token_for("staff2", "staff", 2);

    let flags = expect_data(app.request("GET", "/api/modules", Some(&token), None).await).await;
    let flags = flags.as_array().unwrap();
    assert!(flags.iter().any(|f| f["module"] == "pos" && f["enabled"] == true));
    assert!(flags.iter().any(|f| f["module"] == "inventory" && f["enabled"] == false));
}

#[tokio::test]
async fn test_login_issues_usable_token() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "waiter1", "password": PASSWORD})),
        )
        .await;
    let login = expect_data(response).await;
    assert_eq!(login["restaurant_id"], 1);
    assert_eq!(login["role"], "waiter");

    let token = login["token"].as_str().unwrap();
    let response = app.request("GET", "/api/pos/tables", Some(token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = TestApp::spawn().await;

    for (user, pass) in [("waiter1", "wrong"), ("nobody", PASSWORD)] {
        let response = app
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"username": user, "password": pass})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Invalid username or password");
    }
}
