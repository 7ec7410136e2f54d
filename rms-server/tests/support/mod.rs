//! Integration test harness
//!
//! Spins up the full server state over a throwaway SQLite file and seeds two
//! restaurants so cross-tenant behavior is always observable. Requests go
//! through the real router via `tower::ServiceExt::oneshot`.

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use rms_server::core::{Config, ServerState, build_router};

pub const PASSWORD: &str = "correct-horse";

pub struct TestApp {
    pub state: ServerState,
    pub router: Router,
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Full state with the standard two-restaurant fixture set
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        unsafe {
            // Deterministic JWT secret regardless of the host environment
            std::env::set_var(
                "JWT_SECRET",
                "integration-test-secret-key-of-sufficient-length",
            );
        }

        let mut config = Config::from_env();
        config.work_dir = dir.path().to_str().unwrap().to_string();

        let state = ServerState::initialize(&config).await.expect("state");
        seed(&state).await;

        let router = build_router(state.clone());
        Self {
            state,
            router,
            _dir: dir,
        }
    }

    /// Token for one of the seeded staff accounts
    pub fn token_for(&self, username: &str, role: &str, restaurant_id: i64) -> String {
        self.state
            .jwt
            .generate_token(1, username, role, restaurant_id)
            .expect("token")
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Decode the `{code, message, data}` envelope
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn expect_data(response: Response<Body>) -> Value {
    assert_eq!(response.status(), StatusCode::OK);
    let mut body = json_body(response).await;
    assert_eq!(body["code"], "E0000", "unexpected envelope: {body}");
    body["data"].take()
}

/// Poll until `check` passes or the deadline hits. Lifecycle subscribers run
/// on spawned tasks, so effects land shortly after the HTTP response.
pub async fn wait_for<F>(what: &str, mut check: F)
where
    F: AsyncFnMut() -> bool,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("hash")
        .to_string()
}

/// Two restaurants with tables, menu, recipes, stock, staff and module flags.
///
/// Restaurant 1: pos + inventory enabled. Restaurant 2: pos enabled,
/// inventory disabled (for gate tests).
async fn seed(state: &ServerState) {
    let pool = &state.db.pool;

    sqlx::query(
        "INSERT INTO restaurant (id, name, slug) VALUES
         (1, 'Uno', 'uno'), (2, 'Dos', 'dos')",
    )
    .execute(pool)
    .await
    .unwrap();

    let hash = hash_password(PASSWORD);
    sqlx::query(
        "INSERT INTO staff (restaurant_id, username, password_hash, display_name, role) VALUES
         (1, 'owner1', ?, 'Owner One', 'owner'),
         (1, 'waiter1', ?, 'Waiter One', 'waiter'),
         (2, 'staff2', ?, 'Staff Two', 'staff')",
    )
    .bind(&hash)
    .bind(&hash)
    .bind(&hash)
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO module_config (restaurant_id, module, enabled) VALUES
         (1, 'pos', 1), (1, 'inventory', 1),
         (2, 'pos', 1), (2, 'inventory', 0)",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO dining_table (id, restaurant_id, name, capacity, status) VALUES
         (5, 1, 'T5', 4, 'vacant'),
         (6, 1, 'T6', 2, 'vacant'),
         (7, 2, 'T7', 4, 'vacant')",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO menu_item (id, restaurant_id, name, price) VALUES
         (10, 1, 'Paella', 100.0),
         (11, 1, 'Gazpacho', 40.0),
         (20, 2, 'Ramen', 60.0)",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO raw_material (id, restaurant_id, name, unit) VALUES
         (100, 1, 'Rice', 'kg'),
         (101, 1, 'Tomato', 'kg'),
         (200, 2, 'Noodles', 'kg')",
    )
    .execute(pool)
    .await
    .unwrap();

    // Rice starts at 10kg with a 5kg threshold; a Paella uses 2kg
    sqlx::query(
        "INSERT INTO inventory_stock (restaurant_id, raw_material_id, quantity, threshold) VALUES
         (1, 100, 10.0, 5.0),
         (1, 101, 50.0, 0.0),
         (2, 200, 3.0, 1.0)",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO recipe (restaurant_id, menu_item_id, raw_material_id, amount) VALUES
         (1, 10, 100, 2.0),
         (1, 10, 101, 0.5),
         (1, 11, 101, 1.0)",
    )
    .execute(pool)
    .await
    .unwrap();
}
