//! End-to-end order lifecycle over the real router: seating, kitchen flow,
//! billing, stock consumption and the low-stock alert.

mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::{TestApp, expect_data, json_body, wait_for};

use rms_server::realtime::Channel;

#[tokio::test]
async fn test_dine_in_order_lifecycle() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);
    let mut inventory_rx = app.state.fanout.subscribe(Channel::Inventory);

    // Three paellas on table 5: total 300, table seated in the same request
    let response = app
        .request(
            "POST",
            "/api/pos/orders",
            Some(&token),
            Some(json!({
                "table_id": 5,
                "order_type": "dine_in",
                "customer_name": "Ana",
                "items": [{"menu_item_id": 10, "quantity": 3, "price": 100.0}]
            })),
        )
        .await;
    let detail = expect_data(response).await;
    let order_id = detail["order"]["id"].as_i64().unwrap();
    assert_eq!(detail["order"]["status"], "open");
    assert_eq!(detail["order"]["total"], 300.0);
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);

    let tables = expect_data(app.request("GET", "/api/pos/tables", Some(&token), None).await).await;
    let t5 = tables
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == 5)
        .unwrap();
    assert_eq!(t5["status"], "occupied");

    // Completing the order bills the table and consumes 6kg of rice,
    // crossing the 5kg threshold
    let response = app
        .request(
            "PUT",
            &format!("/api/pos/orders/{order_id}/status"),
            Some(&token),
            Some(json!({"status": "completed"})),
        )
        .await;
    expect_data(response).await;

    wait_for("table billed", async || {
        let tables =
            expect_data(app.request("GET", "/api/pos/tables", Some(&token), None).await).await;
        tables.as_array().unwrap().iter().any(|t| t["id"] == 5 && t["status"] == "billed")
    })
    .await;

    wait_for("rice consumed", async || {
        let stock =
            expect_data(app.request("GET", "/api/inventory/stock", Some(&token), None).await).await;
        stock
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s["raw_material_id"] == 100 && s["quantity"] == 4.0)
    })
    .await;

    // Skip the table_update frames that also land on this channel
    let alert = loop {
        let frame = inventory_rx.recv().await.expect("low stock frame");
        if frame.event == "low_stock" {
            break frame;
        }
    };
    assert_eq!(alert.restaurant_id, 1);
    assert_eq!(alert.data["raw_material_id"], 100);
    assert_eq!(alert.data["quantity"], 4.0);
    assert_eq!(alert.data["threshold"], 5.0);

    // Paying releases the table
    let response = app
        .request(
            "PUT",
            &format!("/api/pos/orders/{order_id}/status"),
            Some(&token),
            Some(json!({"status": "paid"})),
        )
        .await;
    expect_data(response).await;

    wait_for("table vacant again", async || {
        let tables =
            expect_data(app.request("GET", "/api/pos/tables", Some(&token), None).await).await;
        tables.as_array().unwrap().iter().any(|t| t["id"] == 5 && t["status"] == "vacant")
    })
    .await;
}

#[tokio::test]
async fn test_completing_twice_conflicts() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);

    let detail = expect_data(
        app.request(
            "POST",
            "/api/pos/orders",
            Some(&token),
            Some(json!({
                "order_type": "takeaway",
                "items": [{"menu_item_id": 11, "quantity": 1, "price": 40.0}]
            })),
        )
        .await,
    )
    .await;
    let order_id = detail["order"]["id"].as_i64().unwrap();

    let uri = format!("/api/pos/orders/{order_id}/status");
    expect_data(
        app.request("PUT", &uri, Some(&token), Some(json!({"status": "completed"})))
            .await,
    )
    .await;

    let second = app
        .request("PUT", &uri, Some(&token), Some(json!({"status": "completed"})))
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(second).await["code"], "E0004");
}

#[tokio::test]
async fn test_illegal_transition_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);

    let detail = expect_data(
        app.request(
            "POST",
            "/api/pos/orders",
            Some(&token),
            Some(json!({
                "order_type": "takeaway",
                "items": [{"menu_item_id": 11, "quantity": 1, "price": 40.0}]
            })),
        )
        .await,
    )
    .await;
    let order_id = detail["order"]["id"].as_i64().unwrap();

    // open -> paid skips completed
    let response = app
        .request(
            "PUT",
            &format!("/api/pos/orders/{order_id}/status"),
            Some(&token),
            Some(json!({"status": "paid"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_dine_in_requires_table_and_vacancy() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);

    // No table at all
    let response = app
        .request(
            "POST",
            "/api/pos/orders",
            Some(&token),
            Some(json!({
                "order_type": "dine_in",
                "items": [{"menu_item_id": 10, "quantity": 1, "price": 100.0}]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Reserve table 6, then try to seat an order on it
    expect_data(
        app.request("POST", "/api/pos/tables/6/reserve", Some(&token), None)
            .await,
    )
    .await;
    let response = app
        .request(
            "POST",
            "/api/pos/orders",
            Some(&token),
            Some(json!({
                "table_id": 6,
                "order_type": "dine_in",
                "items": [{"menu_item_id": 10, "quantity": 1, "price": 100.0}]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_concurrent_orders_for_one_table_seat_exactly_once() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);

    let order = json!({
        "table_id": 6,
        "order_type": "dine_in",
        "items": [{"menu_item_id": 10, "quantity": 1, "price": 100.0}]
    });

    let (a, b) = tokio::join!(
        app.request("POST", "/api/pos/orders", Some(&token), Some(order.clone())),
        app.request("POST", "/api/pos/orders", Some(&token), Some(order)),
    );

    let statuses = [a.status(), b.status()];
    assert!(
        statuses.contains(&StatusCode::OK) && statuses.contains(&StatusCode::CONFLICT),
        "expected one winner and one conflict, got {statuses:?}"
    );
}

#[tokio::test]
async fn test_concurrent_status_updates_have_one_winner() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);

    let detail = expect_data(
        app.request(
            "POST",
            "/api/pos/orders",
            Some(&token),
            Some(json!({
                "order_type": "takeaway",
                "items": [{"menu_item_id": 11, "quantity": 1, "price": 40.0}]
            })),
        )
        .await,
    )
    .await;
    let order_id = detail["order"]["id"].as_i64().unwrap();

    // Same order, same transition, at the same time: the conditional update
    // must hand the loser a conflict, never a server error
    let uri = format!("/api/pos/orders/{order_id}/status");
    let body = json!({"status": "completed"});
    let (a, b) = tokio::join!(
        app.request("PUT", &uri, Some(&token), Some(body.clone())),
        app.request("PUT", &uri, Some(&token), Some(body)),
    );

    let statuses = [a.status(), b.status()];
    assert!(
        statuses.contains(&StatusCode::OK) && statuses.contains(&StatusCode::CONFLICT),
        "expected one winner and one conflict, got {statuses:?}"
    );
}

#[tokio::test]
async fn test_kitchen_queue_and_item_ready() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);
    let mut waiter_rx = app.state.fanout.subscribe(Channel::Waiter);

    let detail = expect_data(
        app.request(
            "POST",
            "/api/pos/orders",
            Some(&token),
            Some(json!({
                "order_type": "takeaway",
                "items": [{"menu_item_id": 10, "quantity": 2, "price": 100.0}]
            })),
        )
        .await,
    )
    .await;
    let order_id = detail["order"]["id"].as_i64().unwrap();
    let item_id = detail["items"][0]["id"].as_i64().unwrap();

    let queue =
        expect_data(app.request("GET", "/api/pos/kitchen/queue", Some(&token), None).await).await;
    let ticket = queue
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["item_id"] == item_id)
        .expect("item on the kitchen queue");
    assert_eq!(ticket["item_name"], "Paella");
    assert_eq!(ticket["quantity"], 2);

    let uri = format!("/api/pos/kitchen/items/{item_id}/ready");
    expect_data(app.request("POST", &uri, Some(&token), None).await).await;

    // Ignore the new_order frame published at creation time
    let frame = loop {
        let frame = waiter_rx.recv().await.expect("waiter frame");
        if frame.event == "item_ready" {
            break frame;
        }
    };
    assert_eq!(frame.data["order_id"], order_id);
    assert_eq!(frame.data["item_id"], item_id);

    // All items ready: the detail now reports ready_for_service
    let detail = expect_data(
        app.request("GET", &format!("/api/pos/orders/{order_id}"), Some(&token), None)
            .await,
    )
    .await;
    assert_eq!(detail["ready_for_service"], true);

    // Marking twice is a conflict
    let again = app.request("POST", &uri, Some(&token), None).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_items_only_append_to_open_orders() {
    let app = TestApp::spawn().await;
    let token = app.token_for("waiter1", "waiter", 1);

    let detail = expect_data(
        app.request(
            "POST",
            "/api/pos/orders",
            Some(&token),
            Some(json!({
                "order_type": "takeaway",
                "items": [{"menu_item_id": 11, "quantity": 1, "price": 40.0}]
            })),
        )
        .await,
    )
    .await;
    let order_id = detail["order"]["id"].as_i64().unwrap();

    let uri = format!("/api/pos/orders/{order_id}/items");
    let detail = expect_data(
        app.request(
            "POST",
            &uri,
            Some(&token),
            Some(json!([{"menu_item_id": 10, "quantity": 1, "price": 100.0}])),
        )
        .await,
    )
    .await;
    assert_eq!(detail["order"]["total"], 140.0);
    assert_eq!(detail["items"].as_array().unwrap().len(), 2);

    expect_data(
        app.request(
            "PUT",
            &format!("/api/pos/orders/{order_id}/status"),
            Some(&token),
            Some(json!({"status": "completed"})),
        )
        .await,
    )
    .await;

    let late = app
        .request(
            "POST",
            &uri,
            Some(&token),
            Some(json!([{"menu_item_id": 11, "quantity": 1, "price": 40.0}])),
        )
        .await;
    assert_eq!(late.status(), StatusCode::CONFLICT);
}
