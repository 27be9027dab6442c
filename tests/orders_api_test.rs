mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{json_body, TestApp};

fn line_item(name: &str, quantity: u32, price: &str) -> Value {
    json!({
        "product_id": Uuid::new_v4(),
        "product_name": name,
        "quantity": quantity,
        "price": price
    })
}

#[tokio::test]
async fn order_crud_round_trip() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/orders",
            json!({
                "customer_name": "Alice",
                "items": [line_item("Widget", 2, "10.00"), line_item("Gadget", 1, "5.50")]
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = json_body(response).await;
    assert_eq!(created["customer_name"], "Alice");
    assert_eq!(created["status"], "Pending");
    assert_eq!(created["total_amount"], "25.50");
    assert!(created["created_at"].is_string());
    let id = created["id"].as_str().expect("order id").to_string();

    let fetched = json_body(app.get(&format!("/api/orders/{id}")).await).await;
    assert_eq!(fetched["id"], id.as_str());
    assert_eq!(fetched["items"].as_array().map(Vec::len), Some(2));

    let response = app
        .put(&format!("/api/orders/{id}"), json!({"status": "Shipped"}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["status"], "Shipped");
    assert_eq!(updated["total_amount"], "25.50");

    let response = app.delete(&format!("/api/orders/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.get(&format!("/api/orders/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_keeps_insertion_order_and_counts() {
    let app = TestApp::new();
    for name in ["first", "second", "third"] {
        let response = app
            .post("/api/orders", json!({"customer_name": name, "items": []}))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let body = json_body(app.get("/api/orders").await).await;
    assert_eq!(body["count"], 3);
    let names: Vec<&str> = body["orders"]
        .as_array()
        .expect("orders array")
        .iter()
        .map(|o| o["customer_name"].as_str().expect("customer name"))
        .collect();
    assert_eq!(names, ["first", "second", "third"]);
}

#[tokio::test]
async fn a_claimed_total_that_disagrees_with_the_items_is_rejected() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/orders",
            json!({
                "customer_name": "Alice",
                "items": [line_item("Widget", 2, "10.00")],
                "total_amount": "19.99"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(
        body["message"],
        "Validation error: total_amount 19.99 does not match the items total 20.00"
    );
}

#[tokio::test]
async fn a_claimed_total_that_agrees_is_accepted() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/orders",
            json!({
                "customer_name": "Alice",
                "items": [line_item("Widget", 2, "10.00")],
                "total_amount": "20.00"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["total_amount"], "20.00");
}

#[tokio::test]
async fn explicit_null_created_at_stores_an_undated_order() {
    let app = TestApp::new();

    let undated = json_body(
        app.post(
            "/api/orders",
            json!({"customer_name": "Legacy Import", "items": [], "created_at": null}),
        )
        .await,
    )
    .await;
    assert!(undated["created_at"].is_null());

    let fresh = json_body(
        app.post("/api/orders", json!({"customer_name": "Fresh", "items": []}))
            .await,
    )
    .await;
    assert!(fresh["created_at"].is_string());
}

#[tokio::test]
async fn missing_orders_return_the_standard_error_body() {
    let app = TestApp::new();

    let response = app.get(&format!("/api/orders/{}", Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get("x-request-id").is_some());

    let body = json_body(response).await;
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "Not found: Order not found");
    assert!(body["request_id"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn deleting_a_missing_order_is_not_found() {
    let app = TestApp::new();
    let response = app.delete(&format!("/api/orders/{}", Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_payload_fields_are_rejected_at_the_boundary() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/orders",
            json!({"customer_name": "Alice", "items": [], "surprise": true}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn negative_line_prices_fail_validation() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/orders",
            json!({
                "customer_name": "Alice",
                "items": [line_item("Widget", 1, "-1.00")]
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Bad Request");
}

#[tokio::test]
async fn replacing_items_recomputes_the_stored_total() {
    let app = TestApp::new();

    let created = json_body(
        app.post(
            "/api/orders",
            json!({"customer_name": "Alice", "items": [line_item("Widget", 1, "10.00")]}),
        )
        .await,
    )
    .await;
    let id = created["id"].as_str().expect("order id").to_string();

    let updated = json_body(
        app.put(
            &format!("/api/orders/{id}"),
            json!({"items": [line_item("Gadget", 3, "2.00")]}),
        )
        .await,
    )
    .await;
    assert_eq!(updated["total_amount"], "6.00");
    assert_eq!(updated["items"].as_array().map(Vec::len), Some(1));
}
