//! Contract tests for the typed API client, run against a wiremock server.

use serde_json::{json, Value};
use storepulse_api::client::{ApiClient, ClientError};
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn order_json(customer: &str, total: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "customer_name": customer,
        "total_amount": total,
        "status": "Pending",
        "items": [],
        "created_at": null
    })
}

#[tokio::test]
async fn wrapped_order_envelopes_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orders": [order_json("Ava Thompson", "79.99")],
            "count": 1
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("build client");
    let list = client.get_orders().await.expect("list orders");
    assert_eq!(list.count, 1);
    assert_eq!(list.orders[0].customer_name, "Ava Thompson");
}

#[tokio::test]
async fn bare_order_arrays_decode_to_the_same_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            order_json("Liam Chen", "24.99"),
            order_json("Sofia Reyes", "9.50")
        ])))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("build client");
    let list = client.get_orders().await.expect("list orders");
    assert_eq!(list.count, 2);
    assert_eq!(list.orders[1].customer_name, "Sofia Reyes");
}

#[tokio::test]
async fn error_bodies_surface_their_message() {
    let server = MockServer::start().await;
    let missing = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/api/orders/{missing}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Not Found",
            "message": "Not found: Order not found",
            "timestamp": "2025-06-09T10:30:00Z"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("build client");
    let err = client.get_order(missing).await.expect_err("404 expected");
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "Not found: Order not found");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_responses_are_recognizable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Unauthorized",
            "message": "Authentication error: Invalid credentials",
            "timestamp": "2025-06-09T10:30:00Z"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("build client");
    let err = client
        .login("ada@example.com", "wrong")
        .await
        .expect_err("401 expected");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn the_session_token_rides_along_as_a_bearer_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer sp_test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "id": Uuid::new_v4(),
                "email": "ada@example.com",
                "name": "Ada",
                "role": "user",
                "created_at": "2024-01-01T00:00:00Z"
            }
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri())
        .expect("build client")
        .with_token("sp_test_token");
    let me = client.me().await.expect("authenticated lookup");
    assert_eq!(me.user.email, "ada@example.com");
}

#[tokio::test]
async fn category_filters_become_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("category", "Electronics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{
                "id": Uuid::new_v4(),
                "name": "Headphones",
                "price": "79.99",
                "category": "Electronics",
                "in_stock": true
            }],
            "count": 1
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("build client");
    let list = client
        .get_products(Some("Electronics"))
        .await
        .expect("filtered list");
    assert_eq!(list.count, 1);
    assert_eq!(list.products[0].name, "Headphones");
}

#[tokio::test]
async fn deletes_succeed_on_an_empty_no_content_response() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("DELETE"))
        .and(path(format!("/api/orders/{id}")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).expect("build client");
    client.delete_order(id).await.expect("delete order");
}
