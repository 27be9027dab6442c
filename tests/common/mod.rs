//! Shared harness for the API integration tests. Builds the full router,
//! middleware included, over a fresh in-memory state and drives it with
//! `tower::ServiceExt::oneshot`, so no listener is bound.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use storepulse_api::config::AppConfig;
use storepulse_api::AppState;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// A fresh application with an empty store.
    pub fn new() -> Self {
        let state = AppState::new(AppConfig::new("127.0.0.1".into(), 0, "development".into()));
        let router = storepulse_api::app(state.clone(), CorsLayer::permissive());
        Self { router, state }
    }

    /// A fresh application preloaded with the demo catalog and order book.
    pub async fn seeded() -> Self {
        let app = Self::new();
        app.state
            .services
            .seed
            .seed()
            .await
            .expect("seed demo data");
        app
    }

    /// Send one request through the full middleware stack.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json).expect("serialize request body"),
                ))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("route request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.request(Method::DELETE, uri, None, None).await
    }
}

/// Decode a response body as JSON.
pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}

/// Register a throwaway account and hand back its bearer token.
pub async fn register_user(app: &TestApp, email: &str) -> String {
    let response = app
        .post(
            "/api/auth/register",
            serde_json::json!({
                "email": email,
                "name": "Test User",
                "password": "a long enough password"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    body["token"]
        .as_str()
        .expect("token in register response")
        .to_string()
}
