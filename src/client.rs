//! Typed client for the StorePulse REST API.
//!
//! Backs the `storepulse` CLI. Every call returns the deserialized body or a
//! [`ClientError`] carrying the message the server put in its error body.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::handlers::auth::{
    AuthResponse, LoginRequest, LogoutResponse, MeResponse, RegisterRequest,
};
use crate::models::{Order, Product};
use crate::services::analytics::DashboardReport;
use crate::services::orders::{CreateOrderRequest, OrderListResponse, UpdateOrderRequest};
use crate::services::products::{CreateProductRequest, ProductListResponse};
use crate::services::seed::SeedReport;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, TLS or decoding failures below the API.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::Api {
                status: StatusCode::UNAUTHORIZED,
                ..
            }
        )
    }
}

/// Shape shared by every error body the server produces.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// A list body is either the wrapped form or a bare array. Both normalize to
/// the wrapped form.
#[derive(Deserialize)]
#[serde(untagged)]
enum OrdersPayload {
    Wrapped(OrderListResponse),
    Bare(Vec<Order>),
}

impl From<OrdersPayload> for OrderListResponse {
    fn from(payload: OrdersPayload) -> Self {
        match payload {
            OrdersPayload::Wrapped(list) => list,
            OrdersPayload::Bare(orders) => OrderListResponse {
                count: orders.len() as u64,
                orders,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProductsPayload {
    Wrapped(ProductListResponse),
    Bare(Vec<Product>),
}

impl From<ProductsPayload> for ProductListResponse {
    fn from(payload: ProductsPayload) -> Self {
        match payload {
            ProductsPayload::Wrapped(list) => list,
            ProductsPayload::Bare(products) => ProductListResponse {
                count: products.len() as u64,
                products,
            },
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            token: None,
        })
    }

    /// Attaches a bearer token to every subsequent request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub async fn get_orders(&self) -> Result<OrderListResponse, ClientError> {
        let payload: OrdersPayload = self.get("/api/orders").await?;
        Ok(payload.into())
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order, ClientError> {
        self.get(&format!("/api/orders/{}", id)).await
    }

    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ClientError> {
        self.post("/api/orders", request).await
    }

    pub async fn update_order(
        &self,
        id: Uuid,
        request: &UpdateOrderRequest,
    ) -> Result<Order, ClientError> {
        self.put(&format!("/api/orders/{}", id), request).await
    }

    pub async fn delete_order(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .authorized(self.http.delete(self.url(&format!("/api/orders/{}", id))))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn get_products(
        &self,
        category: Option<&str>,
    ) -> Result<ProductListResponse, ClientError> {
        let mut request = self.http.get(self.url("/api/products"));
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        let response = self.authorized(request).send().await?;
        let payload: ProductsPayload = Self::decode(response).await?;
        Ok(payload.into())
    }

    pub async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<Product, ClientError> {
        self.post("/api/products", request).await
    }

    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = RegisterRequest {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        };
        self.post("/api/auth/register", &body).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/api/auth/login", &body).await
    }

    pub async fn me(&self) -> Result<MeResponse, ClientError> {
        self.get("/api/auth/me").await
    }

    pub async fn logout(&self) -> Result<LogoutResponse, ClientError> {
        self.post_empty("/api/auth/logout").await
    }

    pub async fn dashboard(&self) -> Result<DashboardReport, ClientError> {
        self.get("/api/analytics/dashboard").await
    }

    pub async fn seed(&self) -> Result<SeedReport, ClientError> {
        self.post_empty("/api/admin/seed").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.authorized(self.http.get(self.url(path))).send().await?;
        Self::decode(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .authorized(self.http.post(self.url(path)).json(body))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .authorized(self.http.post(self.url(path)))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .authorized(self.http.put(self.url(path)).json(body))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        Ok(Self::check(response).await?.json().await?)
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.message.or(parsed.error))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });

        Err(ClientError::Api { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_order_lists_normalize_to_the_wrapped_form() {
        let payload: OrdersPayload = serde_json::from_str("[]").unwrap();
        let list: OrderListResponse = payload.into();

        assert_eq!(list.count, 0);
        assert!(list.orders.is_empty());
    }

    #[test]
    fn wrapped_order_lists_pass_through() {
        let payload: OrdersPayload =
            serde_json::from_str(r#"{"orders": [], "count": 0}"#).unwrap();
        let list: OrderListResponse = payload.into();

        assert_eq!(list.count, 0);
    }

    #[test]
    fn error_bodies_prefer_the_human_message() {
        let parsed: ApiErrorBody =
            serde_json::from_str(r#"{"error": "Not Found", "message": "Order not found"}"#)
                .unwrap();

        assert_eq!(
            parsed.message.or(parsed.error).as_deref(),
            Some("Order not found")
        );
    }

    #[test]
    fn trailing_slash_in_the_base_url_is_ignored() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.url("/api/orders"), "http://localhost:5000/api/orders");
    }
}
