use axum::{extract::State, response::IntoResponse, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common::success_response;
use crate::errors::ServiceError;
use crate::handlers::AppState;

const DATABASE_KIND: &str = "in-memory";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceBanner {
    pub message: String,
    pub status: String,
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthInfo {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: String,
    pub uptime_seconds: u64,
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = ServiceBanner)),
    tag = "health"
)]
pub async fn root() -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(ServiceBanner {
        message: "StorePulse API".to_string(),
        status: "running".to_string(),
        database: DATABASE_KIND.to_string(),
    }))
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health", body = HealthInfo)),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(HealthInfo {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        database: DATABASE_KIND.to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// Creates the router for the banner and health endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}
