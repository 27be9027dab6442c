//! StorePulse API Library
//!
//! This crate provides the core functionality for the StorePulse API
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod services;
pub mod store;
pub mod tracing;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::auth::sessions::{MemorySessionStore, SessionStore};
use crate::config::AppConfig;
use crate::handlers::AppServices;
use crate::store::Datastore;

/// Hard ceiling for a single request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Datastore>,
    pub config: Arc<AppConfig>,
    pub services: AppServices,
    pub started_at: Instant,
}

impl AppState {
    /// Wires the in-memory store, the session store and the service layer
    /// from an application config.
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(Datastore::new());
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let services = AppServices::new(store.clone(), sessions, config.session_ttl());
        Self {
            store,
            config: Arc::new(config),
            services,
            started_at: Instant::now(),
        }
    }
}

/// The `/api` surface, one nested router per resource.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/orders", handlers::orders::routes())
        .nest("/products", handlers::products::routes())
        .nest("/customers", handlers::customers::routes())
        .nest("/analytics", handlers::analytics::routes())
        .nest("/feedback", handlers::feedback::routes())
        .nest("/auth", handlers::auth::routes())
        .nest("/admin", handlers::admin::routes())
}

/// Builds the full application router: banner and health endpoints, the `/api`
/// surface, Swagger UI, and the standard middleware stack.
///
/// The CORS layer is passed in because only the binary derives it from config;
/// tests hand in a permissive one.
pub fn app(state: AppState, cors: CorsLayer) -> Router {
    let body_limit = state.config.max_body_size;
    Router::new()
        .merge(handlers::health::routes())
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        .layer(DefaultBodyLimit::max(body_limit))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
