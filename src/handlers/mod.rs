pub mod admin;
pub mod analytics;
pub mod auth;
pub mod common;
pub mod customers;
pub mod feedback;
pub mod health;
pub mod orders;
pub mod products;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::sessions::SessionStore;
use crate::auth::AuthService;
use crate::services::analytics::AnalyticsService;
use crate::services::feedback::FeedbackService;
use crate::services::orders::OrderService;
use crate::services::products::ProductService;
use crate::services::seed::SeedService;
use crate::store::Datastore;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub analytics: Arc<AnalyticsService>,
    pub orders: Arc<OrderService>,
    pub products: Arc<ProductService>,
    pub feedback: Arc<FeedbackService>,
    pub seed: Arc<SeedService>,
    pub auth: Arc<AuthService>,
}

impl AppServices {
    pub fn new(
        store: Arc<Datastore>,
        sessions: Arc<dyn SessionStore>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            analytics: Arc::new(AnalyticsService::new(store.clone())),
            orders: Arc::new(OrderService::new(store.clone())),
            products: Arc::new(ProductService::new(store.clone())),
            feedback: Arc::new(FeedbackService::new(store.clone())),
            seed: Arc::new(SeedService::new(store.clone())),
            auth: Arc::new(AuthService::new(store, sessions, session_ttl)),
        }
    }
}
