use axum::{extract::State, response::IntoResponse, routing::get, Router};

use super::common::success_response;
use crate::errors::ServiceError;
use crate::handlers::AppState;

/// Full dashboard report
///
/// Every number is recomputed from the current order and product snapshots;
/// nothing is cached or stored.
#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    responses(
        (status = 200, description = "Dashboard report", body = crate::services::analytics::DashboardReport,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "analytics"
)]
pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.analytics.dashboard().await?;
    Ok(success_response(report))
}

/// Creates the router for analytics endpoints
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}
