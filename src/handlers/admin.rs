use axum::{extract::State, response::IntoResponse, routing::post, Router};

use super::common::success_response;
use crate::errors::ServiceError;
use crate::handlers::AppState;

/// Load the demo data set
///
/// Clears the product and order collections and reloads the sample catalog
/// plus a demo order book. Safe to call repeatedly.
#[utoipa::path(
    post,
    path = "/api/admin/seed",
    responses(
        (status = 200, description = "Store seeded", body = crate::services::seed::SeedReport,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn seed(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.seed.seed().await?;
    Ok(success_response(report))
}

/// Creates the router for admin endpoints
pub fn routes() -> Router<AppState> {
    Router::new().route("/seed", post(seed))
}
