use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created_response, success_response};
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::feedback::CreateFeedbackRequest;

/// Record product feedback
#[utoipa::path(
    post,
    path = "/api/feedback",
    request_body = CreateFeedbackRequest,
    responses(
        (status = 201, description = "Feedback recorded", body = crate::models::Feedback,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "feedback"
)]
pub async fn create_feedback(
    State(state): State<AppState>,
    Json(request): Json<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let feedback = state.services.feedback.create_feedback(request).await?;
    Ok(created_response(feedback))
}

/// Feedback and average rating for one product
#[utoipa::path(
    get,
    path = "/api/feedback/:product_id",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product feedback", body = crate::services::feedback::ProductFeedback)
    ),
    tag = "feedback"
)]
pub async fn product_feedback(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.services.feedback.product_feedback(product_id).await?;
    Ok(success_response(summary))
}

/// Creates the router for feedback endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_feedback))
        .route("/:product_id", get(product_feedback))
}
