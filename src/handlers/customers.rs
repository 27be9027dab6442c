use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common::success_response;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::analytics::CustomerSummary;

#[derive(Debug, Deserialize, IntoParams)]
pub struct CustomerQuery {
    /// Case-insensitive substring match on the customer name.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerListResponse {
    pub customers: Vec<CustomerSummary>,
    pub count: u64,
}

/// List the customer directory
///
/// The directory is derived from the order ledger on every request; there is
/// no stored customer record.
#[utoipa::path(
    get,
    path = "/api/customers",
    params(CustomerQuery),
    responses(
        (status = 200, description = "Customers returned", body = CustomerListResponse,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let customers = state
        .services
        .analytics
        .customers(query.search.as_deref())
        .await?;
    let count = customers.len() as u64;
    Ok(success_response(CustomerListResponse { customers, count }))
}

/// Creates the router for customer endpoints
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_customers))
}
