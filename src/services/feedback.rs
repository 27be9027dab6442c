use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::Feedback;
use crate::store::Datastore;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateFeedbackRequest {
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "User name is required"))]
    pub user_name: String,
    /// Star rating from 1 to 5.
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductFeedback {
    pub product_id: Uuid,
    pub feedback: Vec<Feedback>,
    /// Mean rating rounded to one decimal place, `0.0` with no reviews.
    pub average_rating: f64,
    pub total_reviews: u64,
}

/// Product reviews and their per-product aggregate.
#[derive(Clone)]
pub struct FeedbackService {
    store: Arc<Datastore>,
}

impl FeedbackService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id, rating = request.rating))]
    pub async fn create_feedback(
        &self,
        request: CreateFeedbackRequest,
    ) -> Result<Feedback, ServiceError> {
        request.validate()?;

        let feedback = Feedback {
            id: Uuid::new_v4(),
            product_id: request.product_id,
            user_name: request.user_name,
            rating: request.rating,
            comment: request.comment,
            created_at: Utc::now(),
        };

        self.store.feedback.insert(feedback.id, feedback.clone());
        info!(feedback_id = %feedback.id, "Feedback recorded");
        Ok(feedback)
    }

    /// Reviews for one product plus their rounded average.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product_feedback(&self, product_id: Uuid) -> Result<ProductFeedback, ServiceError> {
        let mut feedback = self.store.feedback.list();
        feedback.retain(|f| f.product_id == product_id);

        let total_reviews = feedback.len() as u64;
        let average_rating = if feedback.is_empty() {
            0.0
        } else {
            let sum: u64 = feedback.iter().map(|f| u64::from(f.rating)).sum();
            round_to_tenth(sum as f64 / total_reviews as f64)
        };

        Ok(ProductFeedback {
            product_id,
            feedback,
            average_rating,
            total_reviews,
        })
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
