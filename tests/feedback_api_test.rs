mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{json_body, TestApp};

#[tokio::test]
async fn recorded_reviews_roll_up_into_the_product_aggregate() {
    let app = TestApp::new();
    let product_id = Uuid::new_v4();

    for (reviewer, rating, comment) in [
        ("Ava", 5, "Exactly as described"),
        ("Liam", 4, "Good value"),
        ("Sofia", 4, "Arrived late but works"),
    ] {
        let response = app
            .post(
                "/api/feedback",
                json!({
                    "product_id": product_id,
                    "user_name": reviewer,
                    "rating": rating,
                    "comment": comment
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let recorded = json_body(response).await;
        assert_eq!(recorded["user_name"], reviewer);
        assert!(recorded["created_at"].is_string());
    }

    let summary = json_body(app.get(&format!("/api/feedback/{product_id}")).await).await;
    assert_eq!(summary["product_id"], product_id.to_string());
    assert_eq!(summary["total_reviews"], 3);
    assert_eq!(summary["average_rating"], 4.3);
    assert_eq!(summary["feedback"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn reviews_for_other_products_stay_out_of_the_aggregate() {
    let app = TestApp::new();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    for (product_id, rating) in [(first, 5), (second, 1)] {
        let response = app
            .post(
                "/api/feedback",
                json!({
                    "product_id": product_id,
                    "user_name": "Reviewer",
                    "rating": rating,
                    "comment": "noted"
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let summary = json_body(app.get(&format!("/api/feedback/{first}")).await).await;
    assert_eq!(summary["total_reviews"], 1);
    assert_eq!(summary["average_rating"], 5.0);
}

#[tokio::test]
async fn a_product_with_no_reviews_averages_zero() {
    let app = TestApp::new();

    let summary = json_body(
        app.get(&format!("/api/feedback/{}", Uuid::new_v4()))
            .await,
    )
    .await;
    assert_eq!(summary["total_reviews"], 0);
    assert_eq!(summary["average_rating"], 0.0);
    assert!(summary["feedback"].as_array().expect("reviews").is_empty());
}

#[tokio::test]
async fn out_of_range_ratings_are_rejected() {
    let app = TestApp::new();

    for rating in [0, 6] {
        let response = app
            .post(
                "/api/feedback",
                json!({
                    "product_id": Uuid::new_v4(),
                    "user_name": "Reviewer",
                    "rating": rating,
                    "comment": "should not land"
                }),
            )
            .await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "rating {rating} must be rejected"
        );
    }
}
