//! Review gateway: `/api/books/{id}/reviews` and `/api/reviews/{id}`.

use serde::Deserialize;

use crate::Result;
use crate::transport::ApiClient;
use crate::types::{CreateReviewRequest, Review};

#[derive(Debug, Clone, Deserialize)]
struct ReviewsData {
    reviews: Vec<Review>,
}

pub async fn for_book(api: &ApiClient, book_id: i64) -> Result<Vec<Review>> {
    let data: ReviewsData = api
        .get(&format!("/api/books/{book_id}/reviews"), "fetch reviews")
        .await?;
    Ok(data.reviews)
}

pub async fn create(api: &ApiClient, book_id: i64, req: &CreateReviewRequest) -> Result<Review> {
    api.post(
        &format!("/api/books/{book_id}/reviews"),
        Some(req),
        "add review",
    )
    .await
}

pub async fn delete(api: &ApiClient, review_id: i64) -> Result<()> {
    api.delete(&format!("/api/reviews/{review_id}"), "delete review")
        .await
}
