//! Current-user gateway: `/api/me*`.

use serde::Deserialize;

use crate::Result;
use crate::transport::ApiClient;
use crate::types::{Loan, Review, UpdateProfileRequest, User, UserProfile};

#[derive(Debug, Clone, Deserialize)]
struct LoansData {
    loans: Vec<Loan>,
}

#[derive(Debug, Clone, Deserialize)]
struct ReviewsData {
    reviews: Vec<Review>,
}

pub async fn profile(api: &ApiClient) -> Result<UserProfile> {
    api.get("/api/me", "fetch profile").await
}

pub async fn update_profile(api: &ApiClient, req: &UpdateProfileRequest) -> Result<User> {
    api.put("/api/me", Some(req), "update profile").await
}

pub async fn loans(api: &ApiClient) -> Result<Vec<Loan>> {
    let data: LoansData = api.get("/api/me/loans", "fetch loans").await?;
    Ok(data.loans)
}

pub async fn reviews(api: &ApiClient) -> Result<Vec<Review>> {
    let data: ReviewsData = api.get("/api/me/reviews", "fetch reviews").await?;
    Ok(data.reviews)
}
