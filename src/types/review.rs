//! Review types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reviewer summary embedded in a review record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A review record. The server field is `star`; `book` is only present
/// on the user's own review listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub star: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub user_id: i64,
    pub book_id: i64,
    pub user: ReviewUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<ReviewBookSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book summary embedded in a user's review listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewBookSummary {
    pub id: i64,
    pub title: String,
}

/// Sentinel id carried by an optimistic review until the server assigns
/// a real one. Server ids are positive.
pub(crate) const PLACEHOLDER_REVIEW_ID: i64 = -1;
