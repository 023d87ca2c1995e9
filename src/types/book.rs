//! Book catalog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::review::Review;

/// An author record. `book_count` is only populated by list projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_count: Option<u32>,
}

/// A category record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A book as it appears in list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub isbn: String,
    pub published_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub rating: f32,
    pub review_count: u32,
    pub total_copies: u32,
    pub available_copies: u32,
    pub borrow_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    pub author_id: i64,
    pub category_id: i64,
    pub author: Author,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single book with its reviews inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
}

/// Copy-availability band derived from available vs total copies.
///
/// Used by the admin books-with-status projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookAvailability {
    /// Every copy is on the shelf.
    Available,
    /// Every copy is out.
    Borrowed,
    /// Some copies are out, some returned.
    Returned,
    /// No copies exist at all.
    Damaged,
}

impl BookAvailability {
    /// Classify a book by its copy counts.
    pub fn classify(available_copies: u32, total_copies: u32) -> Self {
        if total_copies == 0 {
            BookAvailability::Damaged
        } else if available_copies == 0 {
            BookAvailability::Borrowed
        } else if available_copies == total_copies {
            BookAvailability::Available
        } else {
            BookAvailability::Returned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_bands() {
        assert_eq!(
            BookAvailability::classify(3, 3),
            BookAvailability::Available
        );
        assert_eq!(BookAvailability::classify(0, 3), BookAvailability::Borrowed);
        assert_eq!(BookAvailability::classify(1, 3), BookAvailability::Returned);
        assert_eq!(BookAvailability::classify(0, 0), BookAvailability::Damaged);
    }
}
