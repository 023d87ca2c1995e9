//! User account and profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

/// A user account as the server reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account may call admin endpoints.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Loan statistics attached to a profile read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanStats {
    pub total_borrowed: u32,
    pub currently_borrowed: u32,
    pub total_reviews: u32,
    pub overdue_books_count: u32,
}

/// Profile payload: the account plus its loan statistics.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub profile: User,
    #[serde(default)]
    pub loan_stats: LoanStats,
}
