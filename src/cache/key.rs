//! Semantic cache keys.
//!
//! A [`QueryKey`] is an ordered tuple of string segments, e.g.
//! `["books", "all", "dune"]`. Invalidation is hierarchical: a prefix
//! matches every key it starts, so invalidating `["books"]` also marks
//! `["books", "all", "dune"]` stale.

use std::fmt;

/// Ordered tuple of segments identifying one cached resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Build a key from segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The empty key: a prefix of every key.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a segment.
    pub fn push(mut self, segment: impl ToString) -> Self {
        self.0.push(segment.to_string());
        self
    }

    /// Whether `prefix` is a (possibly equal) prefix of this key.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// First segment, used as the metrics namespace label.
    pub fn namespace(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    /// Segment view.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Key constructors for every resource the client caches.
///
/// Kept in one place so the mutation dependent-key sets and the query
/// methods cannot drift apart.
pub mod keys {
    use super::QueryKey;

    pub fn books() -> QueryKey {
        QueryKey::new(["books"])
    }

    pub fn books_list() -> QueryKey {
        QueryKey::new(["books", "list"])
    }

    pub fn books_all(search: Option<&str>) -> QueryKey {
        QueryKey::new(["books", "all"]).push(search.unwrap_or(""))
    }

    pub fn books_recommended() -> QueryKey {
        QueryKey::new(["books", "recommended"])
    }

    pub fn books_top_rated(limit: usize) -> QueryKey {
        QueryKey::new(["books", "top-rated"]).push(limit)
    }

    pub fn book(id: i64) -> QueryKey {
        QueryKey::new(["book"]).push(id)
    }

    pub fn authors_popular(limit: usize) -> QueryKey {
        QueryKey::new(["authors", "popular"]).push(limit)
    }

    pub fn reviews() -> QueryKey {
        QueryKey::new(["reviews"])
    }

    pub fn book_reviews(book_id: i64) -> QueryKey {
        QueryKey::new(["reviews", "book"]).push(book_id)
    }

    pub fn me() -> QueryKey {
        QueryKey::new(["me"])
    }

    pub fn me_loans() -> QueryKey {
        QueryKey::new(["me", "loans"])
    }

    pub fn me_reviews() -> QueryKey {
        QueryKey::new(["me", "reviews"])
    }

    pub fn loans() -> QueryKey {
        QueryKey::new(["loans"])
    }

    pub fn admin() -> QueryKey {
        QueryKey::new(["admin"])
    }

    pub fn admin_overview() -> QueryKey {
        QueryKey::new(["admin", "overview"])
    }

    pub fn admin_authors() -> QueryKey {
        QueryKey::new(["admin", "authors"])
    }

    pub fn admin_categories() -> QueryKey {
        QueryKey::new(["admin", "categories"])
    }

    pub fn admin_overdue_loans(page: u32, limit: u32) -> QueryKey {
        QueryKey::new(["admin", "loans", "overdue"])
            .push(page)
            .push(limit)
    }

    pub fn admin_borrowed_books() -> QueryKey {
        QueryKey::new(["admin", "loans", "borrowed"])
    }

    pub fn admin_books_with_status() -> QueryKey {
        QueryKey::new(["admin", "books", "with-status"])
    }
}
