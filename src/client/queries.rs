//! Read-side client methods: gateway + cache key + freshness window.

use std::sync::Arc;

use super::LibraryClient;
use crate::Result;
use crate::api::{books, reviews, user};
use crate::cache::keys;
use crate::select;
use crate::types::{Author, Book, BookDetail, Loan, Review, UserProfile};

impl LibraryClient {
    /// The full book list.
    pub async fn books(&self) -> Result<Arc<Vec<Book>>> {
        let api = self.api.clone();
        self.cache
            .read(&keys::books_list(), self.policy.books, move || async move {
                books::list(&api).await
            })
            .await
    }

    /// The book list filtered by a search query (case-insensitive match
    /// on title, author, and category). A blank query returns everything.
    pub async fn search_books(&self, query: Option<&str>) -> Result<Vec<Book>> {
        let api = self.api.clone();
        let list = self
            .cache
            .read(
                &keys::books_all(query),
                self.policy.books,
                move || async move { books::list(&api).await },
            )
            .await?;
        Ok(select::filter_books(&list, query.unwrap_or("")))
    }

    /// One book with its reviews inlined.
    pub async fn book(&self, id: i64) -> Result<Arc<BookDetail>> {
        let api = self.api.clone();
        self.cache
            .read(&keys::book(id), self.policy.book_detail, move || async move {
                books::get(&api, id).await
            })
            .await
    }

    /// Server-side recommendations.
    pub async fn recommended_books(&self) -> Result<Arc<Vec<Book>>> {
        let api = self.api.clone();
        self.cache
            .read(
                &keys::books_recommended(),
                self.policy.recommended,
                move || async move { books::recommended(&api).await },
            )
            .await
    }

    /// The `limit` best-rated books, zero-rated titles excluded.
    pub async fn top_rated_books(&self, limit: usize) -> Result<Vec<Book>> {
        let api = self.api.clone();
        let list = self
            .cache
            .read(
                &keys::books_top_rated(limit),
                self.policy.books,
                move || async move { books::list(&api).await },
            )
            .await?;
        Ok(select::top_rated(&list, limit))
    }

    /// The `limit` authors with the most books in the catalog.
    pub async fn popular_authors(&self, limit: usize) -> Result<Vec<Author>> {
        let api = self.api.clone();
        let list = self
            .cache
            .read(
                &keys::authors_popular(limit),
                self.policy.books,
                move || async move { books::list(&api).await },
            )
            .await?;
        Ok(select::popular_authors(&list, limit))
    }

    /// Reviews for one book. Always re-fetched (subject to in-flight
    /// de-duplication); reviews change under other users' feet.
    pub async fn book_reviews(&self, book_id: i64) -> Result<Arc<Vec<Review>>> {
        let api = self.api.clone();
        self.cache
            .read(
                &keys::book_reviews(book_id),
                self.policy.reviews,
                move || async move { reviews::for_book(&api, book_id).await },
            )
            .await
    }

    /// The signed-in user's profile with loan statistics.
    pub async fn profile(&self) -> Result<Arc<UserProfile>> {
        let api = self.api.clone();
        self.cache
            .read(&keys::me(), self.policy.profile, move || async move {
                user::profile(&api).await
            })
            .await
    }

    /// The signed-in user's loans.
    pub async fn my_loans(&self) -> Result<Arc<Vec<Loan>>> {
        let api = self.api.clone();
        self.cache
            .read(&keys::me_loans(), self.policy.my_loans, move || async move {
                user::loans(&api).await
            })
            .await
    }

    /// The signed-in user's reviews.
    pub async fn my_reviews(&self) -> Result<Arc<Vec<Review>>> {
        let api = self.api.clone();
        self.cache
            .read(
                &keys::me_reviews(),
                self.policy.my_reviews,
                move || async move { user::reviews(&api).await },
            )
            .await
    }
}
