//! State-changing client methods.
//!
//! Each mutation follows the coordinator protocol: begin (lock + detach
//! in-flight reads), stage optimistic writes, call the gateway, then
//! commit with its declared dependent-key set or fail with rollback.
//! The dependent-key sets are fixed contracts: borrowing a book marks
//! the loans list, the user's loans, that book, and the book list stale
//! together even though only one network call occurred.

use chrono::Utc;
use tracing::warn;

use super::LibraryClient;
use crate::api::{auth, loans, reviews, user};
use crate::cache::{NoticeKind, keys};
use crate::session::Session;
use crate::types::{
    BookDetail, BorrowBookRequest, CreateReviewRequest, Loan, LoanStatus, LoginRequest,
    PLACEHOLDER_REVIEW_ID, RegisterRequest, Review, ReviewUser, UpdateProfileRequest, User,
};
use crate::Result;

impl LibraryClient {
    /// Log in and store the session. Everything previously cached is
    /// marked stale: it may belong to another account's view.
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<User> {
        let req = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        match auth::login(&self.api, &req).await {
            Ok(data) => {
                let user = data.user.clone();
                self.persist_session(Session {
                    token: data.token,
                    user: data.user,
                })
                .await;
                self.cache.invalidate_all();
                self.coordinator
                    .notify(NoticeKind::Success, "Login successful!");
                Ok(user)
            }
            Err(e) => {
                self.coordinator
                    .notify(NoticeKind::Error, e.user_message("Login failed"));
                Err(e)
            }
        }
    }

    /// Register a new account and store the session.
    pub async fn register(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<User> {
        let req = RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        };
        match auth::register(&self.api, &req).await {
            Ok(data) => {
                let user = data.user.clone();
                self.persist_session(Session {
                    token: data.token,
                    user: data.user,
                })
                .await;
                self.cache.invalidate_all();
                self.coordinator
                    .notify(NoticeKind::Success, "Registration successful!");
                Ok(user)
            }
            Err(e) => {
                self.coordinator
                    .notify(NoticeKind::Error, e.user_message("Registration failed"));
                Err(e)
            }
        }
    }

    /// Clear the session, the credential store, and the whole cache.
    pub async fn logout(&self) {
        self.session.clear();
        if let Err(e) = self.credentials.clear().await {
            warn!(error = %e, "failed to clear persisted credentials");
        }
        self.cache.clear();
        self.coordinator
            .notify(NoticeKind::Success, "Logged out successfully");
    }

    /// Borrow a book. The cached detail's available-copies count drops
    /// immediately; a failed call restores the exact prior entry.
    pub async fn borrow_book(&self, book_id: i64, days: Option<u32>) -> Result<Loan> {
        let book_key = keys::book(book_id);
        let mut tx = self.coordinator.begin("borrow book", &[book_key.clone()]).await;

        tx.stage::<BookDetail>(&book_key, |old| {
            old.map(|detail| {
                let mut detail = detail.clone();
                detail.book.available_copies = detail.book.available_copies.saturating_sub(1);
                detail
            })
        });

        match loans::borrow(&self.api, &BorrowBookRequest { book_id, days }).await {
            Ok(loan) => {
                tx.commit(
                    &[keys::loans(), keys::me_loans(), book_key, keys::books()],
                    "Book borrowed successfully!",
                );
                Ok(loan)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    /// Return a borrowed book. The cached loan flips to RETURNED with a
    /// returned-at stamp before the call resolves.
    pub async fn return_book(&self, loan_id: i64) -> Result<Loan> {
        let mut tx = self.coordinator.begin("return book", &[keys::me_loans()]).await;

        let now = Utc::now();
        tx.stage::<Vec<Loan>>(&keys::me_loans(), |old| {
            old.map(|list| {
                list.iter()
                    .map(|loan| {
                        if loan.id == loan_id {
                            let mut loan = loan.clone();
                            loan.status = LoanStatus::Returned;
                            loan.returned_at = Some(now);
                            loan
                        } else {
                            loan.clone()
                        }
                    })
                    .collect()
            })
        });

        match loans::return_book(&self.api, loan_id).await {
            Ok(loan) => {
                tx.commit(
                    &[
                        keys::me_loans(),
                        keys::loans(),
                        keys::books(),
                        keys::book(loan.book_id),
                    ],
                    "Book returned successfully!",
                );
                Ok(loan)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    /// Review a book. A synthetic record (placeholder id, current user)
    /// is prepended to the cached review list until the server answers.
    pub async fn create_review(
        &self,
        book_id: i64,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Review> {
        let reviews_key = keys::book_reviews(book_id);
        let mut tx = self
            .coordinator
            .begin("add review", &[reviews_key.clone()])
            .await;

        if let Some(current) = self.session.user() {
            let now = Utc::now();
            let synthetic = Review {
                id: PLACEHOLDER_REVIEW_ID,
                star: rating,
                comment: comment.clone(),
                user_id: current.id,
                book_id,
                user: ReviewUser {
                    id: current.id,
                    name: current.name,
                    email: current.email,
                },
                book: None,
                created_at: now,
                updated_at: now,
            };
            tx.stage::<Vec<Review>>(&reviews_key, move |old| {
                old.map(|list| {
                    let mut updated = Vec::with_capacity(list.len() + 1);
                    updated.push(synthetic);
                    updated.extend(list.iter().cloned());
                    updated
                })
            });
        }

        let req = CreateReviewRequest { rating, comment };
        match reviews::create(&self.api, book_id, &req).await {
            Ok(review) => {
                tx.commit(
                    &[reviews_key, keys::book(book_id), keys::me_reviews()],
                    "Review added successfully!",
                );
                Ok(review)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    /// Delete a review. No optimistic removal; the row disappears on
    /// the post-success re-fetch.
    pub async fn delete_review(&self, review_id: i64) -> Result<()> {
        let tx = self.coordinator.begin("delete review", &[]).await;

        match reviews::delete(&self.api, review_id).await {
            Ok(()) => {
                tx.commit(
                    &[keys::reviews(), keys::books(), keys::me_reviews()],
                    "Review deleted successfully!",
                );
                Ok(())
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    /// Update the profile. Applied after success only; broadcasts
    /// `ProfileUpdated` so interested consumers refresh their display
    /// without a network call.
    pub async fn update_profile(&self, req: UpdateProfileRequest) -> Result<User> {
        let tx = self.coordinator.begin("update profile", &[]).await;

        match user::update_profile(&self.api, &req).await {
            Ok(updated) => {
                self.session.update_user(updated.clone());
                if let Some(token) = self.session.token() {
                    let refreshed = Session {
                        token,
                        user: updated.clone(),
                    };
                    if let Err(e) = self.credentials.save(&refreshed).await {
                        warn!(error = %e, "failed to persist session");
                    }
                }
                tx.commit(&[keys::me()], "Profile updated successfully!");
                Ok(updated)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    /// Store the session in memory and persist it. Persistence failure
    /// is not fatal to the sign-in itself.
    async fn persist_session(&self, session: Session) {
        if let Err(e) = self.credentials.save(&session).await {
            warn!(error = %e, "failed to persist session");
        }
        self.session.set(session);
    }
}
