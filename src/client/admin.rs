//! Admin read assembly and passthrough management calls.
//!
//! Reads here tolerate partial failure: a missing enrichment call
//! (overview counts, per-loan book detail) degrades to best-available
//! data instead of failing the whole read. Mutations never get that
//! tolerance.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future;
use tracing::warn;

use super::LibraryClient;
use crate::Result;
use crate::api::admin::{AdminOverview, OverdueLoans, OverviewBook};
use crate::api::{admin, books};
use crate::cache::keys;
use crate::types::{
    Author, Book, BookAvailability, BookDetail, Category, CreateAuthorRequest,
    CreateCategoryRequest, CreateLoanRequest, Loan, UpdateAuthorRequest, UpdateCategoryRequest,
    UpdateLoanRequest, UpsertBookRequest,
};

/// A catalog book with its derived availability band.
#[derive(Debug, Clone)]
pub struct BookWithStatus {
    pub book: Book,
    pub status: BookAvailability,
}

/// An overdue loan enriched with its book's detail, when that detail
/// could be fetched.
#[derive(Debug, Clone)]
pub struct EnrichedLoan {
    pub loan: Loan,
    pub book: Option<BookDetail>,
}

impl LibraryClient {
    /// Dashboard overview.
    pub async fn admin_overview(&self) -> Result<Arc<AdminOverview>> {
        let api = self.api.clone();
        self.cache
            .read(&keys::admin_overview(), self.policy.admin, move || async move {
                admin::overview(&api).await
            })
            .await
    }

    /// One page of overdue loans.
    pub async fn admin_overdue_loans(&self, page: u32, limit: u32) -> Result<Arc<OverdueLoans>> {
        let api = self.api.clone();
        self.cache
            .read(
                &keys::admin_overdue_loans(page, limit),
                self.policy.admin,
                move || async move { admin::overdue_loans(&api, page, limit).await },
            )
            .await
    }

    /// The catalog with per-book availability, merged with overview
    /// copy counts when the overview endpoint answers. An overview
    /// failure degrades to the plain book data.
    pub async fn admin_books_with_status(&self) -> Result<Arc<Vec<BookWithStatus>>> {
        let api = self.api.clone();
        self.cache
            .read(
                &keys::admin_books_with_status(),
                self.policy.admin,
                move || async move {
                    let list = books::list(&api).await?;

                    let top_borrowed: HashMap<i64, OverviewBook> =
                        match admin::overview(&api).await {
                            Ok(overview) => overview
                                .top_borrowed
                                .into_iter()
                                .map(|b| (b.id, b))
                                .collect(),
                            Err(e) => {
                                warn!(error = %e, "admin overview unavailable, using basic book data");
                                HashMap::new()
                            }
                        };

                    Ok(list
                        .into_iter()
                        .map(|mut book| {
                            if let Some(entry) = top_borrowed.get(&book.id) {
                                if let Some(available) = entry.available_copies {
                                    book.available_copies = available;
                                }
                                if let Some(total) = entry.total_copies {
                                    book.total_copies = total;
                                }
                                if let Some(borrows) = entry.borrow_count {
                                    book.borrow_count = borrows;
                                }
                            }
                            let status = BookAvailability::classify(
                                book.available_copies,
                                book.total_copies,
                            );
                            BookWithStatus { book, status }
                        })
                        .collect())
                },
            )
            .await
    }

    /// Overdue loans enriched with each book's detail. Enrichment
    /// fetches run concurrently; a failed one falls back to the loan's
    /// embedded book summary. An empty overdue set yields an empty list.
    pub async fn admin_borrowed_books(&self) -> Result<Arc<Vec<EnrichedLoan>>> {
        let api = self.api.clone();
        self.cache
            .read(
                &keys::admin_borrowed_books(),
                self.policy.admin,
                move || async move {
                    let page = admin::overdue_loans(&api, 1, 20).await?;

                    let details = future::join_all(page.overdue.iter().map(|loan| {
                        let api = api.clone();
                        let book_id = loan.book_id;
                        async move {
                            match books::get(&api, book_id).await {
                                Ok(detail) => Some(detail),
                                Err(e) => {
                                    warn!(book_id, error = %e,
                                        "loan enrichment failed, keeping embedded summary");
                                    None
                                }
                            }
                        }
                    }))
                    .await;

                    Ok(page
                        .overdue
                        .into_iter()
                        .zip(details)
                        .map(|(loan, book)| EnrichedLoan { loan, book })
                        .collect())
                },
            )
            .await
    }

    /// All authors, cached under the admin namespace.
    pub async fn admin_authors(&self) -> Result<Arc<Vec<Author>>> {
        let api = self.api.clone();
        self.cache
            .read(&keys::admin_authors(), self.policy.admin, move || async move {
                admin::authors(&api).await
            })
            .await
    }

    /// All categories, cached under the admin namespace.
    pub async fn admin_categories(&self) -> Result<Arc<Vec<Category>>> {
        let api = self.api.clone();
        self.cache
            .read(
                &keys::admin_categories(),
                self.policy.admin,
                move || async move { admin::categories(&api).await },
            )
            .await
    }

    // Management mutations. No optimistic writes: admin screens always
    // re-read after a change, so these settle through the coordinator
    // for notices and invalidation only.

    pub async fn admin_create_loan(&self, req: CreateLoanRequest) -> Result<Loan> {
        let tx = self.coordinator.begin("create loan", &[]).await;
        match admin::create_loan(&self.api, &req).await {
            Ok(loan) => {
                tx.commit(&[keys::loans(), keys::admin()], "Loan created successfully!");
                Ok(loan)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn admin_update_loan(&self, loan_id: i64, req: UpdateLoanRequest) -> Result<Loan> {
        let tx = self.coordinator.begin("update loan", &[]).await;
        match admin::update_loan(&self.api, loan_id, &req).await {
            Ok(loan) => {
                tx.commit(&[keys::loans(), keys::admin()], "Loan updated successfully!");
                Ok(loan)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn admin_create_book(&self, req: UpsertBookRequest) -> Result<Book> {
        let tx = self.coordinator.begin("create book", &[]).await;
        match books::create(&self.api, &req).await {
            Ok(book) => {
                tx.commit(&[keys::books(), keys::admin()], "Book created successfully!");
                Ok(book)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn admin_update_book(&self, book_id: i64, req: UpsertBookRequest) -> Result<Book> {
        let tx = self.coordinator.begin("update book", &[]).await;
        match books::update(&self.api, book_id, &req).await {
            Ok(book) => {
                tx.commit(
                    &[keys::books(), keys::book(book_id), keys::admin()],
                    "Book updated successfully!",
                );
                Ok(book)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn admin_delete_book(&self, book_id: i64) -> Result<()> {
        let tx = self.coordinator.begin("delete book", &[]).await;
        match books::delete(&self.api, book_id).await {
            Ok(()) => {
                tx.commit(
                    &[keys::books(), keys::book(book_id), keys::admin()],
                    "Book deleted successfully!",
                );
                Ok(())
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn admin_create_author(&self, req: CreateAuthorRequest) -> Result<Author> {
        let tx = self.coordinator.begin("create author", &[]).await;
        match admin::create_author(&self.api, &req).await {
            Ok(author) => {
                tx.commit(&[keys::books(), keys::admin()], "Author created successfully!");
                Ok(author)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn admin_update_author(&self, id: i64, req: UpdateAuthorRequest) -> Result<Author> {
        let tx = self.coordinator.begin("update author", &[]).await;
        match admin::update_author(&self.api, id, &req).await {
            Ok(author) => {
                tx.commit(&[keys::books(), keys::admin()], "Author updated successfully!");
                Ok(author)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn admin_delete_author(&self, id: i64) -> Result<()> {
        let tx = self.coordinator.begin("delete author", &[]).await;
        match admin::delete_author(&self.api, id).await {
            Ok(()) => {
                tx.commit(&[keys::books(), keys::admin()], "Author deleted successfully!");
                Ok(())
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn admin_create_category(&self, req: CreateCategoryRequest) -> Result<Category> {
        let tx = self.coordinator.begin("create category", &[]).await;
        match admin::create_category(&self.api, &req).await {
            Ok(category) => {
                tx.commit(
                    &[keys::books(), keys::admin()],
                    "Category created successfully!",
                );
                Ok(category)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn admin_update_category(
        &self,
        id: i64,
        req: UpdateCategoryRequest,
    ) -> Result<Category> {
        let tx = self.coordinator.begin("update category", &[]).await;
        match admin::update_category(&self.api, id, &req).await {
            Ok(category) => {
                tx.commit(
                    &[keys::books(), keys::admin()],
                    "Category updated successfully!",
                );
                Ok(category)
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn admin_delete_category(&self, id: i64) -> Result<()> {
        let tx = self.coordinator.begin("delete category", &[]).await;
        match admin::delete_category(&self.api, id).await {
            Ok(()) => {
                tx.commit(
                    &[keys::books(), keys::admin()],
                    "Category deleted successfully!",
                );
                Ok(())
            }
            Err(e) => {
                tx.fail(&e);
                Err(e)
            }
        }
    }
}
