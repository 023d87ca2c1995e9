//! Biblion - client-side data layer for a library-management API
//!
//! This crate is the data half of a library-management front end: typed
//! gateways over the remote HTTP API, a query cache with freshness
//! windows and in-flight de-duplication, a mutation coordinator with
//! optimistic updates and exact rollback, and pure view-model selectors.
//! The remote API owns all canonical state; biblion owns presentation
//! caches of it.
//!
//! # Example
//!
//! ```rust,no_run
//! use biblion::Biblion;
//!
//! #[tokio::main]
//! async fn main() -> biblion::Result<()> {
//!     let client = Biblion::builder()
//!         .base_url("https://library.example.com")
//!         .build()?;
//!
//!     client.login("ada@example.com", "secret").await?;
//!
//!     // Served from cache when fresh; one network call per key
//!     // regardless of how many concurrent readers ask.
//!     let books = client.books().await?;
//!     println!("{} books in the catalog", books.len());
//!
//!     // Optimistic: the cached copy count drops before the call
//!     // resolves, and rolls back exactly if it fails.
//!     client.borrow_book(books[0].id, None).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod error;
pub mod select;
pub mod session;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use cache::{
    EntryStatus, MutationGuard, MutationState, Notice, NoticeKind, QueryCache, QueryKey,
    ReadOptions, Snapshot, keys,
};
pub use client::{
    Biblion, BiblionBuilder, BookWithStatus, CachePolicy, EnrichedLoan, LibraryClient,
};
pub use error::{BiblionError, Result};
pub use session::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, Session, SessionEvent,
    SessionStore,
};
pub use transport::ApiClient;

// Re-export all domain types
pub use types::{
    Author, Book, BookAvailability, BookDetail, BorrowBookRequest, Category, CreateAuthorRequest,
    CreateCategoryRequest, CreateLoanRequest, CreateReviewRequest, Envelope, Loan,
    LoanBookSummary, LoanStats, LoanStatus, LoanUserSummary, LoginRequest, PageMeta,
    RegisterRequest, Review, ReviewBookSummary, ReviewUser, Role, UpdateAuthorRequest,
    UpdateCategoryRequest, UpdateLoanRequest, UpdateProfileRequest, User, UserProfile,
};
