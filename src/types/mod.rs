//! Public types for the biblion API.

mod book;
mod envelope;
mod loan;
mod request;
mod review;
mod user;

pub use book::{Author, Book, BookAvailability, BookDetail, Category};
pub use envelope::{Envelope, PageMeta};
pub use loan::{Loan, LoanBookSummary, LoanStatus, LoanUserSummary};
pub use request::{
    BorrowBookRequest, CreateAuthorRequest, CreateCategoryRequest, CreateLoanRequest,
    CreateReviewRequest, LoginRequest, RegisterRequest, UpdateAuthorRequest,
    UpdateCategoryRequest, UpdateLoanRequest, UpdateProfileRequest, UpsertBookRequest,
};
pub use review::{Review, ReviewBookSummary, ReviewUser};
pub(crate) use review::PLACEHOLDER_REVIEW_ID;
pub use user::{LoanStats, Role, User, UserProfile};
