//! Admin gateway: `/api/admin/*` plus author and category management.
//!
//! The admin screens themselves live outside this crate; these functions
//! are the gateway surface they consume.

use serde::Deserialize;

use crate::Result;
use crate::transport::ApiClient;
use crate::types::{
    Author, Category, CreateAuthorRequest, CreateCategoryRequest, CreateLoanRequest, Loan,
    PageMeta, UpdateAuthorRequest, UpdateCategoryRequest, UpdateLoanRequest,
};

/// A top-borrowed entry in the overview. The server reports a trimmed
/// book record here; copy counts are not always present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewBook {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub available_copies: Option<u32>,
    #[serde(default)]
    pub total_copies: Option<u32>,
    #[serde(default)]
    pub borrow_count: Option<u32>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

/// Dashboard overview payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    #[serde(default)]
    pub total_books: Option<u64>,
    #[serde(default)]
    pub total_users: Option<u64>,
    #[serde(default)]
    pub total_loans: Option<u64>,
    #[serde(default)]
    pub top_borrowed: Vec<OverviewBook>,
}

/// Overdue-loan page payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OverdueLoans {
    #[serde(default)]
    pub overdue: Vec<Loan>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

pub async fn overview(api: &ApiClient) -> Result<AdminOverview> {
    api.get("/api/admin/overview", "fetch admin overview").await
}

pub async fn overdue_loans(api: &ApiClient, page: u32, limit: u32) -> Result<OverdueLoans> {
    api.get(
        &format!("/api/admin/loans/overdue?page={page}&limit={limit}"),
        "fetch overdue loans",
    )
    .await
}

pub async fn create_loan(api: &ApiClient, req: &CreateLoanRequest) -> Result<Loan> {
    api.post("/api/admin/loans", Some(req), "create loan").await
}

pub async fn update_loan(api: &ApiClient, loan_id: i64, req: &UpdateLoanRequest) -> Result<Loan> {
    api.patch(&format!("/api/admin/loans/{loan_id}"), req, "update loan")
        .await
}

// Authors.

pub async fn authors(api: &ApiClient) -> Result<Vec<Author>> {
    api.get("/api/authors", "fetch authors").await
}

pub async fn create_author(api: &ApiClient, req: &CreateAuthorRequest) -> Result<Author> {
    api.post("/api/authors", Some(req), "create author").await
}

pub async fn update_author(api: &ApiClient, id: i64, req: &UpdateAuthorRequest) -> Result<Author> {
    api.put(&format!("/api/authors/{id}"), Some(req), "update author")
        .await
}

pub async fn delete_author(api: &ApiClient, id: i64) -> Result<()> {
    api.delete(&format!("/api/authors/{id}"), "delete author")
        .await
}

// Categories.

pub async fn categories(api: &ApiClient) -> Result<Vec<Category>> {
    api.get("/api/categories", "fetch categories").await
}

pub async fn create_category(api: &ApiClient, req: &CreateCategoryRequest) -> Result<Category> {
    api.post("/api/categories", Some(req), "create category")
        .await
}

pub async fn update_category(
    api: &ApiClient,
    id: i64,
    req: &UpdateCategoryRequest,
) -> Result<Category> {
    api.put(&format!("/api/categories/{id}"), Some(req), "update category")
        .await
}

pub async fn delete_category(api: &ApiClient, id: i64) -> Result<()> {
    api.delete(&format!("/api/categories/{id}"), "delete category")
        .await
}
