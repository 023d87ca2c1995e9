//! Loan gateway: `/api/loans*`.

use crate::Result;
use crate::transport::ApiClient;
use crate::types::{BorrowBookRequest, Loan};

pub async fn borrow(api: &ApiClient, req: &BorrowBookRequest) -> Result<Loan> {
    api.post("/api/loans", Some(req), "borrow book").await
}

pub async fn return_book(api: &ApiClient, loan_id: i64) -> Result<Loan> {
    api.put(
        &format!("/api/loans/{loan_id}/return"),
        None::<&()>,
        "return book",
    )
    .await
}
