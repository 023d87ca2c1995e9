//! Book catalog gateway: `/api/books*`.

use serde::Deserialize;

use crate::Result;
use crate::transport::ApiClient;
use crate::types::{Book, BookDetail, UpsertBookRequest};

#[derive(Debug, Clone, Deserialize)]
struct BooksData {
    books: Vec<Book>,
}

pub async fn list(api: &ApiClient) -> Result<Vec<Book>> {
    let data: BooksData = api.get("/api/books", "fetch books").await?;
    Ok(data.books)
}

pub async fn get(api: &ApiClient, id: i64) -> Result<BookDetail> {
    api.get(&format!("/api/books/{id}"), "fetch book").await
}

pub async fn recommended(api: &ApiClient) -> Result<Vec<Book>> {
    let data: BooksData = api
        .get("/api/books/recommended", "fetch recommended books")
        .await?;
    Ok(data.books)
}

// Admin-only book management.

pub async fn create(api: &ApiClient, req: &UpsertBookRequest) -> Result<Book> {
    api.post("/api/books", Some(req), "create book").await
}

pub async fn update(api: &ApiClient, id: i64, req: &UpsertBookRequest) -> Result<Book> {
    api.put(&format!("/api/books/{id}"), Some(req), "update book")
        .await
}

pub async fn delete(api: &ApiClient, id: i64) -> Result<()> {
    api.delete(&format!("/api/books/{id}"), "delete book").await
}
