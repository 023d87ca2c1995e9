//! Wiremock tests for the admin read assembly: overview merging and
//! partial-failure tolerance for read enrichment.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use biblion::{Biblion, BookAvailability, LibraryClient};

fn book_json(id: i64, title: &str, available: u32, total: u32) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "isbn": "978-3-16-148410-0",
        "publishedYear": 1965,
        "rating": 4.5,
        "reviewCount": 2,
        "totalCopies": total,
        "availableCopies": available,
        "borrowCount": 10,
        "authorId": 1,
        "categoryId": 1,
        "author": {"id": 1, "name": "Frank Herbert"},
        "category": {"id": 1, "name": "Science Fiction"},
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z",
    })
}

fn loan_json(id: i64, book_id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "userId": 1,
        "bookId": book_id,
        "status": "OVERDUE",
        "borrowedAt": "2024-05-01T00:00:00Z",
        "dueAt": "2024-05-15T00:00:00Z",
        "createdAt": "2024-05-01T00:00:00Z",
        "updatedAt": "2024-05-01T00:00:00Z",
        "book": {"id": book_id, "title": "Dune"},
    })
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({"success": true, "data": data})
}

fn client_for(server: &MockServer) -> LibraryClient {
    Biblion::builder()
        .base_url(server.uri())
        .build()
        .expect("client builds")
}

#[tokio::test]
async fn books_with_status_merges_overview_copy_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "books": [book_json(1, "Dune", 3, 3), book_json(2, "Hyperion", 1, 2)],
        }))))
        .mount(&server)
        .await;
    // Overview reports book 1 fully borrowed; the list said available.
    Mock::given(method("GET"))
        .and(path("/api/admin/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "topBorrowed": [
                {"id": 1, "title": "Dune", "availableCopies": 0, "totalCopies": 3, "borrowCount": 12},
            ],
        }))))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let books = client.admin_books_with_status().await.expect("assembly");

    assert_eq!(books.len(), 2);
    let dune = books.iter().find(|b| b.book.id == 1).expect("dune");
    assert_eq!(dune.book.available_copies, 0, "overview counts win");
    assert_eq!(dune.book.borrow_count, 12);
    assert_eq!(dune.status, BookAvailability::Borrowed);

    let hyperion = books.iter().find(|b| b.book.id == 2).expect("hyperion");
    assert_eq!(hyperion.status, BookAvailability::Returned);
}

#[tokio::test]
async fn books_with_status_tolerates_overview_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "books": [book_json(1, "Dune", 3, 3)],
        }))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/overview"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let books = client
        .admin_books_with_status()
        .await
        .expect("degrades to plain book data");

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].book.available_copies, 3);
    assert_eq!(books[0].status, BookAvailability::Available);
}

#[tokio::test]
async fn borrowed_books_enriches_and_tolerates_detail_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/loans/overdue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "overdue": [loan_json(1, 1), loan_json(2, 2)],
        }))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/books/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(book_json(1, "Dune", 0, 3))))
        .mount(&server)
        .await;
    // Book 2's detail is unavailable; the loan keeps its embedded summary.
    Mock::given(method("GET"))
        .and(path("/api/books/2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let loans = client.admin_borrowed_books().await.expect("assembly");

    assert_eq!(loans.len(), 2);
    let enriched = loans.iter().find(|l| l.loan.id == 1).expect("loan 1");
    assert_eq!(
        enriched.book.as_ref().expect("detail").book.title,
        "Dune"
    );
    let degraded = loans.iter().find(|l| l.loan.id == 2).expect("loan 2");
    assert!(degraded.book.is_none());
    assert_eq!(
        degraded.loan.book.as_ref().expect("summary").title,
        "Dune"
    );
}

#[tokio::test]
async fn borrowed_books_with_no_overdue_loans_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/loans/overdue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"overdue": []}))))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let loans = client.admin_borrowed_books().await.expect("assembly");
    assert!(loans.is_empty(), "no placeholder records are fabricated");
}

#[tokio::test]
async fn overdue_loan_mutation_failure_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/loans"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"success": false, "message": "book has no copies left"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .admin_create_loan(biblion::CreateLoanRequest {
            user_id: 1,
            book_id: 1,
            due_at: None,
        })
        .await;

    match result {
        Err(biblion::BiblionError::Api { status, message }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "book has no copies left");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}
