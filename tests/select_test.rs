//! Tests for the view-model selectors.

use chrono::Utc;

use biblion::select::{filter_books, popular_authors, top_rated};
use biblion::{Author, Book, Category};

fn make_book(id: i64, title: &str, author: (i64, &str), category: &str, rating: f32) -> Book {
    let now = Utc::now();
    Book {
        id,
        title: title.to_string(),
        description: None,
        isbn: format!("isbn-{id}"),
        published_year: 1990,
        cover_image: None,
        rating,
        review_count: 0,
        total_copies: 3,
        available_copies: 3,
        borrow_count: 0,
        pages: None,
        author_id: author.0,
        category_id: 1,
        author: Author {
            id: author.0,
            name: author.1.to_string(),
            bio: None,
            avatar: None,
            book_count: None,
        },
        category: Category {
            id: 1,
            name: category.to_string(),
            description: None,
        },
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn top_rated_excludes_zero_and_takes_best() {
    let books = vec![
        make_book(1, "A", (1, "Ann"), "Fiction", 0.0),
        make_book(2, "B", (1, "Ann"), "Fiction", 5.0),
        make_book(3, "C", (2, "Bo"), "Fiction", 3.0),
        make_book(4, "D", (2, "Bo"), "Fiction", 5.0),
        make_book(5, "E", (3, "Cy"), "Fiction", 0.0),
    ];

    let top = top_rated(&books, 2);

    assert_eq!(top.len(), 2);
    // Both rating-5 books appear; order between equals is unspecified.
    let ids: Vec<i64> = top.iter().map(|b| b.id).collect();
    assert!(ids.contains(&2));
    assert!(ids.contains(&4));
}

#[test]
fn top_rated_with_fewer_rated_books_than_limit() {
    let books = vec![
        make_book(1, "A", (1, "Ann"), "Fiction", 0.0),
        make_book(2, "B", (1, "Ann"), "Fiction", 4.0),
    ];

    let top = top_rated(&books, 5);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, 2);
}

#[test]
fn popular_authors_ranks_by_book_count() {
    let books = vec![
        make_book(1, "A", (1, "Ann"), "Fiction", 4.0),
        make_book(2, "B", (1, "Ann"), "Fiction", 4.0),
        make_book(3, "C", (1, "Ann"), "Fiction", 4.0),
        make_book(4, "D", (2, "Bo"), "Fiction", 4.0),
        make_book(5, "E", (2, "Bo"), "Fiction", 4.0),
        make_book(6, "F", (3, "Cy"), "Fiction", 4.0),
    ];

    let authors = popular_authors(&books, 2);

    assert_eq!(authors.len(), 2);
    assert_eq!(authors[0].name, "Ann");
    assert_eq!(authors[0].book_count, Some(3));
    assert_eq!(authors[1].name, "Bo");
    assert_eq!(authors[1].book_count, Some(2));
}

#[test]
fn filter_matches_title_author_and_category_case_insensitively() {
    let books = vec![
        make_book(1, "Dune", (1, "Frank Herbert"), "Science Fiction", 4.0),
        make_book(2, "Emma", (2, "Jane Austen"), "Romance", 4.0),
        make_book(3, "Persuasion", (2, "Jane Austen"), "Romance", 4.0),
    ];

    assert_eq!(filter_books(&books, "DUNE").len(), 1);
    assert_eq!(filter_books(&books, "austen").len(), 2);
    assert_eq!(filter_books(&books, "romance").len(), 2);
    assert_eq!(filter_books(&books, "zzz").len(), 0);
}

#[test]
fn blank_query_returns_everything() {
    let books = vec![
        make_book(1, "Dune", (1, "Frank Herbert"), "Science Fiction", 4.0),
        make_book(2, "Emma", (2, "Jane Austen"), "Romance", 4.0),
    ];

    assert_eq!(filter_books(&books, "").len(), 2);
    assert_eq!(filter_books(&books, "   ").len(), 2);
}
