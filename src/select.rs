//! View-model selectors.
//!
//! Pure projections over already-cached list data. Selectors never
//! fetch; they operate on whatever the caller read from the cache,
//! including partially stale data.

use std::collections::HashMap;

use crate::types::{Author, Book};

/// Books with a rating above zero, best first, at most `limit`.
///
/// Relative order between equal ratings is unspecified beyond sort
/// stability.
pub fn top_rated(books: &[Book], limit: usize) -> Vec<Book> {
    let mut rated: Vec<Book> = books.iter().filter(|b| b.rating > 0.0).cloned().collect();
    rated.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    rated.truncate(limit);
    rated
}

/// Authors ranked by how many books they have in the list, at most
/// `limit`, each carrying its book count.
pub fn popular_authors(books: &[Book], limit: usize) -> Vec<Author> {
    let mut counts: HashMap<i64, (Author, u32)> = HashMap::new();
    for book in books {
        counts
            .entry(book.author.id)
            .and_modify(|(_, n)| *n += 1)
            .or_insert_with(|| (book.author.clone(), 1));
    }

    let mut authors: Vec<(Author, u32)> = counts.into_values().collect();
    authors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.id.cmp(&b.0.id)));
    authors.truncate(limit);
    authors
        .into_iter()
        .map(|(mut author, n)| {
            author.book_count = Some(n);
            author
        })
        .collect()
}

/// Case-insensitive substring filter over title, author name, and
/// category name. A blank query returns the list unchanged.
pub fn filter_books(books: &[Book], query: &str) -> Vec<Book> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return books.to_vec();
    }
    books
        .iter()
        .filter(|b| {
            b.title.to_lowercase().contains(&query)
                || b.author.name.to_lowercase().contains(&query)
                || b.category.name.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}
