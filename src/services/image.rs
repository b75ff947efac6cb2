//! Placeholder cover images for listings without a photo.

use chrono::Utc;
use sha2::{Digest, Sha256};

const PLACEHOLDER_HOST: &str = "https://picsum.photos/seed";
const WIDTH: u32 = 300;
const HEIGHT: u32 = 450;
const DEFAULT_KEYWORD: &str = "book";

/// Category (lowercased) to image keyword.
const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("fiction", "novel"),
    ("non-fiction", "library"),
    ("nonfiction", "library"),
    ("children", "kids"),
    ("science", "science"),
    ("history", "history"),
    ("biography", "portrait"),
    ("fantasy", "fantasy"),
    ("romance", "romance"),
    ("mystery", "mystery"),
    ("thriller", "noir"),
    ("self-help", "sunrise"),
    ("cooking", "food"),
    ("travel", "travel"),
    ("art", "art"),
    ("poetry", "poetry"),
];

/// Keyword seed for a category, `book` when unknown.
pub fn category_keyword(category: &str) -> &'static str {
    let key = category.trim().to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, keyword)| *keyword)
        .unwrap_or(DEFAULT_KEYWORD)
}

/// Short stable hash of the ISBN, else the title, else the current time.
fn seed_hash(isbn: &str, title: &str) -> String {
    let source = if !isbn.trim().is_empty() {
        isbn.trim().to_string()
    } else if !title.trim().is_empty() {
        title.trim().to_string()
    } else {
        Utc::now().timestamp_millis().to_string()
    };
    let digest = Sha256::digest(source.as_bytes());
    hex::encode(&digest[..4])
}

/// Build a placeholder cover URL.
///
/// Deterministic for a given (isbn-or-title, category) pair so repeated
/// renders of the same book show the same image.
pub fn placeholder_url(isbn: &str, title: &str, category: &str) -> String {
    format!(
        "{}/{}-{}/{}/{}",
        PLACEHOLDER_HOST,
        seed_hash(isbn, title),
        category_keyword(category),
        WIDTH,
        HEIGHT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = placeholder_url("9780140449136", "The Odyssey", "History");
        let b = placeholder_url("9780140449136", "The Odyssey", "History");
        assert_eq!(a, b);
    }

    #[test]
    fn test_isbn_preferred_over_title() {
        let a = placeholder_url("9780140449136", "The Odyssey", "History");
        let b = placeholder_url("9780140449136", "Different Title", "History");
        assert_eq!(a, b);
        assert_ne!(a, placeholder_url("", "The Odyssey", "History"));
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(category_keyword("Fiction"), "novel");
        assert_eq!(category_keyword("Underwater Basket Weaving"), "book");
        let url = placeholder_url("", "Dune", "unknown");
        assert!(url.starts_with("https://picsum.photos/seed/"));
        assert!(url.ends_with("-book/300/450"));
    }
}
