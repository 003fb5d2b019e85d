use crate::models::{Author, Book};

/// Records written once, when the database is first created.
///
/// Rows keep their ids so books can reference their authors.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    authors: Vec<Author>,
    books: Vec<Book>,
}

impl SeedData {
    pub const fn new(authors: Vec<Author>, books: Vec<Book>) -> Self {
        Self { authors, books }
    }

    /// The demo catalog served out of the box.
    pub fn demo() -> Self {
        let authors = vec![
            Author::new(1, "Swaroop C. H.".into(), "SCW".into()),
            Author::new(2, "Herman Melville".into(), "HM".into()),
            Author::new(3, "Leo Tolstoy".into(), "LT".into()),
        ];
        let books = vec![
            Book::new(0, "A Byte of Python".into(), 1),
            Book::new(1, "Moby-Dick; or, The Whale".into(), 2),
            Book::new(3, "War and Peace".into(), 3),
        ];
        Self::new(authors, books)
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }
}
