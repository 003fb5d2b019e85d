use crate::models::{
    Author, AuthorDraft, Book, BookDraft, CreateAuthorError, CreateBookError, DeleteAuthorError,
    DeleteBookError, DeleteBooksByTitleError, FindAllAuthorsError, FindAllBooksError,
    FindAuthorByNameError, FindAuthorError, FindBookByTitleError, FindBookError,
    UpdateAuthorError, UpdateBookError,
};
use async_trait::async_trait;

#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError>;

    async fn find_book(&self, id: i64) -> Result<Book, FindBookError>;

    async fn find_book_by_title(&self, title: &str) -> Result<Book, FindBookByTitleError>;

    async fn find_books_by_author(&self, author_id: i64) -> Result<Vec<Book>, FindAllBooksError>;

    /// Inserts the book, checking that its author exists in the same transaction.
    async fn create_book(&self, draft: &BookDraft) -> Result<Book, CreateBookError>;

    async fn update_book(&self, id: i64, draft: &BookDraft) -> Result<(), UpdateBookError>;

    async fn delete_book(&self, id: i64) -> Result<(), DeleteBookError>;

    /// Deletes every book carrying `title`, returning how many were removed.
    async fn delete_books_by_title(&self, title: &str) -> Result<u64, DeleteBooksByTitleError>;
}

#[async_trait]
pub trait AuthorRepository: Send + Sync + 'static {
    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError>;

    async fn find_author(&self, id: i64) -> Result<Author, FindAuthorError>;

    async fn find_author_by_name(&self, name: &str) -> Result<Author, FindAuthorByNameError>;

    async fn create_author(&self, draft: &AuthorDraft) -> Result<Author, CreateAuthorError>;

    async fn update_author(&self, id: i64, draft: &AuthorDraft) -> Result<(), UpdateAuthorError>;

    /// Deletes the author row; its books go with it through the schema's cascade.
    async fn delete_author(&self, id: i64) -> Result<(), DeleteAuthorError>;

    /// Deletes the author's books and then the author, as one transaction.
    async fn delete_author_books(&self, author_id: i64) -> Result<(), DeleteAuthorError>;
}

/// Everything the HTTP layer needs from storage.
pub trait Store: BookRepository + AuthorRepository {}

impl<T: BookRepository + AuthorRepository> Store for T {}
