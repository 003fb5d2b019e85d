use crate::models::{
    Author, AuthorDraft, Book, BookDraft, CreateAuthorError, CreateBookError, DeleteAuthorError,
    DeleteBookError, DeleteBooksByTitleError, FindAllAuthorsError, FindAllBooksError,
    FindAuthorByNameError, FindAuthorError, FindBookByTitleError, FindBookError,
    UpdateAuthorError, UpdateBookError,
};
use crate::repositories::{AuthorRepository, BookRepository};
use crate::seed::SeedData;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

const CREATE_AUTHORS_TABLE: &str = "CREATE TABLE authors (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name_author TEXT NOT NULL,
    fill_name TEXT NOT NULL DEFAULT ''
)";

const CREATE_BOOKS_TABLE: &str = "CREATE TABLE books (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    title TEXT NOT NULL,
    author_id INTEGER NOT NULL,
    FOREIGN KEY (author_id) REFERENCES authors (id) ON DELETE CASCADE
)";

#[derive(Debug, Clone)]
pub struct Sqlite {
    pool: SqlitePool,
}

impl Sqlite {
    /// Opens (creating if needed) the database at `url` and seeds it on first use.
    pub async fn connect(url: &str, seed: &SeedData) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url {url}"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePool::connect_with(opts)
            .await
            .with_context(|| format!("Failed to open database at {url}"))?;

        let db = Self { pool };
        db.initialize(seed).await?;
        Ok(db)
    }

    /// A private in-memory database.
    ///
    /// The pool holds exactly one connection that is never recycled, since every
    /// connection to `:memory:` would otherwise see its own empty database.
    pub async fn in_memory(seed: &SeedData) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory database url")?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.initialize(seed).await?;
        Ok(db)
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates both tables and writes `seed`, unless the `books` table already exists.
    ///
    /// Returns whether the schema was created.
    pub async fn initialize(&self, seed: &SeedData) -> anyhow::Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin schema transaction")?;

        let existing: Option<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind("books")
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to look up existing tables")?;
        if existing.is_some() {
            debug!("books table already present, skipping seed");
            return Ok(false);
        }

        sqlx::query(CREATE_AUTHORS_TABLE)
            .execute(&mut *tx)
            .await
            .context("Failed to create authors table")?;
        sqlx::query(CREATE_BOOKS_TABLE)
            .execute(&mut *tx)
            .await
            .context("Failed to create books table")?;

        for author in seed.authors() {
            sqlx::query("INSERT INTO authors (id, name_author, fill_name) VALUES (?, ?, ?)")
                .bind(author.id())
                .bind(author.name_author())
                .bind(author.fill_name())
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to seed author {}", author.id()))?;
        }
        for book in seed.books() {
            sqlx::query("INSERT INTO books (id, title, author_id) VALUES (?, ?, ?)")
                .bind(book.id())
                .bind(book.title())
                .bind(book.author_id())
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to seed book {}", book.id()))?;
        }

        tx.commit()
            .await
            .context("Failed to commit schema transaction")?;
        info!(
            authors = seed.authors().len(),
            books = seed.books().len(),
            "created database schema"
        );
        Ok(true)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let title = row.try_get("title")?;
        let author_id = row.try_get("author_id")?;
        Ok(Self::new(id, title, author_id))
    }
}

impl<'r> FromRow<'r, SqliteRow> for Author {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let name_author = row.try_get("name_author")?;
        let fill_name = row.try_get("fill_name")?;
        Ok(Self::new(id, name_author, fill_name))
    }
}

#[async_trait]
impl BookRepository for Sqlite {
    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError> {
        let books = sqlx::query_as("SELECT id, title, author_id FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context("Failed to retrieve all books");
                FindAllBooksError(err)
            })?;

        Ok(books)
    }

    async fn find_book(&self, id: i64) -> Result<Book, FindBookError> {
        let book = sqlx::query_as("SELECT id, title, author_id FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| {
                let err =
                    anyhow!(err).context(format!(r#"Failed to retrieve book with id "{id}""#));
                FindBookError::Other(err)
            })?;

        book.ok_or(FindBookError::NotFound { id })
    }

    async fn find_book_by_title(&self, title: &str) -> Result<Book, FindBookByTitleError> {
        let book =
            sqlx::query_as("SELECT id, title, author_id FROM books WHERE title = ? ORDER BY id")
                .bind(title)
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| {
                    let err = anyhow!(err)
                        .context(format!(r#"Failed to retrieve book with title "{title}""#));
                    FindBookByTitleError::Other(err)
                })?;

        book.ok_or_else(|| FindBookByTitleError::NotFound {
            title: title.to_string(),
        })
    }

    async fn find_books_by_author(&self, author_id: i64) -> Result<Vec<Book>, FindAllBooksError> {
        let books =
            sqlx::query_as("SELECT id, title, author_id FROM books WHERE author_id = ? ORDER BY id")
                .bind(author_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|err| {
                    let err = anyhow!(err).context(format!(
                        r#"Failed to retrieve books of author with id "{author_id}""#
                    ));
                    FindAllBooksError(err)
                })?;

        Ok(books)
    }

    async fn create_book(&self, draft: &BookDraft) -> Result<Book, CreateBookError> {
        let author_id = draft.author_id();

        // The foreign key checks the author inside the insert itself.
        let book = sqlx::query_as(
            "INSERT INTO books (title, author_id) VALUES (?, ?) RETURNING id, title, author_id",
        )
        .bind(draft.title())
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                return CreateBookError::UnknownAuthor { author_id };
            }
            let err = anyhow!(err).context(format!(
                r#"Failed to create book with title "{}""#,
                draft.title()
            ));
            CreateBookError::Other(err)
        })?;

        Ok(book)
    }

    async fn update_book(&self, id: i64, draft: &BookDraft) -> Result<(), UpdateBookError> {
        let author_id = draft.author_id();

        // A missing row matches nothing, so no foreign key check runs for it.
        let result = sqlx::query("UPDATE books SET title = ?, author_id = ? WHERE id = ?")
            .bind(draft.title())
            .bind(author_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    return UpdateBookError::UnknownAuthor { author_id };
                }
                let err =
                    anyhow!(err).context(format!(r#"Failed to update book with id "{id}""#));
                UpdateBookError::Other(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(UpdateBookError::NotFound { id });
        }
        Ok(())
    }

    async fn delete_book(&self, id: i64) -> Result<(), DeleteBookError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                anyhow!(err).context(format!(r#"Failed to delete book with id "{id}""#))
            })?;

        if result.rows_affected() == 0 {
            return Err(DeleteBookError::NotFound { id });
        }
        Ok(())
    }

    async fn delete_books_by_title(&self, title: &str) -> Result<u64, DeleteBooksByTitleError> {
        let result = sqlx::query("DELETE FROM books WHERE title = ?")
            .bind(title)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                anyhow!(err).context(format!(r#"Failed to delete books with title "{title}""#))
            })?;

        match result.rows_affected() {
            0 => Err(DeleteBooksByTitleError::NotFound {
                title: title.to_string(),
            }),
            n => Ok(n),
        }
    }
}

#[async_trait]
impl AuthorRepository for Sqlite {
    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError> {
        let authors = sqlx::query_as("SELECT id, name_author, fill_name FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context("Failed to retrieve all authors");
                FindAllAuthorsError(err)
            })?;

        Ok(authors)
    }

    async fn find_author(&self, id: i64) -> Result<Author, FindAuthorError> {
        let author = sqlx::query_as("SELECT id, name_author, fill_name FROM authors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| {
                let err =
                    anyhow!(err).context(format!(r#"Failed to retrieve author with id "{id}""#));
                FindAuthorError::Other(err)
            })?;

        author.ok_or(FindAuthorError::NotFound { id })
    }

    async fn find_author_by_name(&self, name: &str) -> Result<Author, FindAuthorByNameError> {
        let author = sqlx::query_as(
            "SELECT id, name_author, fill_name FROM authors WHERE name_author = ? ORDER BY id",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            let err =
                anyhow!(err).context(format!(r#"Failed to retrieve author with name "{name}""#));
            FindAuthorByNameError::Other(err)
        })?;

        author.ok_or_else(|| FindAuthorByNameError::NotFound {
            name: name.to_string(),
        })
    }

    async fn create_author(&self, draft: &AuthorDraft) -> Result<Author, CreateAuthorError> {
        let author = sqlx::query_as(
            "INSERT INTO authors (name_author, fill_name) VALUES (?, ?) \
             RETURNING id, name_author, fill_name",
        )
        .bind(draft.name_author())
        .bind(draft.fill_name())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            let err = anyhow!(err).context(format!(
                r#"Failed to create author with name "{}""#,
                draft.name_author()
            ));
            CreateAuthorError(err)
        })?;

        Ok(author)
    }

    async fn update_author(&self, id: i64, draft: &AuthorDraft) -> Result<(), UpdateAuthorError> {
        let result = sqlx::query("UPDATE authors SET name_author = ?, fill_name = ? WHERE id = ?")
            .bind(draft.name_author())
            .bind(draft.fill_name())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                let err =
                    anyhow!(err).context(format!(r#"Failed to update author with id "{id}""#));
                UpdateAuthorError::Other(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(UpdateAuthorError::NotFound { id });
        }
        Ok(())
    }

    async fn delete_author(&self, id: i64) -> Result<(), DeleteAuthorError> {
        let result = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                anyhow!(err).context(format!(r#"Failed to delete author with id "{id}""#))
            })?;

        if result.rows_affected() == 0 {
            return Err(DeleteAuthorError::NotFound { id });
        }
        Ok(())
    }

    async fn delete_author_books(&self, author_id: i64) -> Result<(), DeleteAuthorError> {
        let context = || format!(r#"Failed to delete books of author with id "{author_id}""#);

        let mut tx = self.pool.begin().await.with_context(context)?;
        let books = sqlx::query("DELETE FROM books WHERE author_id = ?")
            .bind(author_id)
            .execute(&mut *tx)
            .await
            .with_context(context)?;
        let authors = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(author_id)
            .execute(&mut *tx)
            .await
            .with_context(context)?;
        if authors.rows_affected() == 0 {
            return Err(DeleteAuthorError::NotFound { id: author_id });
        }
        tx.commit().await.with_context(context)?;

        debug!(
            author_id,
            books = books.rows_affected(),
            "deleted author and books"
        );
        Ok(())
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.is_foreign_key_violation();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn setup_test() -> Sqlite {
        Sqlite::in_memory(&SeedData::demo())
            .await
            .expect("Failed to create test database")
    }

    #[tokio::test]
    async fn initialize_seeds_once() {
        let db = setup_test().await;

        let seeded_again = db.initialize(&SeedData::demo()).await.unwrap();
        assert!(!seeded_again);

        let books = db.find_all_books().await.unwrap();
        assert_eq!(books.len(), 3);
        let authors = db.find_all_authors().await.unwrap();
        assert_eq!(authors.len(), 3);
    }

    #[tokio::test]
    async fn seed_rows_keep_their_ids() {
        let db = setup_test().await;

        let book = db.find_book(0).await.unwrap();
        assert_eq!(book, Book::new(0, "A Byte of Python".into(), 1));
        let author = db.find_author(1).await.unwrap();
        assert_eq!(author.name_author(), "Swaroop C. H.");
        assert_eq!(author.fill_name(), "SCW");
    }

    #[tokio::test]
    async fn empty_seed_creates_empty_tables() {
        let db = Sqlite::in_memory(&SeedData::default()).await.unwrap();

        assert!(db.find_all_books().await.unwrap().is_empty());
        assert!(db.find_all_authors().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_missing_book_is_not_found() {
        let db = setup_test().await;

        let result = db.find_book(42).await;
        assert!(matches!(result, Err(FindBookError::NotFound { id: 42 })));
    }

    #[tokio::test]
    async fn find_by_title_binds_quotes_literally() {
        let db = setup_test().await;

        let result = db.find_book_by_title(r#"" OR 1=1 --"#).await;
        assert!(matches!(result, Err(FindBookByTitleError::NotFound { .. })));

        let book = db.find_book_by_title("War and Peace").await.unwrap();
        assert_eq!(book.id(), 3);
    }

    #[tokio::test]
    async fn create_book_assigns_fresh_id() {
        let db = setup_test().await;

        let book = db
            .create_book(&BookDraft::new("Think Python".into(), 1))
            .await
            .unwrap();
        assert_eq!(book.id(), 4);
        assert_eq!(book.title(), "Think Python");

        let found = db.find_book(book.id()).await.unwrap();
        assert_eq!(found, book);
    }

    #[tokio::test]
    async fn create_book_with_unknown_author_inserts_nothing() {
        let db = setup_test().await;

        let result = db.create_book(&BookDraft::new("Orphan".into(), 99)).await;
        assert!(matches!(
            result,
            Err(CreateBookError::UnknownAuthor { author_id: 99 })
        ));
        assert_eq!(db.find_all_books().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_book_overwrites_only_target() {
        let db = setup_test().await;

        db.update_book(1, &BookDraft::new("Moby-Dick".into(), 3))
            .await
            .unwrap();

        let updated = db.find_book(1).await.unwrap();
        assert_eq!(updated, Book::new(1, "Moby-Dick".into(), 3));
        let untouched = db.find_book(3).await.unwrap();
        assert_eq!(untouched.title(), "War and Peace");
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let db = setup_test().await;

        let result = db.update_book(77, &BookDraft::new("Ghost".into(), 1)).await;
        assert!(matches!(result, Err(UpdateBookError::NotFound { id: 77 })));
    }

    #[tokio::test]
    async fn update_missing_book_with_unknown_author_is_not_found() {
        let db = setup_test().await;

        let result = db.update_book(77, &BookDraft::new("Ghost".into(), 999)).await;
        assert!(matches!(result, Err(UpdateBookError::NotFound { id: 77 })));
    }

    #[tokio::test]
    async fn update_book_with_unknown_author_changes_nothing() {
        let db = setup_test().await;

        let result = db.update_book(1, &BookDraft::new("Moby".into(), 999)).await;
        assert!(matches!(
            result,
            Err(UpdateBookError::UnknownAuthor { author_id: 999 })
        ));
        let book = db.find_book(1).await.unwrap();
        assert_eq!(book.title(), "Moby-Dick; or, The Whale");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_book_writes_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("books.db").display());
        let db = Sqlite::connect(&url, &SeedData::demo()).await.unwrap();

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let db = db.clone();
                tokio::spawn(async move {
                    let book = db
                        .create_book(&BookDraft::new(format!("b{i}"), 1))
                        .await?;
                    db.update_book(book.id(), &BookDraft::new(format!("u{i}"), 2))
                        .await
                        .map_err(|err| CreateBookError::Other(anyhow!(err)))
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(db.find_all_books().await.unwrap().len(), 3 + 64);
        assert_eq!(db.find_books_by_author(2).await.unwrap().len(), 1 + 64);
    }

    #[tokio::test]
    async fn delete_books_by_title_reports_count() {
        let db = setup_test().await;
        db.create_book(&BookDraft::new("War and Peace".into(), 2))
            .await
            .unwrap();

        let removed = db.delete_books_by_title("War and Peace").await.unwrap();
        assert_eq!(removed, 2);

        let again = db.delete_books_by_title("War and Peace").await;
        assert!(matches!(
            again,
            Err(DeleteBooksByTitleError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_missing_book_is_not_found() {
        let db = setup_test().await;

        let result = db.delete_book(55).await;
        assert!(matches!(result, Err(DeleteBookError::NotFound { id: 55 })));
    }

    #[tokio::test]
    async fn find_author_by_name() {
        let db = setup_test().await;

        let author = db.find_author_by_name("Leo Tolstoy").await.unwrap();
        assert_eq!(author.id(), 3);

        let missing = db.find_author_by_name("Nobody").await;
        assert!(matches!(
            missing,
            Err(FindAuthorByNameError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn create_and_update_author() {
        let db = setup_test().await;

        let author = db
            .create_author(&AuthorDraft::new("Ada Lovelace".into(), String::new()))
            .await
            .unwrap();
        assert_eq!(author.id(), 4);
        assert_eq!(author.fill_name(), "");

        db.update_author(author.id(), &AuthorDraft::new("Ada".into(), "AL".into()))
            .await
            .unwrap();
        let updated = db.find_author(author.id()).await.unwrap();
        assert_eq!(updated, Author::new(4, "Ada".into(), "AL".into()));

        let missing = db
            .update_author(100, &AuthorDraft::new("X".into(), String::new()))
            .await;
        assert!(matches!(
            missing,
            Err(UpdateAuthorError::NotFound { id: 100 })
        ));
    }

    #[tokio::test]
    async fn delete_author_cascades_to_books() {
        let db = setup_test().await;

        db.delete_author(1).await.unwrap();

        assert!(matches!(
            db.find_author(1).await,
            Err(FindAuthorError::NotFound { id: 1 })
        ));
        assert!(matches!(
            db.find_book(0).await,
            Err(FindBookError::NotFound { id: 0 })
        ));
        assert!(db.find_books_by_author(1).await.unwrap().is_empty());
        assert_eq!(db.find_all_books().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_author_books_removes_both() {
        let db = setup_test().await;
        db.create_book(&BookDraft::new("Anna Karenina".into(), 3))
            .await
            .unwrap();
        assert_eq!(db.find_books_by_author(3).await.unwrap().len(), 2);

        db.delete_author_books(3).await.unwrap();

        assert!(db.find_books_by_author(3).await.unwrap().is_empty());
        assert!(db.find_author(3).await.is_err());

        let again = db.delete_author_books(3).await;
        assert!(matches!(again, Err(DeleteAuthorError::NotFound { id: 3 })));
    }
}
