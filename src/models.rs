use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: i64,
    title: String,
    author_id: i64,
}

impl Book {
    pub const fn new(id: i64, title: String, author_id: i64) -> Self {
        Self {
            id,
            title,
            author_id,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn author_id(&self) -> i64 {
        self.author_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    id: i64,
    name_author: String,
    fill_name: String,
}

impl Author {
    pub const fn new(id: i64, name_author: String, fill_name: String) -> Self {
        Self {
            id,
            name_author,
            fill_name,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub fn name_author(&self) -> &str {
        &self.name_author
    }

    pub fn fill_name(&self) -> &str {
        &self.fill_name
    }
}

/// A validated book without a persisted identifier.
///
/// Used both to create a book and to overwrite an existing one by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    title: String,
    author_id: i64,
}

impl BookDraft {
    pub const fn new(title: String, author_id: i64) -> Self {
        Self { title, author_id }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn author_id(&self) -> i64 {
        self.author_id
    }
}

/// A validated author without a persisted identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorDraft {
    name_author: String,
    fill_name: String,
}

impl AuthorDraft {
    pub const fn new(name_author: String, fill_name: String) -> Self {
        Self {
            name_author,
            fill_name,
        }
    }

    pub fn name_author(&self) -> &str {
        &self.name_author
    }

    pub fn fill_name(&self) -> &str {
        &self.fill_name
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAllBooksError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
pub enum FindBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
pub enum FindBookByTitleError {
    #[error("Book with title \"{title}\" does not exist")]
    NotFound { title: String },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
pub enum CreateBookError {
    #[error("Author with id {author_id} does not exist")]
    UnknownAuthor { author_id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

/// Failure of an update by id.
///
/// A missing book is reported as `NotFound` even when the author is unknown too;
/// `UnknownAuthor` only applies to a book that exists. The HTTP layer validates
/// the payload first, so an invalid body is a 400 whatever the target.
#[derive(Error, Debug)]
pub enum UpdateBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error("Author with id {author_id} does not exist")]
    UnknownAuthor { author_id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
pub enum DeleteBookError {
    #[error("Book with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum DeleteBooksByTitleError {
    #[error("Book with title \"{title}\" does not exist")]
    NotFound { title: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAllAuthorsError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
pub enum FindAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
pub enum FindAuthorByNameError {
    #[error("Author with name \"{name}\" does not exist")]
    NotFound { name: String },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct CreateAuthorError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
pub enum UpdateAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
pub enum DeleteAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: i64 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
