//! Turns untyped JSON payloads into validated drafts.
//!
//! Failures are collected per field into [`ValidationErrors`], which the HTTP
//! layer returns verbatim as a 400 body.

use crate::models::{AuthorDraft, BookDraft, FindAuthorError};
use crate::repositories::AuthorRepository;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

const SCHEMA_FIELD: &str = "_schema";

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_AN_INTEGER: &str = "Not a valid integer.";
const NOT_AN_OBJECT: &str = "Invalid input type.";

/// Field name to the messages explaining why it was rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single message against a single field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// An error about the payload as a whole rather than one field.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::single(SCHEMA_FIELD, message)
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<ValidationErrors> for ValidationError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

/// Validates a book payload, checking that `author_id` names an existing author.
///
/// Unknown fields, `id` included, are ignored.
pub async fn validate_book<AR>(payload: &Value, authors: &AR) -> Result<BookDraft, ValidationError>
where
    AR: AuthorRepository + ?Sized,
{
    let fields = as_object(payload)?;
    let mut errors = ValidationErrors::new();

    let title = required_string(fields, "title", &mut errors);
    let author_id = required_integer(fields, "author_id", &mut errors);

    if let Some(author_id) = author_id {
        match authors.find_author(author_id).await {
            Ok(_) => {}
            Err(FindAuthorError::NotFound { id }) => {
                errors.add("author_id", format!("Author with id {id} does not exist"));
            }
            Err(FindAuthorError::Other(err)) => return Err(ValidationError::Other(err)),
        }
    }

    match (title, author_id) {
        (Some(title), Some(author_id)) if errors.is_empty() => {
            Ok(BookDraft::new(title, author_id))
        }
        _ => Err(errors.into()),
    }
}

/// Validates an author payload; `fill_name` defaults to an empty string.
pub fn validate_author(payload: &Value) -> Result<AuthorDraft, ValidationErrors> {
    let fields = as_object(payload)?;
    let mut errors = ValidationErrors::new();

    let name_author = required_string(fields, "name_author", &mut errors);
    let fill_name = optional_string(fields, "fill_name", &mut errors).unwrap_or_default();

    match name_author {
        Some(name_author) if errors.is_empty() => Ok(AuthorDraft::new(name_author, fill_name)),
        _ => Err(errors),
    }
}

/// Extracts the `title` of a delete-by-title request.
pub fn validate_title(payload: &Value) -> Result<String, ValidationErrors> {
    let fields = as_object(payload)?;
    let mut errors = ValidationErrors::new();

    required_string(fields, "title", &mut errors).ok_or(errors)
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    payload
        .as_object()
        .ok_or_else(|| ValidationErrors::schema(NOT_AN_OBJECT))
}

fn required_string(
    fields: &Map<String, Value>,
    name: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match fields.get(name) {
        None => {
            errors.add(name, MISSING);
            None
        }
        Some(value) => string_value(value, name, errors),
    }
}

fn optional_string(
    fields: &Map<String, Value>,
    name: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    fields
        .get(name)
        .and_then(|value| string_value(value, name, errors))
}

fn string_value(value: &Value, name: &str, errors: &mut ValidationErrors) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => {
            errors.add(name, NULL);
            None
        }
        _ => {
            errors.add(name, NOT_A_STRING);
            None
        }
    }
}

fn required_integer(
    fields: &Map<String, Value>,
    name: &str,
    errors: &mut ValidationErrors,
) -> Option<i64> {
    let parsed = match fields.get(name) {
        None => {
            errors.add(name, MISSING);
            return None;
        }
        Some(Value::Null) => {
            errors.add(name, NULL);
            return None;
        }
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    if parsed.is_none() {
        errors.add(name, NOT_AN_INTEGER);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Sqlite;
    use crate::seed::SeedData;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn setup_test() -> Sqlite {
        Sqlite::in_memory(&SeedData::demo())
            .await
            .expect("Failed to create test database")
    }

    fn invalid(result: Result<BookDraft, ValidationError>) -> ValidationErrors {
        match result {
            Err(ValidationError::Invalid(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_book_ignores_extra_fields() {
        let db = setup_test().await;
        let payload = json!({"id": 17, "title": "Notes", "author_id": 2, "author_name": "x"});

        let draft = validate_book(&payload, &db).await.unwrap();
        assert_eq!(draft, BookDraft::new("Notes".into(), 2));
    }

    #[tokio::test]
    async fn author_id_may_be_numeric_string() {
        let db = setup_test().await;
        let payload = json!({"title": "Notes", "author_id": "3"});

        let draft = validate_book(&payload, &db).await.unwrap();
        assert_eq!(draft.author_id(), 3);
    }

    #[tokio::test]
    async fn unknown_author_names_the_field() {
        let db = setup_test().await;
        let payload = json!({"title": "X", "author_id": 9999});

        let errors = invalid(validate_book(&payload, &db).await);
        assert_eq!(
            errors.messages("author_id"),
            Some(&["Author with id 9999 does not exist".to_string()][..])
        );
        assert!(errors.messages("title").is_none());
    }

    #[tokio::test]
    async fn missing_and_mistyped_book_fields() {
        let db = setup_test().await;
        let payload = json!({"title": 12, "author_id": 1.5});

        let errors = invalid(validate_book(&payload, &db).await);
        assert_eq!(errors.messages("title"), Some(&[NOT_A_STRING.to_string()][..]));
        assert_eq!(
            errors.messages("author_id"),
            Some(&[NOT_AN_INTEGER.to_string()][..])
        );

        let errors = invalid(validate_book(&json!({}), &db).await);
        assert_eq!(errors.messages("title"), Some(&[MISSING.to_string()][..]));
        assert_eq!(errors.messages("author_id"), Some(&[MISSING.to_string()][..]));
    }

    #[tokio::test]
    async fn non_object_book_payload() {
        let db = setup_test().await;

        let errors = invalid(validate_book(&json!(["title"]), &db).await);
        assert_eq!(errors, ValidationErrors::schema(NOT_AN_OBJECT));
    }

    #[test]
    fn author_fill_name_defaults_to_empty() {
        let draft = validate_author(&json!({"name_author": "Ada Lovelace"})).unwrap();
        assert_eq!(draft, AuthorDraft::new("Ada Lovelace".into(), String::new()));
    }

    #[test]
    fn author_rejects_null_and_missing() {
        let errors = validate_author(&json!({"fill_name": null})).unwrap_err();
        assert_eq!(errors.messages("name_author"), Some(&[MISSING.to_string()][..]));
        assert_eq!(errors.messages("fill_name"), Some(&[NULL.to_string()][..]));
    }

    #[test]
    fn title_payload() {
        assert_eq!(validate_title(&json!({"title": "Dune"})).unwrap(), "Dune");
        let errors = validate_title(&json!({"name": "Dune"})).unwrap_err();
        assert_eq!(errors.messages("title"), Some(&[MISSING.to_string()][..]));
    }

    #[test]
    fn errors_serialize_as_plain_map() {
        let errors = ValidationErrors::single("author_id", "Author with id 5 does not exist");
        let body = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            body,
            json!({"author_id": ["Author with id 5 does not exist"]})
        );
    }
}
