use serde::{Deserialize, Serialize};
use shelf_db::{Book, BookPatch};
use shelf_http::AppError;
use time::OffsetDateTime;

use super::service::BookDraft;
use crate::utils::FieldValidator;

/// Public view of a book.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookResponse {
    pub id: u64,
    pub title: String,
    pub isbn: String,
    pub writer: String,
    pub owner_id: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        BookResponse {
            id: book.id,
            title: book.title,
            isbn: book.isbn,
            writer: book.writer,
            owner_id: book.owner_id,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// Request model for creating a new book. The caller becomes its owner.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateBookRequest {
    pub title: String,
    pub isbn: String,
    pub writer: String,
}

impl CreateBookRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        FieldValidator::new()
            .required("title", &self.title)
            .required("isbn", &self.isbn)
            .required("writer", &self.writer)
            .finish("invalid book payload")
    }
}

impl From<CreateBookRequest> for BookDraft {
    fn from(request: CreateBookRequest) -> Self {
        BookDraft {
            title: request.title,
            isbn: request.isbn,
            writer: request.writer,
        }
    }
}

/// Partial update. Unknown keys such as `owner_id` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub writer: Option<String>,
}

impl From<UpdateBookRequest> for BookPatch {
    fn from(request: UpdateBookRequest) -> Self {
        BookPatch {
            title: request.title,
            isbn: request.isbn,
            writer: request.writer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_title_isbn_and_writer() {
        let request: CreateBookRequest = serde_json::from_str(r#"{"title": "T"}"#).unwrap();
        match request.validate().unwrap_err() {
            AppError::Validation { details, .. } => {
                let fields: Vec<_> = details.iter().map(|d| d["field"].clone()).collect();
                assert_eq!(fields, vec!["isbn", "writer"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn update_ignores_owner_field() {
        let request: UpdateBookRequest =
            serde_json::from_str(r#"{"title": "T2", "owner_id": 99}"#).unwrap();
        let patch = BookPatch::from(request);
        assert_eq!(patch.title.as_deref(), Some("T2"));
        assert!(patch.isbn.is_none());
    }
}
