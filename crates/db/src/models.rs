//! Records persisted by the stores.

use time::OffsetDateTime;

use crate::error::{StoreError, StoreResult};

pub type UserId = u64;
pub type BookId = u64;

/// A registered user. `secret` is compared by equality and never leaves the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub secret: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub secret: String,
}

/// Partial user update. Absent and empty fields leave the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub secret: Option<String>,
}

impl UserPatch {
    /// Drop empty strings so backends only see fields that overwrite.
    pub fn normalized(self) -> Self {
        Self {
            name: non_empty(self.name),
            email: non_empty(self.email),
            secret: non_empty(self.secret),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.secret.is_none()
    }

    pub(crate) fn apply(&self, user: &mut User) {
        overwrite(&mut user.name, &self.name);
        overwrite(&mut user.email, &self.email);
        overwrite(&mut user.secret, &self.secret);
    }
}

/// A book. `owner_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub isbn: String,
    pub writer: String,
    pub owner_id: UserId,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub writer: String,
    pub owner_id: UserId,
}

/// Partial book update. There is deliberately no owner field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub writer: Option<String>,
}

impl BookPatch {
    pub fn normalized(self) -> Self {
        Self {
            title: non_empty(self.title),
            isbn: non_empty(self.isbn),
            writer: non_empty(self.writer),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.isbn.is_none() && self.writer.is_none()
    }

    pub(crate) fn apply(&self, book: &mut Book) {
        overwrite(&mut book.title, &self.title);
        overwrite(&mut book.isbn, &self.isbn);
        overwrite(&mut book.writer, &self.writer);
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn overwrite(target: &mut String, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        *target = value.to_string();
    }
}

/// Current UTC time truncated to microseconds, the finest precision every backend keeps.
pub(crate) fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

/// Backends key records by `i64`; larger ids cannot exist.
pub(crate) fn to_key(entity: &'static str, id: u64) -> StoreResult<i64> {
    i64::try_from(id).map_err(|_| StoreError::not_found(entity, id))
}

pub(crate) fn from_key(key: i64) -> StoreResult<u64> {
    u64::try_from(key).map_err(|_| StoreError::backend(format!("negative record key {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_patch_drops_empty_fields() {
        let patch = BookPatch {
            title: Some("New".to_string()),
            isbn: Some(String::new()),
            writer: None,
        }
        .normalized();

        assert_eq!(patch.title.as_deref(), Some("New"));
        assert!(patch.isbn.is_none());
        assert!(!patch.is_empty());
        assert!(UserPatch::default().normalized().is_empty());
    }

    #[test]
    fn apply_only_overwrites_present_fields() {
        let now = now_utc();
        let mut book = Book {
            id: 1,
            title: "T".to_string(),
            isbn: "I".to_string(),
            writer: "W".to_string(),
            owner_id: 9,
            created_at: now,
            updated_at: now,
        };
        BookPatch {
            title: None,
            isbn: Some(String::new()),
            writer: Some("W2".to_string()),
        }
        .apply(&mut book);

        assert_eq!(book.title, "T");
        assert_eq!(book.isbn, "I");
        assert_eq!(book.writer, "W2");
        assert_eq!(book.owner_id, 9);
    }
}
