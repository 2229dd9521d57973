//! Store contracts shared by every backend.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{Book, BookId, BookPatch, NewBook, NewUser, User, UserId, UserPatch};

/// Credential store.
///
/// Implementations must be thread-safe (Send + Sync); a missing record is
/// always reported as `StoreError::NotFound`.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Lists live users ordered by id.
    async fn find_all(&self) -> StoreResult<Vec<User>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<User>;

    /// Looks a user up by email, the unique key used for login.
    async fn find_by_email(&self, email: &str) -> StoreResult<User>;

    /// Persists a user, assigning id and both timestamps.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    /// Applies the non-empty fields of `patch` and bumps `updated_at`.
    async fn update(&self, id: UserId, patch: UserPatch) -> StoreResult<User>;

    async fn delete_by_id(&self, id: UserId) -> StoreResult<()>;
}

/// Resource store for books.
#[async_trait]
pub trait BookStore: Send + Sync + 'static {
    /// Lists books ordered by id.
    async fn find_all(&self) -> StoreResult<Vec<Book>>;

    async fn find_by_id(&self, id: BookId) -> StoreResult<Book>;

    /// Persists a book, assigning a fresh id and both timestamps.
    async fn create(&self, book: NewBook) -> StoreResult<Book>;

    /// Applies the non-empty fields of `patch`; the owner never changes.
    async fn update(&self, id: BookId, patch: BookPatch) -> StoreResult<Book>;

    async fn delete_by_id(&self, id: BookId) -> StoreResult<()>;
}
