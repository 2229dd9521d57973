//! In-memory stores for tests and single-process deployments.
//!
//! Each store owns an id → record map behind a `parking_lot::RwLock`. Ids come
//! from a counter that lives under the same lock and never goes backwards, so
//! deleting records in any order cannot produce a duplicate id.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::instrument;

use crate::error::{StoreError, StoreResult};
use crate::models::{now_utc, Book, BookId, BookPatch, NewBook, NewUser, User, UserId, UserPatch};
use crate::traits::{BookStore, UserStore};

#[derive(Debug)]
struct Table<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T: Clone> Table<T> {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn values(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

/// In-memory implementation of [`UserStore`].
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    table: RwLock<Table<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_all(&self) -> StoreResult<Vec<User>> {
        Ok(self.table.read().values())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<User> {
        self.table
            .read()
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<User> {
        self.table
            .read()
            .rows
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", email))
    }

    #[instrument(skip_all)]
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let now = now_utc();
        let mut table = self.table.write();
        let id = table.allocate_id();
        let user = User {
            id,
            name: user.name,
            email: user.email,
            secret: user.secret,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, user.clone());
        Ok(user)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: UserId, patch: UserPatch) -> StoreResult<User> {
        let patch = patch.normalized();
        let now = now_utc();
        let mut table = self.table.write();
        let user = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        patch.apply(user);
        user.updated_at = now;
        Ok(user.clone())
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: UserId) -> StoreResult<()> {
        self.table
            .write()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("user", id))
    }
}

/// In-memory implementation of [`BookStore`].
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    table: RwLock<Table<Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.table.read().values())
    }

    async fn find_by_id(&self, id: BookId) -> StoreResult<Book> {
        self.table
            .read()
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("book", id))
    }

    #[instrument(skip_all, fields(owner_id = book.owner_id))]
    async fn create(&self, book: NewBook) -> StoreResult<Book> {
        let now = now_utc();
        let mut table = self.table.write();
        let id = table.allocate_id();
        let book = Book {
            id,
            title: book.title,
            isbn: book.isbn,
            writer: book.writer,
            owner_id: book.owner_id,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, book.clone());
        Ok(book)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: BookId, patch: BookPatch) -> StoreResult<Book> {
        let patch = patch.normalized();
        let now = now_utc();
        let mut table = self.table.write();
        let book = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("book", id))?;
        patch.apply(book);
        book.updated_at = now;
        Ok(book.clone())
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: BookId) -> StoreResult<()> {
        self.table
            .write()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("book", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str, owner_id: UserId) -> NewBook {
        NewBook {
            title: title.to_string(),
            isbn: format!("isbn-{title}"),
            writer: "W".to_string(),
            owner_id,
        }
    }

    #[tokio::test]
    async fn test_create_then_find_round_trip() {
        let store = MemoryBookStore::new();
        let created = store.create(new_book("T", 1)).await.unwrap();
        let found = store.find_by_id(created.id).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(found.title, "T");
        assert_eq!(found.owner_id, 1);
        assert_eq!(found.created_at, found.updated_at);
    }

    #[tokio::test]
    async fn test_ids_stay_unique_after_out_of_order_deletes() {
        let store = MemoryBookStore::new();
        for title in ["a", "b", "c"] {
            store.create(new_book(title, 1)).await.unwrap();
        }
        store.delete_by_id(1).await.unwrap();
        store.delete_by_id(3).await.unwrap();

        let d = store.create(new_book("d", 1)).await.unwrap();
        assert_eq!(d.id, 4);

        let ids: Vec<_> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(store.find_by_id(2).await.unwrap().title, "b");
    }

    #[tokio::test]
    async fn test_missing_records_report_not_found() {
        let store = MemoryBookStore::new();
        assert!(store.find_by_id(7).await.unwrap_err().is_not_found());
        assert!(store
            .update(7, BookPatch::default())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store.delete_by_id(7).await.unwrap_err().is_not_found());

        let users = MemoryUserStore::new();
        assert!(users.delete_by_id(7).await.unwrap_err().is_not_found());
        assert!(users
            .find_by_email("nobody@x.com")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_skips_empty_fields() {
        let store = MemoryBookStore::new();
        let book = store.create(new_book("T", 5)).await.unwrap();

        let updated = store
            .update(
                book.id,
                BookPatch {
                    title: Some("T2".to_string()),
                    isbn: Some(String::new()),
                    writer: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "T2");
        assert_eq!(updated.isbn, book.isbn);
        assert_eq!(updated.writer, book.writer);
        assert_eq!(updated.owner_id, 5);
        assert!(updated.updated_at >= book.updated_at);
    }

    #[tokio::test]
    async fn test_user_lookup_by_email() {
        let store = MemoryUserStore::new();
        let alice = store
            .create(NewUser {
                name: "alice".to_string(),
                email: "a@x.com".to_string(),
                secret: "pw123456".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(store.find_by_email("a@x.com").await.unwrap(), alice);

        let renamed = store
            .update(
                alice.id,
                UserPatch {
                    name: Some("alicia".to_string()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "alicia");
        assert_eq!(renamed.secret, "pw123456");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        const N: usize = 64;
        let store = MemoryBookStore::new_shared();

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.create(new_book(&i.to_string(), 1)).await })
            })
            .collect();

        let mut ids = Vec::with_capacity(N);
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), N);
        assert_eq!(store.find_all().await.unwrap().len(), N);
    }
}
