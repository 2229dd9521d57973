//! Book orchestration: anyone reads, only the owner mutates.

use std::sync::Arc;

use shelf_authz::{ensure_owner, Identity};
use shelf_db::{Book, BookId, BookPatch, BookStore, NewBook};
use tracing::instrument;

use crate::modules::error::ServiceResult;

/// Fields a caller supplies when creating a book; the owner comes from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub isbn: String,
    pub writer: String,
}

#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<Book>> {
        Ok(self.store.find_all().await?)
    }

    pub async fn find_by_id(&self, id: BookId) -> ServiceResult<Book> {
        Ok(self.store.find_by_id(id).await?)
    }

    #[instrument(skip(self, draft), fields(caller = caller.user_id()))]
    pub async fn create(&self, caller: &Identity, draft: BookDraft) -> ServiceResult<Book> {
        let book = self
            .store
            .create(NewBook {
                title: draft.title,
                isbn: draft.isbn,
                writer: draft.writer,
                owner_id: caller.user_id(),
            })
            .await?;
        tracing::info!(book_id = book.id, "book created");
        Ok(book)
    }

    #[instrument(skip(self, patch), fields(caller = caller.user_id()))]
    pub async fn update(
        &self,
        caller: &Identity,
        id: BookId,
        patch: BookPatch,
    ) -> ServiceResult<Book> {
        let book = self.store.find_by_id(id).await?;
        ensure_owner(caller, "book", book.owner_id)?;
        Ok(self.store.update(id, patch).await?)
    }

    #[instrument(skip(self), fields(caller = caller.user_id()))]
    pub async fn delete(&self, caller: &Identity, id: BookId) -> ServiceResult<()> {
        let book = self.store.find_by_id(id).await?;
        ensure_owner(caller, "book", book.owner_id)?;
        self.store.delete_by_id(id).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}
