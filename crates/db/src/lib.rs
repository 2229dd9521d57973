//! shelf-db: storage contracts and backends
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                     shelf-db                     │
//! ├──────────────────────────────────────────────────┤
//! │  traits.rs  - UserStore / BookStore contracts    │
//! │  memory.rs  - lock-guarded in-memory maps        │
//! │  sqlite.rs  - relational backend (sqlx)          │
//! │  surreal.rs - document backend (SurrealDB)       │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! The backend is chosen once, at composition time, by [`connect`].

use std::sync::Arc;

use anyhow::Context;
use shelf_kernel::settings::{StorageBackend, StorageSettings};

pub mod error;
pub mod memory;
pub mod models;
pub mod sqlite;
pub mod surreal;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryBookStore, MemoryUserStore};
pub use models::{Book, BookId, BookPatch, NewBook, NewUser, User, UserId, UserPatch};
pub use sqlite::SqliteDatabase;
pub use surreal::SurrealDatabase;
pub use traits::{BookStore, UserStore};

/// The pair of stores handed to the services.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub books: Arc<dyn BookStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: MemoryUserStore::new_shared(),
            books: MemoryBookStore::new_shared(),
        }
    }
}

/// Build the configured backend, creating its schema where it has one.
pub async fn connect(settings: &StorageSettings) -> anyhow::Result<Stores> {
    tracing::info!(target: "shelf-db", backend = ?settings.backend, "connecting storage backend");

    let stores = match settings.backend {
        StorageBackend::Memory => Stores::in_memory(),
        StorageBackend::Relational => {
            let database = SqliteDatabase::connect(&settings.relational)
                .await
                .context("failed to open relational database")?;
            Stores {
                users: Arc::new(database.user_store()),
                books: Arc::new(database.book_store()),
            }
        }
        StorageBackend::Document => {
            let database = SurrealDatabase::connect(&settings.document)
                .await
                .with_context(|| {
                    format!(
                        "failed to connect to document store at {}",
                        settings.document.endpoint
                    )
                })?;
            Stores {
                users: Arc::new(database.user_store()),
                books: Arc::new(database.book_store()),
            }
        }
    };

    Ok(stores)
}
