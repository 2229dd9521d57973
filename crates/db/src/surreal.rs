//! Document stores on SurrealDB.
//!
//! Records live under integer keys (`books:42`). Keys are handed out by an
//! atomic `UPSERT` on a per-table `counters` document, so concurrent creates
//! never collide and deleted keys are never reissued.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

use shelf_kernel::settings::DocumentSettings;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    from_key, now_utc, to_key, Book, BookId, BookPatch, NewBook, NewUser, User, UserId, UserPatch,
};
use crate::traits::{BookStore, UserStore};

const USER_TABLE: &str = "users";
const BOOK_TABLE: &str = "books";

const SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS users SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS users_email ON TABLE users FIELDS email;
    DEFINE TABLE IF NOT EXISTS books SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS counters SCHEMALESS;
"#;

const NEXT_KEY: &str =
    "UPSERT type::thing('counters', $table) SET counter = (counter ?? 0) + 1 RETURN VALUE counter";

/// Attempts for a sequence bump that hit a transaction conflict.
const SEQUENCE_ATTEMPTS: u32 = 8;
const SEQUENCE_BACKOFF: Duration = Duration::from_millis(5);

/// Client shared by the SurrealDB user and book stores.
#[derive(Clone)]
pub struct SurrealDatabase {
    client: Surreal<Any>,
}

impl SurrealDatabase {
    /// Connects to `endpoint` (`ws://`, `wss://` or `mem://`), signs in when
    /// credentials are configured and defines the schema.
    pub async fn connect(settings: &DocumentSettings) -> StoreResult<Self> {
        let db = any::connect(settings.endpoint.as_str()).await?;

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await?;
        }

        db.use_ns(settings.namespace.as_str())
            .use_db(settings.database.as_str())
            .await?;

        let database = Self { client: db };
        database.migrate().await?;
        Ok(database)
    }

    /// An embedded in-memory instance.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect(&DocumentSettings {
            endpoint: "mem://".to_string(),
            ..DocumentSettings::default()
        })
        .await
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        self.client.query(SCHEMA).await?.check()?;
        debug!("surrealdb schema ready");
        Ok(())
    }

    pub fn user_store(&self) -> SurrealUserStore {
        SurrealUserStore {
            db: self.clone(),
        }
    }

    pub fn book_store(&self) -> SurrealBookStore {
        SurrealBookStore {
            db: self.clone(),
        }
    }

    async fn next_key(&self, table: &'static str) -> StoreResult<i64> {
        let mut attempt = 1;
        loop {
            match self.bump_sequence(table).await {
                Ok(Some(key)) => return Ok(key),
                Ok(None) => {
                    return Err(StoreError::backend(format!(
                        "sequence for {table} returned no value"
                    )))
                }
                Err(err) if attempt < SEQUENCE_ATTEMPTS => {
                    warn!(table, attempt, error = %err, "sequence bump failed, retrying");
                    tokio::time::sleep(SEQUENCE_BACKOFF * 2u32.pow(attempt - 1)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn bump_sequence(&self, table: &'static str) -> Result<Option<i64>, surrealdb::Error> {
        let mut response = self.client.query(NEXT_KEY).bind(("table", table)).await?;
        response.take(0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    key: i64,
    name: String,
    email: String,
    secret: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl UserDocument {
    fn into_user(self) -> StoreResult<User> {
        Ok(User {
            id: from_key(self.key)?,
            name: self.name,
            email: self.email,
            secret: self.secret,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Merge document for user updates; absent fields are left untouched.
#[derive(Debug, Serialize)]
struct UserMerge {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
struct BookDocument {
    key: i64,
    title: String,
    isbn: String,
    writer: String,
    owner_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl BookDocument {
    fn into_book(self) -> StoreResult<Book> {
        Ok(Book {
            id: from_key(self.key)?,
            title: self.title,
            isbn: self.isbn,
            writer: self.writer,
            owner_id: from_key(self.owner_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Serialize)]
struct BookMerge {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    writer: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

/// SurrealDB implementation of [`UserStore`].
#[derive(Clone)]
pub struct SurrealUserStore {
    db: SurrealDatabase,
}

#[async_trait]
impl UserStore for SurrealUserStore {
    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let mut docs: Vec<UserDocument> = self.db.client.select(USER_TABLE).await?;
        docs.sort_by_key(|doc| doc.key);
        docs.into_iter().map(UserDocument::into_user).collect()
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<User> {
        let doc: Option<UserDocument> = self.db.client.select((USER_TABLE, to_key("user", id)?)).await?;
        doc.ok_or_else(|| StoreError::not_found("user", id))?
            .into_user()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<User> {
        let mut response = self
            .db
            .client
            .query("SELECT * FROM users WHERE email = $email ORDER BY key LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let doc: Option<UserDocument> = response.take(0)?;
        doc.ok_or_else(|| StoreError::not_found("user", email))?
            .into_user()
    }

    #[instrument(skip_all)]
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let key = self.db.next_key(USER_TABLE).await?;
        let now = now_utc();
        let doc = UserDocument {
            key,
            name: user.name,
            email: user.email,
            secret: user.secret,
            created_at: now,
            updated_at: now,
        };
        let created: Option<UserDocument> =
            self.db.client.create((USER_TABLE, key)).content(doc).await?;
        created
            .ok_or_else(|| StoreError::backend(format!("user {key} was not created")))?
            .into_user()
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: UserId, patch: UserPatch) -> StoreResult<User> {
        let patch = patch.normalized();
        let merge = UserMerge {
            name: patch.name,
            email: patch.email,
            secret: patch.secret,
            updated_at: now_utc(),
        };
        let updated: Option<UserDocument> = self
            .db
            .client
            .update((USER_TABLE, to_key("user", id)?))
            .merge(merge)
            .await?;
        updated
            .ok_or_else(|| StoreError::not_found("user", id))?
            .into_user()
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: UserId) -> StoreResult<()> {
        let deleted: Option<UserDocument> =
            self.db.client.delete((USER_TABLE, to_key("user", id)?)).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("user", id))
    }
}

/// SurrealDB implementation of [`BookStore`].
#[derive(Clone)]
pub struct SurrealBookStore {
    db: SurrealDatabase,
}

#[async_trait]
impl BookStore for SurrealBookStore {
    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        let mut docs: Vec<BookDocument> = self.db.client.select(BOOK_TABLE).await?;
        docs.sort_by_key(|doc| doc.key);
        docs.into_iter().map(BookDocument::into_book).collect()
    }

    async fn find_by_id(&self, id: BookId) -> StoreResult<Book> {
        let doc: Option<BookDocument> = self.db.client.select((BOOK_TABLE, to_key("book", id)?)).await?;
        doc.ok_or_else(|| StoreError::not_found("book", id))?
            .into_book()
    }

    #[instrument(skip_all, fields(owner_id = book.owner_id))]
    async fn create(&self, book: NewBook) -> StoreResult<Book> {
        let owner_id = to_key("user", book.owner_id)?;
        let key = self.db.next_key(BOOK_TABLE).await?;
        let now = now_utc();
        let doc = BookDocument {
            key,
            title: book.title,
            isbn: book.isbn,
            writer: book.writer,
            owner_id,
            created_at: now,
            updated_at: now,
        };
        let created: Option<BookDocument> =
            self.db.client.create((BOOK_TABLE, key)).content(doc).await?;
        created
            .ok_or_else(|| StoreError::backend(format!("book {key} was not created")))?
            .into_book()
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: BookId, patch: BookPatch) -> StoreResult<Book> {
        let patch = patch.normalized();
        let merge = BookMerge {
            title: patch.title,
            isbn: patch.isbn,
            writer: patch.writer,
            updated_at: now_utc(),
        };
        let updated: Option<BookDocument> = self
            .db
            .client
            .update((BOOK_TABLE, to_key("book", id)?))
            .merge(merge)
            .await?;
        updated
            .ok_or_else(|| StoreError::not_found("book", id))?
            .into_book()
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: BookId) -> StoreResult<()> {
        let deleted: Option<BookDocument> =
            self.db.client.delete((BOOK_TABLE, to_key("book", id)?)).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("book", id))
    }
}
