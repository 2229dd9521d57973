//! Relational stores on SQLite.
//!
//! Ids come from `AUTOINCREMENT`. Users are soft-deleted through a
//! `deleted_at` tombstone and every user query filters tombstoned rows;
//! books are removed outright.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, instrument};

use shelf_kernel::settings::RelationalSettings;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    from_key, now_utc, to_key, Book, BookId, BookPatch, NewBook, NewUser, User, UserId, UserPatch,
};
use crate::traits::{BookStore, UserStore};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        secret TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_users_email ON users (email)",
    r#"CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        isbn TEXT NOT NULL,
        writer TEXT NOT NULL,
        owner_id INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
];

const USER_COLUMNS: &str = "id, name, email, secret, created_at, updated_at";
const BOOK_COLUMNS: &str = "id, title, isbn, writer, owner_id, created_at, updated_at";

/// Connection pool shared by the SQLite user and book stores.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Connects using the configured URL and creates the schema.
    pub async fn connect(settings: &RelationalSettings) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&settings.url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(settings.max_connections);

        // Every connection to `:memory:` opens its own database.
        if is_memory_url(&settings.url) {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        let database = Self { pool };
        database.migrate().await?;
        Ok(database)
    }

    /// A private in-memory database.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect(&RelationalSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
    }

    /// Creates tables and indexes when missing.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("sqlite schema ready");
        Ok(())
    }

    pub fn user_store(&self) -> SqliteUserStore {
        SqliteUserStore {
            pool: self.pool.clone(),
        }
    }

    pub fn book_store(&self) -> SqliteBookStore {
        SqliteBookStore {
            pool: self.pool.clone(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn user_from_row(row: &SqliteRow) -> StoreResult<User> {
    Ok(User {
        id: from_key(row.try_get("id")?)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        secret: row.try_get("secret")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn book_from_row(row: &SqliteRow) -> StoreResult<Book> {
    Ok(Book {
        id: from_key(row.try_get("id")?)?,
        title: row.try_get("title")?,
        isbn: row.try_get("isbn")?,
        writer: row.try_get("writer")?,
        owner_id: from_key(row.try_get("owner_id")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// SQLite implementation of [`UserStore`].
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL"
        ))
        .bind(to_key("user", id)?)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("user", id))?;
        user_from_row(&row)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? AND deleted_at IS NULL ORDER BY id LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("user", email))?;
        user_from_row(&row)
    }

    #[instrument(skip_all)]
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let now = now_utc();
        let row = sqlx::query(&format!(
            "INSERT INTO users (name, email, secret, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.secret)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        user_from_row(&row)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: UserId, patch: UserPatch) -> StoreResult<User> {
        let patch = patch.normalized();
        let row = sqlx::query(&format!(
            "UPDATE users SET name = COALESCE(?, name), email = COALESCE(?, email), secret = COALESCE(?, secret), updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL RETURNING {USER_COLUMNS}"
        ))
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.secret)
        .bind(now_utc())
        .bind(to_key("user", id)?)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("user", id))?;
        user_from_row(&row)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: UserId) -> StoreResult<()> {
        let now = now_utc();
        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(to_key("user", id)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("user", id));
        }
        Ok(())
    }
}

/// SQLite implementation of [`BookStore`].
#[derive(Debug, Clone)]
pub struct SqliteBookStore {
    pool: SqlitePool,
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(book_from_row).collect()
    }

    async fn find_by_id(&self, id: BookId) -> StoreResult<Book> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
            .bind(to_key("book", id)?)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("book", id))?;
        book_from_row(&row)
    }

    #[instrument(skip_all, fields(owner_id = book.owner_id))]
    async fn create(&self, book: NewBook) -> StoreResult<Book> {
        let now = now_utc();
        let row = sqlx::query(&format!(
            "INSERT INTO books (title, isbn, writer, owner_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(&book.writer)
        .bind(to_key("user", book.owner_id)?)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        book_from_row(&row)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: BookId, patch: BookPatch) -> StoreResult<Book> {
        let patch = patch.normalized();
        let row = sqlx::query(&format!(
            "UPDATE books SET title = COALESCE(?, title), isbn = COALESCE(?, isbn), writer = COALESCE(?, writer), updated_at = ? \
             WHERE id = ? RETURNING {BOOK_COLUMNS}"
        ))
        .bind(patch.title)
        .bind(patch.isbn)
        .bind(patch.writer)
        .bind(now_utc())
        .bind(to_key("book", id)?)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("book", id))?;
        book_from_row(&row)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: BookId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(to_key("book", id)?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("book", id));
        }
        Ok(())
    }
}
