//! SQLite person backend.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use tracing::{debug, info};

use super::person::Person;
use super::schema::MIGRATIONS;
use super::{Backend, BackendError};
use crate::id::Identifier;

impl<'r> FromRow<'r, SqliteRow> for Person {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let id = Identifier::parse(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Self {
            id,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            last_seen: row.try_get("last_seen")?,
        })
    }
}

/// Person backend on a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Open (creating if missing) the database at `url` and apply migrations.
    pub async fn open(url: &str) -> Result<Self, BackendError> {
        info!(url = %url, "Opening database");

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BackendError::Database(format!("{}: {e}", parent.display())))?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Open a private in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, BackendError> {
        debug!("Opening in-memory database");

        // Every connection to :memory: is a separate database, so keep one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, applying pending migrations.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, BackendError> {
        let backend = Self { pool };
        backend.migrate().await?;
        Ok(backend)
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Current schema version.
    pub async fn schema_version(&self) -> Result<i64, BackendError> {
        sqlx::raw_sql("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await?;

        let version: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&self.pool)
                .await?;
        Ok(version)
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<(), BackendError> {
        let current = self.schema_version().await?;

        for (index, migration) in MIGRATIONS.iter().enumerate() {
            let version = index as i64 + 1;
            if version <= current {
                continue;
            }

            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(migration).execute(&mut *tx).await?;
            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(version)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            info!(version, "Applied migration");
        }

        Ok(())
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn user_by_username(&self, username: &str) -> Result<Person, BackendError> {
        let person = sqlx::query_as::<_, Person>(
            "SELECT id, username, email, password, last_seen
             FROM persons WHERE username = ? COLLATE NOCASE",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        person.ok_or(BackendError::NotFound)
    }

    async fn person(&self, id: &Identifier) -> Result<Person, BackendError> {
        let person = sqlx::query_as::<_, Person>(
            "SELECT id, username, email, password, last_seen
             FROM persons WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        person.ok_or(BackendError::NotFound)
    }

    async fn add_person(&self, person: &Person) -> Result<(), BackendError> {
        sqlx::query(
            "INSERT INTO persons (id, username, email, password, last_seen)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(person.id.to_string())
        .bind(&person.username)
        .bind(&person.email)
        .bind(&person.password)
        .bind(person.last_seen)
        .execute(&self.pool)
        .await?;

        debug!(person_id = %person.id, "Person added");
        Ok(())
    }

    async fn upsert_person(&self, person: &Person) -> Result<(), BackendError> {
        sqlx::query(
            "INSERT INTO persons (id, username, email, password, last_seen)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                email = excluded.email,
                password = excluded.password,
                last_seen = excluded.last_seen",
        )
        .bind(person.id.to_string())
        .bind(&person.username)
        .bind(&person.email)
        .bind(&person.password)
        .bind(person.last_seen)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
