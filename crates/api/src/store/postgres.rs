//! `PostgreSQL` store implementation.
//!
//! One `(id TEXT, version BIGINT, doc JSONB)` table per entity, created by
//! the migrations under `crates/api/migrations`. Table names are baked into
//! the binary as [`Entity::TABLE`](super::Entity::TABLE) constants, which is
//! why interpolating them into the SQL below is safe.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use super::{KeyValueStore, RawRecord, StoreError};

/// Key-value store backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `PostgreSQL` with sensible pool defaults.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect(database_url: &secrecy::SecretString) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self { pool })
    }

    /// Apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::migrate::MigrateError` if a migration fails.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Access the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for PgStore {
    async fn insert(&self, table: &str, id: &str, doc: Value) -> Result<i64, StoreError> {
        let sql = format!("INSERT INTO {table} (id, version, doc) VALUES ($1, 1, $2)");
        sqlx::query(&sql)
            .bind(id)
            .bind(&doc)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return StoreError::Conflict(format!("record {id} already exists in {table}"));
                }
                StoreError::Database(e)
            })?;
        Ok(1)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        doc: Value,
        expected_version: i64,
    ) -> Result<i64, StoreError> {
        let sql = format!(
            "UPDATE {table} SET version = version + 1, doc = $3 \
             WHERE id = $1 AND version = $2 RETURNING version"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(expected_version)
            .bind(&doc)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            return Ok(row.try_get("version")?);
        }

        // Nothing matched: distinguish a vanished record from a stale version.
        let check = format!("SELECT version FROM {table} WHERE id = $1");
        let stored: Option<i64> = sqlx::query(&check)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| row.try_get("version"))
            .transpose()?;

        match stored {
            None => Err(StoreError::NotFound),
            Some(version) => Err(StoreError::Conflict(format!(
                "expected version {expected_version}, stored version is {version}"
            ))),
        }
    }

    async fn get(&self, table: &str, id: &str) -> Result<Option<RawRecord>, StoreError> {
        let sql = format!("SELECT id, version, doc FROM {table} WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|row| {
            Ok(RawRecord {
                id: row.try_get("id")?,
                version: row.try_get("version")?,
                doc: row.try_get("doc")?,
            })
        })
        .transpose()
    }

    async fn scan(&self, table: &str) -> Result<Vec<RawRecord>, StoreError> {
        let sql = format!("SELECT id, version, doc FROM {table} ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| {
                Ok(RawRecord {
                    id: row.try_get("id")?,
                    version: row.try_get("version")?,
                    doc: row.try_get("doc")?,
                })
            })
            .collect()
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {table} WHERE id = $1");
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
