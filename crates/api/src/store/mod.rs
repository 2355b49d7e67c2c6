//! Versioned key-value document store.
//!
//! Each entity type lives in its own table of `(id, version, doc)` records.
//! The [`KeyValueStore`] trait is the raw contract implemented per backend:
//! [`PgStore`] for `PostgreSQL` and [`MemoryStore`] for tests. On top of it,
//! [`Repository`] provides the typed save/find/delete cycle for any type
//! implementing [`Entity`], and [`scan_where`]/[`scan_first`] build the
//! per-entity secondary lookups from the scan primitive plus a predicate.
//!
//! # Concurrency
//!
//! Writes carry an explicit expected version. A concurrent write to the same
//! row bumps the stored version, so the stale writer is rejected with
//! [`StoreError::Conflict`] instead of silently overwriting. No retries are
//! built in; callers re-read and resubmit.

pub mod memory;
pub mod postgres;

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use orchard_core::Meta;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored document could not be decoded, or an entity could not be
    /// encoded for storage.
    #[error("invalid document: {0}")]
    Corrupt(String),

    /// The record to update does not exist.
    #[error("record not found")]
    NotFound,

    /// The stored version differs from the expected one. Retryable: re-read
    /// and resubmit.
    #[error("version conflict: {0}")]
    Conflict(String),
}

/// A raw record as the store sees it: opaque key, version counter, document.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub id: String,
    pub version: i64,
    pub doc: Value,
}

/// Raw contract over one table of versioned JSON documents.
///
/// `table` arguments are always [`Entity::TABLE`] constants, never input.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Insert a fresh record at version 1. Fails with [`StoreError::Conflict`]
    /// if the id already exists.
    async fn insert(&self, table: &str, id: &str, doc: Value) -> Result<i64, StoreError>;

    /// Replace a record's document, expecting the stored version to match.
    /// Returns the new version on success.
    async fn update(
        &self,
        table: &str,
        id: &str,
        doc: Value,
        expected_version: i64,
    ) -> Result<i64, StoreError>;

    /// Fetch one record by id.
    async fn get(&self, table: &str, id: &str) -> Result<Option<RawRecord>, StoreError>;

    /// Full scan of a table. Unbounded; result sets are assumed small.
    async fn scan(&self, table: &str) -> Result<Vec<RawRecord>, StoreError>;

    /// Delete by id. Deleting a missing record is a no-op.
    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// A persisted entity: knows its table, its type discriminator, and exposes
/// the shared [`Meta`] block for id/audit/version bookkeeping.
pub trait Entity: Serialize + DeserializeOwned + Send {
    /// Store table holding this entity.
    const TABLE: &'static str;
    /// Value written into the document's `type` field.
    const KIND: &'static str;

    fn meta(&self) -> &Meta;
    fn meta_mut(&mut self) -> &mut Meta;
}

/// Typed access to one entity's table.
///
/// Borrow-per-call like the HTTP handlers use it: cheap to construct, holds
/// no state beyond the store handle.
pub struct Repository<'a, E> {
    store: &'a dyn KeyValueStore,
    _entity: PhantomData<E>,
}

impl<'a, E: Entity> Repository<'a, E> {
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Persist an entity: assigns an id when absent, stamps audit fields with
    /// the given actor, then inserts (no version yet) or updates with the
    /// entity's current version as the expected one. On success the entity
    /// carries the new version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when a concurrent write bumped the
    /// stored version, [`StoreError::NotFound`] when updating a vanished
    /// record, or [`StoreError::Corrupt`] if the entity cannot be encoded.
    pub async fn save(&self, entity: &mut E, actor: &str) -> Result<(), StoreError> {
        let id = match &entity.meta().id {
            Some(id) => id.clone(),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                entity.meta_mut().id = Some(id.clone());
                id
            }
        };
        let expected = entity.meta().version;
        entity.meta_mut().stamp(E::KIND, actor);

        let doc = serde_json::to_value(&*entity).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let version = match expected {
            None => self.store.insert(E::TABLE, &id, doc).await?,
            Some(v) => self.store.update(E::TABLE, &id, doc, v).await?,
        };
        entity.meta_mut().version = Some(version);
        Ok(())
    }

    /// Fetch one entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the stored document does not decode.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<E>, StoreError> {
        match self.store.get(E::TABLE, id).await? {
            Some(record) => Ok(Some(decode(record)?)),
            None => Ok(None),
        }
    }

    /// Fetch every entity in the table (full scan).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if any stored document does not decode.
    pub async fn find_all(&self) -> Result<Vec<E>, StoreError> {
        self.store
            .scan(E::TABLE)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Fetch entities whose `type` discriminator equals `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if any stored document does not decode.
    pub async fn find_by_type(&self, kind: &str) -> Result<Vec<E>, StoreError> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|e| e.meta().kind.as_deref() == Some(kind))
            .collect())
    }

    /// Delete one entity by id. Missing records are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the backend fails.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(E::TABLE, id).await
    }
}

fn decode<E: Entity>(record: RawRecord) -> Result<E, StoreError> {
    let mut entity: E =
        serde_json::from_value(record.doc).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    entity.meta_mut().id = Some(record.id);
    entity.meta_mut().version = Some(record.version);
    Ok(entity)
}

/// Filtered scan: every secondary lookup is the scan primitive plus a
/// predicate. There are no secondary indexes.
///
/// # Errors
///
/// Propagates scan and decode failures from the repository.
pub async fn scan_where<E, F>(repo: &Repository<'_, E>, pred: F) -> Result<Vec<E>, StoreError>
where
    E: Entity,
    F: Fn(&E) -> bool,
{
    Ok(repo.find_all().await?.into_iter().filter(pred).collect())
}

/// Filtered scan returning the first match.
///
/// # Errors
///
/// Propagates scan and decode failures from the repository.
pub async fn scan_first<E, F>(repo: &Repository<'_, E>, pred: F) -> Result<Option<E>, StoreError>
where
    E: Entity,
    F: Fn(&E) -> bool,
{
    Ok(repo.find_all().await?.into_iter().find(pred))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Widget {
        #[serde(flatten)]
        meta: Meta,
        name: String,
    }

    impl Entity for Widget {
        const TABLE: &'static str = "widgets";
        const KIND: &'static str = "WIDGET";

        fn meta(&self) -> &Meta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut Meta {
            &mut self.meta
        }
    }

    fn widget(name: &str) -> Widget {
        Widget {
            meta: Meta::default(),
            name: name.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_version() {
        let store = MemoryStore::new();
        let repo = Repository::<Widget>::new(&store);

        let mut w = widget("anvil");
        repo.save(&mut w, "system").await.unwrap();

        assert!(w.meta.id.is_some());
        assert_eq!(w.meta.version, Some(1));
        assert_eq!(w.meta.kind.as_deref(), Some("WIDGET"));
        assert_eq!(w.meta.created_by.as_deref(), Some("system"));
    }

    #[tokio::test]
    async fn test_save_bumps_version_on_update() {
        let store = MemoryStore::new();
        let repo = Repository::<Widget>::new(&store);

        let mut w = widget("anvil");
        repo.save(&mut w, "system").await.unwrap();
        w.name = "hammer".to_owned();
        repo.save(&mut w, "system").await.unwrap();

        assert_eq!(w.meta.version, Some(2));
        let id = w.meta.id.clone().unwrap();
        let found = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.name, "hammer");
        assert_eq!(found.meta.version, Some(2));
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let store = MemoryStore::new();
        let repo = Repository::<Widget>::new(&store);

        let mut w = widget("anvil");
        repo.save(&mut w, "system").await.unwrap();
        let id = w.meta.id.clone().unwrap();

        // Two readers load the same version, both try to write.
        let mut first = repo.find_by_id(&id).await.unwrap().unwrap();
        let mut second = repo.find_by_id(&id).await.unwrap().unwrap();

        first.name = "hammer".to_owned();
        repo.save(&mut first, "a").await.unwrap();

        second.name = "chisel".to_owned();
        let err = repo.save(&mut second, "b").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // The first write is intact.
        let found = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.name, "hammer");
    }

    #[tokio::test]
    async fn test_scan_where_filters() {
        let store = MemoryStore::new();
        let repo = Repository::<Widget>::new(&store);

        for name in ["anvil", "hammer", "anchor"] {
            let mut w = widget(name);
            repo.save(&mut w, "system").await.unwrap();
        }

        let hits = scan_where(&repo, |w: &Widget| w.name.starts_with("an"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);

        let first = scan_first(&repo, |w: &Widget| w.name == "hammer")
            .await
            .unwrap();
        assert!(first.is_some());
    }

    #[tokio::test]
    async fn test_find_by_type() {
        let store = MemoryStore::new();
        let repo = Repository::<Widget>::new(&store);

        let mut w = widget("anvil");
        repo.save(&mut w, "system").await.unwrap();

        assert_eq!(repo.find_by_type("WIDGET").await.unwrap().len(), 1);
        assert!(repo.find_by_type("GADGET").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let repo = Repository::<Widget>::new(&store);

        let mut w = widget("anvil");
        repo.save(&mut w, "system").await.unwrap();
        let id = w.meta.id.clone().unwrap();

        repo.delete(&id).await.unwrap();
        repo.delete(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }
}
