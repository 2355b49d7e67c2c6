//! In-memory store implementation for tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{KeyValueStore, RawRecord, StoreError};

/// In-memory key-value store backed by per-table `BTreeMap`s.
///
/// Scan order is deterministic (by id). Versioning semantics match
/// [`PgStore`](super::PgStore): inserts start at 1, updates check the
/// expected version and bump it.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, BTreeMap<String, (i64, Value)>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held in `table`.
    pub async fn len(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn insert(&self, table: &str, id: &str, doc: Value) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let records = tables.entry(table.to_owned()).or_default();
        if records.contains_key(id) {
            return Err(StoreError::Conflict(format!(
                "record {id} already exists in {table}"
            )));
        }
        records.insert(id.to_owned(), (1, doc));
        Ok(1)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        doc: Value,
        expected_version: i64,
    ) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let records = tables.entry(table.to_owned()).or_default();
        match records.get_mut(id) {
            None => Err(StoreError::NotFound),
            Some((version, _)) if *version != expected_version => Err(StoreError::Conflict(
                format!("expected version {expected_version}, stored version is {version}"),
            )),
            Some(slot) => {
                slot.0 += 1;
                slot.1 = doc;
                Ok(slot.0)
            }
        }
    }

    async fn get(&self, table: &str, id: &str) -> Result<Option<RawRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .get(table)
            .and_then(|records| records.get(id))
            .map(|(version, doc)| RawRecord {
                id: id.to_owned(),
                version: *version,
                doc: doc.clone(),
            }))
    }

    async fn scan(&self, table: &str) -> Result<Vec<RawRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .get(table)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, (version, doc))| RawRecord {
                        id: id.clone(),
                        version: *version,
                        doc: doc.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        if let Some(records) = self.tables.write().await.get_mut(table) {
            records.remove(id);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
