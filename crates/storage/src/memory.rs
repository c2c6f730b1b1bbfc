//! In-memory reference backend
//!
//! `MemoryStore` is a shared map of content type → (ItemId → record) built
//! from nested DashMaps. Every `MemoryDataSource` handed out by a
//! `MemoryDataSourceFactory` reads and writes the same store, so writes are
//! visible to later scopes immediately.
//!
//! # Design
//!
//! - Outer DashMap: one entry per content type, created on first write
//! - Inner DashMap: records of that type keyed by ItemId
//! - Different types never contend; within a type only the target shard locks
//!
//! # Semantics
//!
//! - `get_source`: snapshot of the type's records in ItemId order; empty for
//!   unseen types
//! - `create`: insert only if the ItemId is absent (existing record kept)
//! - `update`: unconditional upsert
//! - `delete`: remove if present, otherwise no-op
//! - `save_changes` and release: no-ops (writes are visible immediately)

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use vessel_core::{ContentType, ItemId, Metadata, Record, Result};

use crate::stream::RecordStream;
use crate::traits::{DataSource, DataSourceFactory, Keying};

/// Shared in-memory store of records
///
/// # Thread Safety
///
/// All operations are thread-safe. Last write wins per identifier; no
/// read-modify-write atomicity is offered beyond single calls.
pub struct MemoryStore {
    data: DashMap<ContentType, DashMap<ItemId, Record>>,
    metadata: Arc<dyn Metadata>,
    id_name: Option<String>,
}

impl MemoryStore {
    /// Create an empty store deriving ItemIds through `metadata`
    pub fn new(metadata: Arc<dyn Metadata>) -> Self {
        Self {
            data: DashMap::new(),
            metadata,
            id_name: None,
        }
    }

    /// Use an explicit identifier field name when deriving ItemIds
    ///
    /// A repository over this store adopts the name when its own
    /// configuration leaves `id_name` unset.
    pub fn with_id_name(mut self, id_name: impl Into<String>) -> Self {
        self.id_name = Some(id_name.into());
        self
    }

    /// Explicit identifier field name, if any
    pub fn id_name(&self) -> Option<&str> {
        self.id_name.as_deref()
    }

    fn item_id(&self, record: &Record) -> Result<ItemId> {
        self.metadata.item_id(record, self.id_name.as_deref())
    }

    /// Records of a type in ItemId order
    pub fn snapshot(&self, content_type: &ContentType) -> Vec<Record> {
        let Some(records) = self.data.get(content_type) else {
            return Vec::new();
        };
        let mut entries: Vec<(ItemId, Record)> = records
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, r)| r).collect()
    }

    /// Look up one record
    pub fn get(&self, id: &ItemId) -> Option<Record> {
        self.data
            .get(&id.content_type)
            .and_then(|records| records.get(id).map(|r| r.value().clone()))
    }

    /// Whether a record is stored under this ItemId
    pub fn contains(&self, id: &ItemId) -> bool {
        self.data
            .get(&id.content_type)
            .map_or(false, |records| records.contains_key(id))
    }

    /// Number of records of a type
    pub fn len(&self, content_type: &ContentType) -> usize {
        self.data.get(content_type).map_or(0, |records| records.len())
    }

    /// Number of records across all types
    pub fn total_records(&self) -> usize {
        self.data.iter().map(|e| e.value().len()).sum()
    }

    /// Drop every record
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Insert if absent; returns whether the record was inserted
    pub fn insert_new(&self, record: &Record) -> Result<bool> {
        let id = self.item_id(record)?;
        let records = self
            .data
            .entry(id.content_type.clone())
            .or_default()
            .downgrade();
        let mut inserted = false;
        records.entry(id.clone()).or_insert_with(|| {
            inserted = true;
            record.clone()
        });
        if !inserted {
            debug!(item = %id, "Create skipped, identifier already stored");
        }
        Ok(inserted)
    }

    /// Insert or replace
    pub fn upsert(&self, record: &Record) -> Result<()> {
        let id = self.item_id(record)?;
        let records = self
            .data
            .entry(id.content_type.clone())
            .or_default()
            .downgrade();
        records.insert(id, record.clone());
        Ok(())
    }

    /// Remove if present; returns the removed record
    pub fn remove(&self, record: &Record) -> Result<Option<Record>> {
        let id = self.item_id(record)?;
        Ok(self
            .data
            .get(&id.content_type)
            .and_then(|records| records.remove(&id).map(|(_, r)| r)))
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("types", &self.data.len())
            .field("records", &self.total_records())
            .field("id_name", &self.id_name)
            .finish()
    }
}

/// One unit of work against a [`MemoryStore`]
#[derive(Debug)]
pub struct MemoryDataSource {
    store: Arc<MemoryStore>,
    summary_context: bool,
    query_timeout: Option<Duration>,
}

impl MemoryDataSource {
    /// Open a scope on a store
    pub fn new(store: Arc<MemoryStore>, summary_context: bool) -> Self {
        Self {
            store,
            summary_context,
            query_timeout: None,
        }
    }

    /// Whether the scope was opened for summary-only work
    pub fn is_summary_context(&self) -> bool {
        self.summary_context
    }

    /// Query timeout requested for this scope (recorded, not enforced)
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }
}

impl DataSource for MemoryDataSource {
    fn get_source(&self, content_type: &ContentType) -> Result<RecordStream> {
        Ok(RecordStream::from_records(self.store.snapshot(content_type)))
    }

    fn create(&mut self, record: &Record) -> Result<()> {
        self.store.insert_new(record).map(|_| ())
    }

    fn update(&mut self, record: &Record) -> Result<()> {
        self.store.upsert(record)
    }

    fn delete(&mut self, record: &Record) -> Result<()> {
        self.store.remove(record).map(|_| ())
    }

    fn save_changes(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_query_timeout(&mut self, timeout: Duration) {
        self.query_timeout = Some(timeout);
    }
}

/// Factory handing out [`MemoryDataSource`] scopes over one shared store
#[derive(Debug, Clone)]
pub struct MemoryDataSourceFactory {
    store: Arc<MemoryStore>,
}

impl MemoryDataSourceFactory {
    /// Create a factory over a store
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// The shared store
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }
}

impl DataSourceFactory for MemoryDataSourceFactory {
    fn create(&self, summary_context: bool) -> Result<Box<dyn DataSource>> {
        Ok(Box::new(MemoryDataSource::new(
            Arc::clone(&self.store),
            summary_context,
        )))
    }

    fn keying(&self) -> Keying<'_> {
        Keying::Metadata(self.store.id_name())
    }
}
