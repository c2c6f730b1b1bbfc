//! Event payloads

use std::collections::BTreeMap;

use vessel_core::{ItemId, Record, Result, Value, VesselError};
use vessel_storage::{QueryBody, RecordStream};

use super::EventName;

/// Caller options for a write, visible to write handlers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOptions {
    /// Force add (`Some(true)`) or update (`Some(false)`); `None` decides
    /// from the identifier
    pub create: Option<bool>,
    /// Skip front-end checks that would stop the write
    pub bypass_checks: bool,
    /// Current actor, stamped into audit fields on add
    pub actor: Option<String>,
    /// Free-form caller options
    pub extra: BTreeMap<String, Value>,
}

impl WriteOptions {
    /// Default options: decide add-vs-update, no actor
    pub fn new() -> Self {
        Self::default()
    }

    /// Force add or update
    pub fn create(mut self, create: bool) -> Self {
        self.create = Some(create);
        self
    }

    /// Skip front-end checks
    pub fn bypass_checks(mut self, bypass: bool) -> Self {
        self.bypass_checks = bypass;
        self
    }

    /// Act as `actor`
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Attach a free-form option
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Read-side payload: the source, the query about to run on it, and an
/// optional materialized result that replaces both
#[derive(Debug)]
pub struct QueryEventData {
    /// Records of the type being read
    pub source: RecordStream,
    /// Transform about to be applied to `source`
    pub query: QueryBody,
    /// Identifiers requested, for id lookups
    pub ids: Option<Vec<ItemId>>,
    /// Alternative results; when set, `source` and `query` are ignored
    pub results: Option<Vec<Record>>,
}

impl QueryEventData {
    /// Payload for a query
    pub fn new(source: RecordStream, query: QueryBody) -> Self {
        Self {
            source,
            query,
            ids: None,
            results: None,
        }
    }

    /// Attach the requested identifiers
    pub fn with_ids(mut self, ids: Vec<ItemId>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Run the payload: the alternative results if present, else the query
    /// applied to the source
    pub fn run(self) -> RecordStream {
        match self.results {
            Some(results) => RecordStream::from_records(results),
            None => self.query.apply(self.source),
        }
    }
}

/// Write-side payload
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryEventData {
    /// Record being written; `None` suppresses the storage step
    pub container: Option<Record>,
    /// Options of the write
    pub options: WriteOptions,
    /// Set by handlers that performed the storage step themselves
    pub handled: bool,
}

impl RepositoryEventData {
    /// Unhandled payload for a record
    pub fn new(container: Record, options: WriteOptions) -> Self {
        Self {
            container: Some(container),
            options,
            handled: false,
        }
    }
}

/// Payload carried by a dispatch
#[derive(Debug)]
pub enum EventPayload {
    /// Freshly constructed record (`Repository.New`)
    New(Record),
    /// Read payload (`Repository.Get.*`)
    Query(QueryEventData),
    /// Write payload (`Repository.Set.*`, `Repository.Saved.*`)
    Write(RepositoryEventData),
}

impl EventPayload {
    fn kind(&self) -> &'static str {
        match self {
            EventPayload::New(_) => "new",
            EventPayload::Query(_) => "query",
            EventPayload::Write(_) => "write",
        }
    }

    fn mismatch(&self, expected: &str, name: EventName) -> VesselError {
        VesselError::handler(format!(
            "{} carries a {} payload, expected {}",
            name,
            self.kind(),
            expected
        ))
    }

    /// Mutable record of a `New` payload
    pub fn as_new_mut(&mut self) -> Option<&mut Record> {
        match self {
            EventPayload::New(record) => Some(record),
            _ => None,
        }
    }

    /// Mutable query payload
    pub fn as_query_mut(&mut self) -> Option<&mut QueryEventData> {
        match self {
            EventPayload::Query(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable write payload
    pub fn as_write_mut(&mut self) -> Option<&mut RepositoryEventData> {
        match self {
            EventPayload::Write(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn into_new(self, name: EventName) -> Result<Record> {
        match self {
            EventPayload::New(record) => Ok(record),
            other => Err(other.mismatch("new", name)),
        }
    }

    pub(crate) fn into_query(self, name: EventName) -> Result<QueryEventData> {
        match self {
            EventPayload::Query(data) => Ok(data),
            other => Err(other.mismatch("query", name)),
        }
    }

    pub(crate) fn into_write(self, name: EventName) -> Result<RepositoryEventData> {
        match self {
            EventPayload::Write(data) => Ok(data),
            other => Err(other.mismatch("write", name)),
        }
    }
}
