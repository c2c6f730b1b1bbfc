//! Storage contract
//!
//! This module defines the [`DataSource`] and [`DataSourceFactory`] traits
//! that let the repository run against any backend without knowing it.
//!
//! A data source is one unit of work. Its lifetime is its ownership: the
//! repository acquires a boxed source from the factory and the backend's
//! resources are released when that box is dropped, on every exit path.

use std::time::Duration;

use vessel_core::{ContentType, Record, Result};

use crate::stream::RecordStream;

/// One backend scope, alive for one logical repository operation
///
/// Thread safety: a scope is used from one thread at a time but may be moved
/// between threads (requires `Send`).
pub trait DataSource: Send {
    /// Queryable sequence of all stored records of a type
    ///
    /// Returns an empty stream, not an error, for types the backend has
    /// never seen.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_source(&self, content_type: &ContentType) -> Result<RecordStream>;

    /// Insert a new record
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write. Whether an existing
    /// identifier is an error is backend policy.
    fn create(&mut self, record: &Record) -> Result<()>;

    /// Insert or replace a record
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn update(&mut self, record: &Record) -> Result<()>;

    /// Remove a record; absent records are not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    fn delete(&mut self, record: &Record) -> Result<()>;

    /// Flush pending writes
    ///
    /// Backends without buffering implement this as a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn save_changes(&mut self) -> Result<()>;

    /// Bound the time queries on this scope may take
    ///
    /// Backends that cannot enforce a timeout ignore it.
    fn set_query_timeout(&mut self, _timeout: Duration) {}
}

/// How a backend derives the identity of the records it stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keying<'a> {
    /// Identity is the backend's own concern
    Opaque,
    /// Records are keyed through the shared metadata, using the given
    /// explicit identifier field name or the registered identifier
    Metadata(Option<&'a str>),
}

/// Produces one [`DataSource`] per unit of work
///
/// Thread safety: factories are shared by every repository operation
/// (requires `Send + Sync`).
pub trait DataSourceFactory: Send + Sync {
    /// Acquire a scope
    ///
    /// `summary_context` is true for summary-only (read-optimized) work and
    /// false when full records are read or written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    fn create(&self, summary_context: bool) -> Result<Box<dyn DataSource>>;

    /// How stored records are keyed
    ///
    /// The repository checks its configured identifier field against a
    /// [`Keying::Metadata`] backend when it is built.
    fn keying(&self) -> Keying<'_> {
        Keying::Opaque
    }
}
