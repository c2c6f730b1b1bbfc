//! Call-recording data source wrapper

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use vessel_core::{ContentType, Record, Result, VesselError};

use crate::stream::RecordStream;
use crate::traits::{DataSource, DataSourceFactory, Keying};

/// Storage call recorded by an [`InstrumentedFactory`]
#[derive(Debug, Clone, PartialEq)]
pub enum StorageCall {
    /// A scope was acquired
    Open {
        /// Whether the scope was summary-only
        summary_context: bool,
    },
    /// `get_source` for a type
    GetSource(ContentType),
    /// `create` with the record as passed
    Create(Record),
    /// `update` with the record as passed
    Update(Record),
    /// `delete` with the record as passed
    Delete(Record),
    /// `save_changes`
    SaveChanges,
    /// A query timeout was applied to the scope
    QueryTimeout(Duration),
    /// The scope was dropped
    Release,
}

/// Shared, ordered log of storage calls
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<StorageCall>>>,
}

impl CallLog {
    fn push(&self, call: StorageCall) {
        self.calls.lock().push(call);
    }

    /// Copy of every call so far
    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().clone()
    }

    /// Number of calls matching a predicate
    pub fn count(&self, predicate: impl Fn(&StorageCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| predicate(c)).count()
    }

    /// Scopes opened minus scopes released
    pub fn open_scopes(&self) -> isize {
        let calls = self.calls.lock();
        let opened = calls
            .iter()
            .filter(|c| matches!(c, StorageCall::Open { .. }))
            .count() as isize;
        let released = calls
            .iter()
            .filter(|c| matches!(c, StorageCall::Release))
            .count() as isize;
        opened - released
    }

    /// Forget every recorded call
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Factory wrapper recording every call into a [`CallLog`]
#[derive(Debug)]
pub struct InstrumentedFactory<F> {
    inner: F,
    log: CallLog,
    fail_writes: bool,
}

impl<F: DataSourceFactory> InstrumentedFactory<F> {
    /// Wrap a factory
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            log: CallLog::default(),
            fail_writes: false,
        }
    }

    /// Make every create/update/delete fail with a storage error
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Handle to the call log
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl<F: DataSourceFactory> DataSourceFactory for InstrumentedFactory<F> {
    fn create(&self, summary_context: bool) -> Result<Box<dyn DataSource>> {
        let inner = self.inner.create(summary_context)?;
        self.log.push(StorageCall::Open { summary_context });
        Ok(Box::new(InstrumentedSource {
            inner,
            log: self.log.clone(),
            fail_writes: self.fail_writes,
        }))
    }

    fn keying(&self) -> Keying<'_> {
        self.inner.keying()
    }
}

struct InstrumentedSource {
    inner: Box<dyn DataSource>,
    log: CallLog,
    fail_writes: bool,
}

impl InstrumentedSource {
    fn check_write(&self, op: &str) -> Result<()> {
        if self.fail_writes {
            return Err(VesselError::storage(format!("injected {} failure", op)));
        }
        Ok(())
    }
}

impl DataSource for InstrumentedSource {
    fn get_source(&self, content_type: &ContentType) -> Result<RecordStream> {
        self.log.push(StorageCall::GetSource(content_type.clone()));
        self.inner.get_source(content_type)
    }

    fn create(&mut self, record: &Record) -> Result<()> {
        self.log.push(StorageCall::Create(record.clone()));
        self.check_write("create")?;
        self.inner.create(record)
    }

    fn update(&mut self, record: &Record) -> Result<()> {
        self.log.push(StorageCall::Update(record.clone()));
        self.check_write("update")?;
        self.inner.update(record)
    }

    fn delete(&mut self, record: &Record) -> Result<()> {
        self.log.push(StorageCall::Delete(record.clone()));
        self.check_write("delete")?;
        self.inner.delete(record)
    }

    fn save_changes(&mut self) -> Result<()> {
        self.log.push(StorageCall::SaveChanges);
        self.inner.save_changes()
    }

    fn set_query_timeout(&mut self, timeout: Duration) {
        self.log.push(StorageCall::QueryTimeout(timeout));
        self.inner.set_query_timeout(timeout);
    }
}

impl Drop for InstrumentedSource {
    fn drop(&mut self) {
        self.log.push(StorageCall::Release);
    }
}
