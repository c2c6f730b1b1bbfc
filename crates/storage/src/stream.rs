//! Queryable record sequences and composable query transforms
//!
//! [`RecordStream`] is the "queryable" a data source hands out for one type:
//! an owned, lazily evaluated sequence of records with filtering/ordering
//! adaptors. [`QueryBody`] is a shareable transform `RecordStream ->
//! RecordStream`; callers pass one in, event handlers may replace or extend it
//! before the repository applies it.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use vessel_core::{IdKind, IdValue, Record, Value};

/// Owned, lazily evaluated sequence of records
pub struct RecordStream {
    inner: Box<dyn Iterator<Item = Record> + Send>,
}

impl RecordStream {
    /// Wrap any owned iterator of records
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Record> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    /// A stream with no records
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// A stream over materialized records
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(records.into_iter())
    }

    /// Keep records matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: FnMut(&Record) -> bool + Send + 'static,
    {
        Self::new(self.inner.filter(predicate))
    }

    /// Keep records whose field equals a value
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        self.filter(move |r| r.get(&field) == Some(&value))
    }

    /// Keep records whose identifier field is one of `ids`
    ///
    /// Values that do not parse as `kind` never match.
    pub fn where_in(self, field: impl Into<String>, kind: IdKind, ids: HashSet<IdValue>) -> Self {
        let field = field.into();
        self.filter(move |r| {
            r.get(&field)
                .and_then(|v| kind.parse(v).ok())
                .map_or(false, |id| ids.contains(&id))
        })
    }

    /// Transform each record
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnMut(Record) -> Record + Send + 'static,
    {
        Self::new(self.inner.map(f))
    }

    /// Order records with a comparator (materializes the stream)
    pub fn sort_by<F>(self, compare: F) -> Self
    where
        F: FnMut(&Record, &Record) -> Ordering,
    {
        let mut records: Vec<Record> = self.inner.collect();
        records.sort_by(compare);
        Self::from_records(records)
    }

    /// Order records by a field; records whose values do not compare keep
    /// their relative order
    pub fn sort_by_field(self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.sort_by(move |a, b| match (a.get(&field), b.get(&field)) {
            (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
    }

    /// Skip the first `n` records
    pub fn skip(self, n: usize) -> Self {
        Self::new(self.inner.skip(n))
    }

    /// Keep at most `n` records
    pub fn take(self, n: usize) -> Self {
        Self::new(self.inner.take(n))
    }
}

impl Iterator for RecordStream {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.inner.next()
    }
}

impl fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStream").finish_non_exhaustive()
    }
}

/// Shareable query transform over a [`RecordStream`]
#[derive(Clone)]
pub struct QueryBody(Arc<dyn Fn(RecordStream) -> RecordStream + Send + Sync>);

impl QueryBody {
    /// Wrap a transform
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(RecordStream) -> RecordStream + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// The transform that returns its input unchanged
    pub fn identity() -> Self {
        Self::new(|s| s)
    }

    /// A transform keeping records that match a predicate
    pub fn filter<F>(predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Self::new(move |s| {
            let predicate = Arc::clone(&predicate);
            s.filter(move |r| predicate(r))
        })
    }

    /// Apply the transform
    pub fn apply(&self, source: RecordStream) -> RecordStream {
        (self.0)(source)
    }

    /// Compose: apply `self`, then `next`
    pub fn then(self, next: QueryBody) -> Self {
        Self::new(move |s| next.apply(self.apply(s)))
    }
}

impl Default for QueryBody {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for QueryBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("QueryBody(..)")
    }
}
