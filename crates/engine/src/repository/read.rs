//! Read path: id lookups, queries, counts

use rustc_hash::FxHashMap;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use tracing::{debug, warn};

use vessel_core::{
    validate_id_batch, ContentType, IdValue, ItemId, Record, Result, Shape, Target, VesselError,
};
use vessel_storage::{QueryBody, RecordStream};

use super::{into_shapes, Repository, EVENT_SOURCE};
use crate::events::{EventName, EventPayload, QueryEventData};

/// One pending unit of read work
enum Group {
    Ids {
        content_type: ContentType,
        ids: Vec<ItemId>,
    },
    Query {
        content_type: ContentType,
        query: QueryBody,
    },
}

/// Records of the group currently being yielded
struct Running {
    stream: RecordStream,
    project: bool,
}

/// Lazily evaluated read results
///
/// Each type group is fetched only when iteration reaches it, in its own
/// data source scope. The scope is released before the group's records are
/// yielded, so dropping the iterator part way never leaves a scope open.
///
/// After an error is yielded the iterator is exhausted.
pub struct LazyResults<'a> {
    repo: &'a Repository,
    target: Target,
    pending: VecDeque<Group>,
    current: Option<Running>,
}

impl<'a> LazyResults<'a> {
    fn new(repo: &'a Repository, target: Target, pending: VecDeque<Group>) -> Self {
        Self {
            repo,
            target,
            pending,
            current: None,
        }
    }

    /// Target the results are shaped for
    pub fn target(&self) -> Target {
        self.target
    }

    /// Number of type groups not yet fetched
    pub fn pending_groups(&self) -> usize {
        self.pending.len()
    }

    /// Drain every remaining record
    pub fn into_records(self) -> Result<Vec<Record>> {
        self.collect()
    }
}

impl Iterator for LazyResults<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        loop {
            if let Some(running) = self.current.as_mut() {
                match running.stream.next() {
                    Some(record) if running.project => {
                        return Some(self.repo.facade.project(self.target, record));
                    }
                    Some(record) => return Some(Ok(record)),
                    None => self.current = None,
                }
            }

            let group = self.pending.pop_front()?;
            match self.repo.run_group(self.target, group) {
                Ok(running) => self.current = Some(running),
                Err(e) => {
                    self.pending.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl fmt::Debug for LazyResults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyResults")
            .field("target", &self.target)
            .field("pending_groups", &self.pending.len())
            .field("running", &self.current.is_some())
            .finish()
    }
}

impl Repository {
    /// Fetch records by identifier
    ///
    /// Identifiers are grouped by content type in first-appearance order;
    /// each group is one backend query raising `Repository.Get.Items.Ids` or
    /// `Repository.Get.Summaries.Ids`. Unknown identifiers are simply absent
    /// from the results.
    ///
    /// # Errors
    ///
    /// Returns `BatchTooLarge` if any type group has more than
    /// [`vessel_core::MAX_ID_BATCH_SIZE`] identifiers. The check runs before
    /// any group is fetched.
    pub fn get_by_ids<I>(&self, target: Target, ids: I) -> Result<LazyResults<'_>>
    where
        I: IntoIterator<Item = ItemId>,
    {
        let mut index: FxHashMap<ContentType, usize> = FxHashMap::default();
        let mut groups: Vec<(ContentType, Vec<ItemId>)> = Vec::new();
        for id in ids {
            let slot = *index.entry(id.content_type.clone()).or_insert_with(|| {
                groups.push((id.content_type.clone(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(id);
        }

        for (content_type, ids) in &groups {
            if let Err(e) = validate_id_batch(content_type, ids.len()) {
                warn!(content_type = %content_type, requested = ids.len(), "Rejected id batch");
                return Err(e);
            }
        }

        let pending = groups
            .into_iter()
            .map(|(content_type, ids)| Group::Ids { content_type, ids })
            .collect();
        Ok(LazyResults::new(self, target, pending))
    }

    /// Fetch records by identifier into a typed shape
    ///
    /// The read target is the shape's [`Shape::TARGET`].
    pub fn get<T: Shape>(&self, ids: impl IntoIterator<Item = ItemId>) -> Result<Vec<T>> {
        let records = self.get_by_ids(T::TARGET, ids)?.into_records()?;
        into_shapes(records)
    }

    /// Run a query over each listed type, in order
    ///
    /// Each type is one backend query raising `Repository.Get.Items` or
    /// `Repository.Get.Summaries`. Types are not de-duplicated; an empty list
    /// yields nothing.
    pub fn get_by_query(
        &self,
        target: Target,
        types: &[ContentType],
        query: QueryBody,
    ) -> Result<LazyResults<'_>> {
        let pending = types
            .iter()
            .map(|content_type| Group::Query {
                content_type: content_type.clone(),
                query: query.clone(),
            })
            .collect();
        Ok(LazyResults::new(self, target, pending))
    }

    /// Run a query into a typed shape
    pub fn query<T: Shape>(&self, types: &[ContentType], query: QueryBody) -> Result<Vec<T>> {
        let records = self.get_by_query(T::TARGET, types, query)?.into_records()?;
        into_shapes(records)
    }

    /// Count records matching a query across types
    ///
    /// Each type is counted in its own summary-context scope after raising
    /// `Repository.Get.Count`; the counts are summed.
    pub fn count(&self, types: &[ContentType], query: QueryBody) -> Result<usize> {
        let mut total = 0;
        for content_type in types {
            let scope = self.open_scope(true)?;
            let data = QueryEventData::new(scope.get_source(content_type)?, query.clone());
            let dispatch =
                self.events
                    .process(EVENT_SOURCE, EventName::GetCount, EventPayload::Query(data))?;
            let count = dispatch.payload.into_query(dispatch.name)?.run().count();
            debug!(content_type = %content_type, count, "Counted records");
            total += count;
        }
        Ok(total)
    }

    /// Fetch one group in its own scope
    fn run_group(&self, target: Target, group: Group) -> Result<Running> {
        let scope = self.open_scope(target.is_summary())?;
        let (name, content_type, data) = match group {
            Group::Ids { content_type, ids } => {
                let query = self.ids_query(&content_type, &ids)?;
                let data = QueryEventData::new(scope.get_source(&content_type)?, query).with_ids(ids);
                (EventName::for_ids(target), content_type, data)
            }
            Group::Query {
                content_type,
                query,
            } => {
                let data = QueryEventData::new(scope.get_source(&content_type)?, query);
                (EventName::for_query(target), content_type, data)
            }
        };

        let dispatch = self
            .events
            .process(EVENT_SOURCE, name, EventPayload::Query(data))?;
        let data = dispatch.payload.into_query(dispatch.name)?;
        let project = data.results.is_none();
        debug!(content_type = %content_type, event = %name, replaced = !project, "Fetched group");
        Ok(Running {
            stream: data.run(),
            project,
        })
    }

    /// Query keeping the records whose identifier is one of `ids`
    ///
    /// Types the registry does not know match nothing.
    fn ids_query(&self, content_type: &ContentType, ids: &[ItemId]) -> Result<QueryBody> {
        let field = match self.identifier_field(content_type) {
            Ok(field) => field,
            Err(VesselError::UnregisteredType(_)) => {
                return Ok(QueryBody::new(|_| RecordStream::empty()))
            }
            Err(e) => return Err(e),
        };
        let wanted: HashSet<IdValue> = ids.iter().map(|id| id.id.clone()).collect();
        let name = field.name;
        let kind = field.kind;
        Ok(QueryBody::new(move |source| {
            source.where_in(name.clone(), kind, wanted.clone())
        }))
    }
}
