//! Write path: set (add or update) and delete

use chrono::{SecondsFormat, Utc};
use rustc_hash::FxHashSet;
use tracing::debug;

use vessel_core::{
    audit, Content, ContentType, IdField, IdKind, IdValue, Metadata, Record, Result, Value,
    VesselError,
};
use vessel_storage::DataSource;

use super::{Repository, EVENT_SOURCE};
use crate::events::{
    Dispatch, EventName, EventPayload, RepositoryEventData, WriteAction, WriteOptions,
};

impl Repository {
    /// Create or update records
    ///
    /// All items share one data source scope. Per item, in order:
    /// 1. decide add vs update: `options.create` if set, otherwise add iff the
    ///    identifier holds its type's default value
    /// 2. raise `Repository.Set.Add` or `Repository.Set.Update`
    /// 3. act on the (possibly renamed) event with the (possibly replaced)
    ///    record; a `None` record skips storage, a handled write skips the
    ///    backend call
    /// 4. write the final record back into the caller's slot
    ///
    /// Changes are flushed once if any item was left to the backend, then
    /// `Repository.Saved.*` is raised per item.
    ///
    /// Returns, per item, whether it was an add.
    ///
    /// # Errors
    ///
    /// Stops at the first failing item; earlier items stay written.
    pub fn set(&self, items: &mut [Record], options: &WriteOptions) -> Result<Vec<bool>> {
        let mut created = Vec::with_capacity(items.len());
        let mut saved = Vec::with_capacity(items.len());
        let mut any_unhandled = false;
        let mut seeded = FxHashSet::default();

        let mut scope = self.open_scope(false)?;
        for item in items.iter_mut() {
            let is_add = match options.create {
                Some(create) => create,
                None => {
                    let field = self.identifier_field(item.content_type())?;
                    field
                        .kind
                        .is_default(item.get(&field.name).unwrap_or(&Value::Null))
                }
            };
            let name = if is_add {
                EventName::SetAdd
            } else {
                EventName::SetUpdate
            };

            let payload = EventPayload::Write(RepositoryEventData::new(item.clone(), options.clone()));
            let dispatch = self.events.process(EVENT_SOURCE, name, payload)?;
            let (action, data) = write_outcome(dispatch)?;
            if !data.handled {
                any_unhandled = true;
            }

            let mut container = data.container;
            if let Some(record) = container.as_mut() {
                self.apply(&mut *scope, action, record, &data.options, data.handled, &mut seeded)?;
                *item = record.clone();
            }
            saved.push((action, container));
            created.push(action == WriteAction::Add);
        }

        if !saved.is_empty() && any_unhandled {
            scope.save_changes()?;
            debug!(items = saved.len(), "Saved changes");
        }
        drop(scope);

        for (action, container) in saved {
            let data = RepositoryEventData {
                container,
                options: options.clone(),
                handled: false,
            };
            self.events
                .process(EVENT_SOURCE, action.saved_event(), EventPayload::Write(data))?;
        }
        Ok(created)
    }

    /// Typed [`Repository::set`] of one item; returns whether it was an add
    pub fn set_item<T: Content>(&self, item: &mut T, options: &WriteOptions) -> Result<bool> {
        let mut items = [item.to_record()?];
        let created = self.set(&mut items, options)?;
        *item = T::from_record(&items[0])?;
        Ok(created.first().copied().unwrap_or(false))
    }

    /// Delete a record
    ///
    /// Raises `Repository.Set.Delete`. Handlers may turn the delete into an
    /// add or an update, mark it handled, or clear the record to suppress
    /// storage entirely. The `Repository.Saved.*` mirror of the final event
    /// is raised with the original record.
    pub fn delete(&self, item: &Record, options: &WriteOptions) -> Result<()> {
        let mut scope = self.open_scope(false)?;
        let payload = EventPayload::Write(RepositoryEventData::new(item.clone(), options.clone()));
        let dispatch = self
            .events
            .process(EVENT_SOURCE, EventName::SetDelete, payload)?;
        let (action, data) = write_outcome(dispatch)?;

        if let Some(mut record) = data.container {
            let mut seeded = FxHashSet::default();
            self.apply(&mut *scope, action, &mut record, &data.options, data.handled, &mut seeded)?;
            if !data.handled {
                scope.save_changes()?;
                debug!("Saved changes");
            }
        }
        drop(scope);

        let notification = RepositoryEventData::new(item.clone(), options.clone());
        self.events.process(
            EVENT_SOURCE,
            action.saved_event(),
            EventPayload::Write(notification),
        )?;
        Ok(())
    }

    /// Typed [`Repository::delete`]
    pub fn delete_item<T: Content>(&self, item: &T, options: &WriteOptions) -> Result<()> {
        self.delete(&item.to_record()?, options)
    }

    /// Storage step of one write
    ///
    /// `seeded` holds the types whose integer sequence was already brought
    /// past the backend's stored identifiers within this unit of work.
    fn apply(
        &self,
        scope: &mut dyn DataSource,
        action: WriteAction,
        record: &mut Record,
        options: &WriteOptions,
        handled: bool,
        seeded: &mut FxHashSet<ContentType>,
    ) -> Result<()> {
        match action {
            WriteAction::Add => self.add(scope, record, options, handled, seeded),
            WriteAction::Update if !handled => {
                self.observe_identifier(record);
                scope.update(record)
            }
            WriteAction::Delete if !handled => scope.delete(record),
            _ => Ok(()),
        }
    }

    /// Default add: assign an identifier, stamp audit fields, create
    ///
    /// The identifier and audit stamps are applied even when a handler
    /// performed the write.
    fn add(
        &self,
        scope: &mut dyn DataSource,
        record: &mut Record,
        options: &WriteOptions,
        handled: bool,
        seeded: &mut FxHashSet<ContentType>,
    ) -> Result<()> {
        let content_type = record.content_type().clone();
        let field = self.identifier_field(&content_type)?;
        if field
            .kind
            .is_default(record.get(&field.name).unwrap_or(&Value::Null))
        {
            if field.kind == IdKind::Int && seeded.insert(content_type.clone()) {
                self.seed_sequence(&*scope, &content_type, &field)?;
            }
            let id = self.registry.allocate_id(&content_type, field.kind)?;
            debug!(content_type = %content_type, id = %id, "Assigned identifier");
            record.set(field.name.clone(), id.to_value());
        } else {
            self.observe_identifier(record);
        }

        if self.registry.is_auditable(&content_type) {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
            record.set(audit::CREATED, now.clone());
            record.set(audit::UPDATED, now);
            record.set(audit::USER_CREATED, options.actor.clone());
            record.set(audit::USER_UPDATED, options.actor.clone());
        }

        if !handled {
            scope.create(record)?;
        }
        Ok(())
    }

    /// Advance the integer sequence past the largest identifier the backend
    /// already holds for the type
    fn seed_sequence(
        &self,
        scope: &dyn DataSource,
        content_type: &ContentType,
        field: &IdField,
    ) -> Result<()> {
        let stored_max = scope
            .get_source(content_type)?
            .filter_map(|r| r.get(&field.name).and_then(Value::as_int))
            .max();
        if let Some(max) = stored_max {
            debug!(content_type = %content_type, max, "Seeded identifier sequence");
            self.registry.observe_id(content_type, &IdValue::Int(max));
        }
        Ok(())
    }

    /// Keep the integer sequence ahead of explicitly written identifiers
    fn observe_identifier(&self, record: &Record) {
        if let Ok(id) = self
            .registry
            .item_id(record, self.config.id_name.as_deref())
        {
            self.registry.observe_id(&id.content_type, &id.id);
        }
    }
}

/// Action and payload a write dispatch resolved to
///
/// Handlers may rename a `Set.*` event only to another `Set.*` event.
fn write_outcome(dispatch: Dispatch) -> Result<(WriteAction, RepositoryEventData)> {
    let action = match dispatch.name.write_action() {
        Some(action) if dispatch.name.is_set() => action,
        _ => {
            return Err(VesselError::handler(format!(
                "write event renamed to non-write event {}",
                dispatch.name
            )))
        }
    };
    let data = dispatch.payload.into_write(dispatch.name)?;
    Ok((action, data))
}
