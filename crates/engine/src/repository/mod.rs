//! Repository: the persistence mediator
//!
//! The repository reads and writes records of any registered content type
//! through a [`DataSourceFactory`], raising a named event at every step so
//! extension code can redirect or replace what happens.
//!
//! # Units of work
//!
//! - Reads: one data source scope per type group, opened when the result
//!   iterator reaches that group
//! - Writes: one scope for the whole `set` or `delete` call
//!
//! Scopes are boxed [`DataSource`]s and are released when dropped, on every
//! exit path.
//!
//! # Example
//!
//! ```ignore
//! use vessel::{Repository, WriteOptions, Target};
//!
//! let repo = Repository::builder(registry, factory).events(hub).build()?;
//! let mut page = repo.new_item::<Page>()?;
//! page.title = "Hello".into();
//! repo.set_item(&mut page, &WriteOptions::new().actor("alice"))?;
//! let pages: Vec<Page> = repo.get(vec![ItemId::new("Page", page.id)])?;
//! ```

mod read;
mod write;

pub use read::LazyResults;

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use vessel_core::{
    Content, ContentRegistry, ContentType, IdField, Metadata, Record, Result, Shape, VesselError,
};
use vessel_storage::{DataSource, DataSourceFactory, Keying};

use crate::config::RepositoryConfig;
use crate::events::{EventHub, EventName, EventPayload};
use crate::facade::Facade;

/// Name repository events are raised under
pub const EVENT_SOURCE: &str = "Repository";

/// Backend-agnostic persistence mediator
///
/// # Thread Safety
///
/// `Repository` is `Send + Sync`; share it behind an `Arc`. Each operation
/// acquires its own data source scopes.
pub struct Repository {
    registry: Arc<ContentRegistry>,
    factory: Arc<dyn DataSourceFactory>,
    events: Arc<EventHub>,
    facade: Facade,
    config: RepositoryConfig,
}

impl Repository {
    /// Start building a repository over a registry and a backend
    pub fn builder(
        registry: Arc<ContentRegistry>,
        factory: Arc<dyn DataSourceFactory>,
    ) -> RepositoryBuilder {
        RepositoryBuilder {
            registry,
            factory,
            events: None,
            config: RepositoryConfig::default(),
        }
    }

    /// Repository with default configuration
    ///
    /// The identifier field name is taken from the backend when it keys
    /// records through an explicit one.
    pub fn new(
        registry: Arc<ContentRegistry>,
        factory: Arc<dyn DataSourceFactory>,
        events: Arc<EventHub>,
    ) -> Self {
        let mut config = RepositoryConfig::default();
        if let Keying::Metadata(Some(name)) = factory.keying() {
            config.id_name = Some(name.to_string());
        }
        Self::assemble(registry, factory, events, config)
    }

    fn assemble(
        registry: Arc<ContentRegistry>,
        factory: Arc<dyn DataSourceFactory>,
        events: Arc<EventHub>,
        config: RepositoryConfig,
    ) -> Self {
        let metadata: Arc<dyn Metadata> = Arc::clone(&registry) as Arc<dyn Metadata>;
        let facade = Facade::new(metadata, config.id_name.clone());
        Self {
            registry,
            factory,
            events,
            facade,
            config,
        }
    }

    /// The event hub handlers register on
    pub fn events(&self) -> &Arc<EventHub> {
        &self.events
    }

    /// The content registry
    pub fn registry(&self) -> &Arc<ContentRegistry> {
        &self.registry
    }

    /// Active configuration
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Summary layouts and projection
    pub fn facade(&self) -> &Facade {
        &self.facade
    }

    /// Fields a summary of `content_type` carries, identifier last
    pub fn summary_fields(&self, content_type: &ContentType) -> Result<Vec<String>> {
        let (_, fields) = self.facade.summary_layout(content_type)?;
        Ok(fields.to_vec())
    }

    /// Create a fresh default record of a registered type
    ///
    /// Raises `Repository.New`; handlers may adjust or replace the record.
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredType` for unknown types, or a handler error.
    pub fn new_record(&self, content_type: &ContentType) -> Result<Record> {
        let record = self.registry.new_record(content_type)?;
        let dispatch = self
            .events
            .process(EVENT_SOURCE, EventName::New, EventPayload::New(record))?;
        dispatch.payload.into_new(dispatch.name)
    }

    /// Typed [`Repository::new_record`]
    pub fn new_item<T: Content>(&self) -> Result<T> {
        let record = self.new_record(&T::content_type())?;
        T::from_record(&record)
    }

    fn identifier_field(&self, content_type: &ContentType) -> Result<IdField> {
        self.registry
            .identifier_field(content_type, self.config.id_name.as_deref())
    }

    fn open_scope(&self, summary_context: bool) -> Result<Box<dyn DataSource>> {
        let mut scope = self.factory.create(summary_context)?;
        if let Some(timeout) = self.config.query_timeout() {
            scope.set_query_timeout(timeout);
        }
        debug!(summary_context, "Opened data source scope");
        Ok(scope)
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("registry", &self.registry)
            .field("events", &self.events)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Repository`]
pub struct RepositoryBuilder {
    registry: Arc<ContentRegistry>,
    factory: Arc<dyn DataSourceFactory>,
    events: Option<Arc<EventHub>>,
    config: RepositoryConfig,
}

impl RepositoryBuilder {
    /// Share an existing event hub (a fresh one is created otherwise)
    pub fn events(mut self, events: Arc<EventHub>) -> Self {
        self.events = Some(events);
        self
    }

    /// Use a configuration
    pub fn config(mut self, config: RepositoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and build
    ///
    /// A backend that keys records through the metadata must agree with the
    /// configured `id_name`; when the configuration leaves it unset, the
    /// backend's name is adopted.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config does not validate or
    /// names a different identifier field than the backend.
    pub fn build(mut self) -> Result<Repository> {
        self.config.validate()?;
        if let Keying::Metadata(backend) = self.factory.keying() {
            let configured = self.config.id_name.clone();
            match (configured.as_deref(), backend) {
                (None, Some(name)) => {
                    debug!(id_name = name, "Adopted backend identifier field");
                    self.config.id_name = Some(name.to_string());
                }
                (configured, backend) if configured != backend => {
                    return Err(VesselError::Config(format!(
                        "id_name {:?} does not match the backend's identifier field {:?}",
                        configured, backend
                    )));
                }
                _ => {}
            }
        }
        let events = self.events.unwrap_or_default();
        Ok(Repository::assemble(
            self.registry,
            self.factory,
            events,
            self.config,
        ))
    }
}

impl fmt::Debug for RepositoryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Convert collected records into a typed shape
fn into_shapes<T: Shape>(records: Vec<Record>) -> Result<Vec<T>> {
    records.iter().map(T::from_record).collect()
}

#[cfg(test)]
mod tests;
