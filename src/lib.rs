//! Vessel - backend-agnostic persistence mediator
//!
//! Vessel reads and writes dynamically-typed records ("containers") of any
//! registered content type through a pluggable storage backend, raising a
//! named event at every step so extension code can redirect, replace or
//! short-circuit what happens.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use vessel::{ContentRegistry, MemoryDataSourceFactory, MemoryStore, Repository, WriteOptions};
//!
//! let registry = Arc::new(ContentRegistry::builder().register::<Page>().build());
//! let store = Arc::new(MemoryStore::new(registry.clone()));
//! let repo = Repository::builder(registry, Arc::new(MemoryDataSourceFactory::new(store)))
//!     .build()?;
//!
//! let mut page = repo.new_item::<Page>()?;
//! page.title = "Hello".into();
//! let created = repo.set_item(&mut page, &WriteOptions::new().actor("alice"))?;
//! ```
//!
//! # Architecture
//!
//! - `vessel-core`: values, records, identifiers, metadata, errors
//! - `vessel-storage`: the data source contract and the in-memory backend
//! - `vessel-engine`: repository, event hub, facade projection, config

pub use vessel_core::*;
pub use vessel_engine::*;
pub use vessel_storage::{
    testing, DataSource, DataSourceFactory, Keying, MemoryDataSource, MemoryDataSourceFactory,
    MemoryStore, QueryBody, RecordStream,
};
