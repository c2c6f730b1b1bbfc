//! Repository engine for Vessel
//!
//! This crate orchestrates the lower layers:
//! - Repository: read path (id lookups, queries, counts) and write path
//!   (set, delete) over any `DataSourceFactory`
//! - EventHub: named-event interception at every repository step
//! - Facade: projection of records into summaries
//! - RepositoryConfig: `vessel.toml` settings
//!
//! The engine is the only component that knows about:
//! - Event dispatch and its effect on storage calls
//! - Units of work (data source scopes)
//! - Identifier assignment and audit stamping on add

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod events;
pub mod facade;
pub mod repository;

pub use config::{RepositoryConfig, CONFIG_FILE_NAME};
pub use events::{
    Dispatch, EventHub, EventName, EventPayload, Handler, HandlerId, QueryEventData,
    RepositoryEventData, WriteAction, WriteOptions,
};
pub use facade::Facade;
pub use repository::{LazyResults, Repository, RepositoryBuilder, EVENT_SOURCE};
