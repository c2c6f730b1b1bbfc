//! Storage layer for Vessel
//!
//! This crate defines the contract every persistence backend implements and
//! ships the in-memory reference backend:
//! - DataSource / DataSourceFactory: per-operation scope and its factory
//! - RecordStream / QueryBody: queryable sequences and composable transforms
//! - MemoryStore: DashMap-based shared store keyed by ItemId
//! - testing: call-recording factory wrapper for tests
//!
//! # Concurrency
//!
//! `MemoryStore` gives concurrent access through nested DashMaps:
//! - Lock-free reads of unrelated types
//! - Per-type sharding (no cross-type contention)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod stream;
pub mod testing;
pub mod traits;

pub use memory::{MemoryDataSource, MemoryDataSourceFactory, MemoryStore};
pub use stream::{QueryBody, RecordStream};
pub use traits::{DataSource, DataSourceFactory, Keying};
