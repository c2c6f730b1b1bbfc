//! Testing utilities for code running on top of a data source
//!
//! - **Instrumented factory**: wraps any [`DataSourceFactory`] and records
//!   every scope opened, every write issued, every flush and every release,
//!   in call order
//!
//! # Example
//!
//! ```ignore
//! use vessel_storage::testing::{InstrumentedFactory, StorageCall};
//!
//! let factory = InstrumentedFactory::new(MemoryDataSourceFactory::new(store));
//! let log = factory.log();
//! // ... run repository operations ...
//! assert_eq!(log.count(|c| matches!(c, StorageCall::SaveChanges)), 1);
//! ```
//!
//! [`DataSourceFactory`]: crate::DataSourceFactory

mod instrumented;

pub use instrumented::{CallLog, InstrumentedFactory, StorageCall};
