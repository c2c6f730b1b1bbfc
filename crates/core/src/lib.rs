//! Core types and traits for Vessel
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: field value enum for dynamically-typed records
//! - Record: a stored container of some runtime content type
//! - ContentType, IdKind, IdValue, ItemId: addressing types
//! - Error: error type hierarchy
//! - Metadata: identifier/summary metadata trait and the ContentRegistry
//! - Shape, Content: typed bridges over records
//! - Limits: fixed request limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod content;
pub mod error;
pub mod limits;
pub mod metadata;
pub mod record;
pub mod types;
pub mod value;

pub use content::{Content, Shape, Target};
pub use error::{Result, VesselError};
pub use limits::{validate_id_batch, MAX_ID_BATCH_SIZE};
pub use metadata::{
    audit, ContentRegistry, ContentRegistryBuilder, FieldRole, IdField, Metadata, TypeDescriptor,
};
pub use record::Record;
pub use types::{ContentType, IdKind, IdValue, ItemId};
pub use value::Value;
