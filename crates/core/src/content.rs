//! Typed access to records
//!
//! Callers that know their types at compile time implement [`Shape`] for
//! every output shape they read and [`Content`] for every container type
//! they write. Both are thin serde bridges over [`Record`].
//!
//! ```ignore
//! #[derive(Default, Serialize, Deserialize)]
//! struct Article { id: Uuid, title: String, body: String }
//!
//! impl Shape for Article {
//!     const TARGET: Target = Target::Items;
//! }
//!
//! impl Content for Article {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::new("Article").field("title", FieldRole::Summary)
//!     }
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::metadata::TypeDescriptor;
use crate::record::Record;
use crate::types::ContentType;

/// Output shape of a read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Full containers
    Items,
    /// Summary projections
    Summaries,
}

impl Target {
    /// Whether reads of this shape run in a summary (read-optimized) context
    pub fn is_summary(&self) -> bool {
        matches!(self, Target::Summaries)
    }
}

/// A typed output shape records can be decoded into
pub trait Shape: DeserializeOwned + Sized {
    /// Which projection produces this shape
    const TARGET: Target;

    /// Decode a (possibly projected) record
    fn from_record(record: &Record) -> Result<Self> {
        record.to_typed()
    }
}

/// A typed container type
pub trait Content: Shape + Serialize + Default + Send + Sync + 'static {
    /// Metadata for the type
    fn descriptor() -> TypeDescriptor;

    /// Registered type name
    fn content_type() -> ContentType {
        Self::descriptor().content_type().clone()
    }

    /// Encode as a record of this type
    fn to_record(&self) -> Result<Record> {
        Record::from_typed(Self::content_type(), self)
    }
}
