//! Core types for Vessel
//!
//! This module defines the addressing types:
//! - ContentType: runtime name of a container type
//! - IdKind: representation of a type's identifier field
//! - IdValue: hashable identifier value
//! - ItemId: composite key (content_type + id) addressing one stored record

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::value::Value;

/// Runtime name of a container (or summary) type
///
/// Container types are only known at runtime, so they are addressed by name.
/// The name is whatever the type was registered under in the
/// [`ContentRegistry`](crate::metadata::ContentRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentType(String);

impl ContentType {
    /// Create a content type from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the type name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ContentType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// How a type stores its identifier field
///
/// Each kind has a default ("unset") value. A record whose identifier still
/// holds the default is treated as new by the write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdKind {
    /// UUID stored as a hyphenated string; default is the nil UUID (or Null)
    Uuid,
    /// 64-bit integer; default is 0
    Int,
    /// Free text; default is the empty string
    Text,
}

impl IdKind {
    /// The default (unset) value for this kind, as stored in a record
    pub fn default_value(&self) -> Value {
        match self {
            IdKind::Uuid => Value::from(Uuid::nil()),
            IdKind::Int => Value::Int(0),
            IdKind::Text => Value::String(String::new()),
        }
    }

    /// Parse a stored field value as an identifier of this kind
    ///
    /// `Null` is accepted for every kind and maps to the kind's default.
    pub fn parse(&self, value: &Value) -> Result<IdValue, String> {
        match (self, value) {
            (_, Value::Null) => Ok(self.default_id()),
            (IdKind::Uuid, Value::String(s)) => Uuid::parse_str(s)
                .map(IdValue::Uuid)
                .map_err(|e| format!("expected UUID, got {:?}: {}", s, e)),
            (IdKind::Int, Value::Int(i)) => Ok(IdValue::Int(*i)),
            (IdKind::Text, Value::String(s)) => Ok(IdValue::Text(s.clone())),
            (kind, other) => Err(format!(
                "expected {:?} identifier, got {}",
                kind,
                other.type_name()
            )),
        }
    }

    /// Whether a stored field value is this kind's default
    ///
    /// Values that fail to parse are not considered default.
    pub fn is_default(&self, value: &Value) -> bool {
        self.parse(value)
            .map(|id| id == self.default_id())
            .unwrap_or(false)
    }

    fn default_id(&self) -> IdValue {
        match self {
            IdKind::Uuid => IdValue::Uuid(Uuid::nil()),
            IdKind::Int => IdValue::Int(0),
            IdKind::Text => IdValue::Text(String::new()),
        }
    }
}

/// Identifier value of one record within its type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdValue {
    /// UUID identifier
    Uuid(Uuid),
    /// Integer identifier
    Int(i64),
    /// Text identifier
    Text(String),
}

impl IdValue {
    /// Field value representation of this identifier
    pub fn to_value(&self) -> Value {
        match self {
            IdValue::Uuid(id) => Value::from(*id),
            IdValue::Int(i) => Value::Int(*i),
            IdValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::Uuid(id) => write!(f, "{}", id),
            IdValue::Int(i) => write!(f, "{}", i),
            IdValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<Uuid> for IdValue {
    fn from(id: Uuid) -> Self {
        IdValue::Uuid(id)
    }
}

impl From<i64> for IdValue {
    fn from(i: i64) -> Self {
        IdValue::Int(i)
    }
}

impl From<&str> for IdValue {
    fn from(s: &str) -> Self {
        IdValue::Text(s.to_string())
    }
}

/// Composite key addressing one stored record: content type + identifier
///
/// Two ItemIds are equal iff both type and identifier are equal. Ordering is
/// type first, then identifier, which gives in-memory stores a stable
/// iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId {
    /// Type namespace of the record
    pub content_type: ContentType,
    /// Identifier within that namespace
    pub id: IdValue,
}

impl ItemId {
    /// Create an ItemId
    pub fn new(content_type: impl Into<ContentType>, id: impl Into<IdValue>) -> Self {
        Self {
            content_type: content_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.content_type, self.id)
    }
}
