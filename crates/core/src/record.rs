//! Records: the untyped shape in which containers are stored
//!
//! A [`Record`] is a content type plus a flat map of named fields. Stores and
//! the mediator only ever see records; typed Rust structs are converted at the
//! edges through serde (`serde_json::Value` as the interchange form).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, VesselError};
use crate::types::ContentType;
use crate::value::Value;

/// A stored container (or a projected summary) of some runtime type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    content_type: ContentType,
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record of the given type
    pub fn new(content_type: impl Into<ContentType>) -> Self {
        Self {
            content_type: content_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Runtime type of this record
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Read a field; `None` if the record has no such field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Write a field, returning the previous value
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Whether the record has the named field
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterate fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a record from a serializable struct
    ///
    /// The value must serialize to a JSON object; each top-level member
    /// becomes one field.
    pub fn from_typed<T: Serialize>(content_type: impl Into<ContentType>, value: &T) -> Result<Self> {
        let content_type = content_type.into();
        match serde_json::to_value(value)? {
            serde_json::Value::Object(map) => Ok(Self {
                content_type,
                fields: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            }),
            other => Err(VesselError::serialization(format!(
                "{} must serialize to an object, got {}",
                content_type, other
            ))),
        }
    }

    /// Decode this record into a typed struct
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).map_err(|e| {
            VesselError::serialization(format!("decoding {}: {}", self.content_type, e))
        })
    }

    /// Copy of this record retyped and restricted to the named fields
    ///
    /// Fields the source does not have are filled with `Null`, so the result
    /// always has exactly `fields` (duplicates collapse).
    pub fn project(&self, content_type: ContentType, fields: &[String]) -> Record {
        let fields = fields
            .iter()
            .map(|name| {
                let value = self.fields.get(name).cloned().unwrap_or(Value::Null);
                (name.clone(), value)
            })
            .collect();
        Record {
            content_type,
            fields,
        }
    }
}
