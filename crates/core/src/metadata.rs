//! Type metadata and the content registry
//!
//! The mediator never inspects Rust types. Everything it needs to know about a
//! container type (identifier field, summary-relevant fields, summary type,
//! auditability) comes from the [`Metadata`] trait. [`ContentRegistry`] is the
//! registration-based implementation: each registered type gets an entry
//! holding its descriptor plus its per-type operations (record constructor,
//! identifier allocator), built once and shared behind an `Arc`.
//!
//! ## Registration
//!
//! ```ignore
//! let registry = ContentRegistry::builder()
//!     .register::<Article>()
//!     .register_descriptor(
//!         TypeDescriptor::new("Page")
//!             .id("key", IdKind::Text)
//!             .field("title", FieldRole::Summary),
//!     )
//!     .build();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::content::Content;
use crate::error::{Result, VesselError};
use crate::record::Record;
use crate::types::{ContentType, IdKind, IdValue, ItemId};
use crate::value::Value;

/// Field names stamped on auditable records by the write path
pub mod audit {
    /// Creation instant (RFC 3339, UTC)
    pub const CREATED: &str = "created";
    /// Last update instant (RFC 3339, UTC)
    pub const UPDATED: &str = "updated";
    /// Actor that created the record
    pub const USER_CREATED: &str = "user_created";
    /// Actor that last updated the record
    pub const USER_UPDATED: &str = "user_updated";

    /// All audit fields in stamping order
    pub const ALL: [&str; 4] = [CREATED, UPDATED, USER_CREATED, USER_UPDATED];
}

/// How a field participates in projections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Stored only on the full container
    Plain,
    /// Copied into the summary
    Summary,
    /// Part of the record's address; copied into the summary
    Address,
}

impl FieldRole {
    /// Whether the field belongs in a summary projection
    pub fn in_summary(&self) -> bool {
        matches!(self, FieldRole::Summary | FieldRole::Address)
    }
}

/// Identifier field of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdField {
    /// Field name
    pub name: String,
    /// Representation of the identifier
    pub kind: IdKind,
}

/// Static description of one container type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    content_type: ContentType,
    id: IdField,
    fields: Vec<(String, FieldRole)>,
    field_kinds: Vec<(String, IdKind)>,
    summary_type: Option<ContentType>,
    auditable: bool,
}

impl TypeDescriptor {
    /// Describe a type; identifier defaults to a UUID field named `id`
    pub fn new(content_type: impl Into<ContentType>) -> Self {
        Self {
            content_type: content_type.into(),
            id: IdField {
                name: "id".to_string(),
                kind: IdKind::Uuid,
            },
            fields: Vec::new(),
            field_kinds: Vec::new(),
            summary_type: None,
            auditable: false,
        }
    }

    /// Set the identifier field
    pub fn id(mut self, name: impl Into<String>, kind: IdKind) -> Self {
        self.id = IdField {
            name: name.into(),
            kind,
        };
        self
    }

    /// Declare a field and its role; redeclaring a field replaces its role
    pub fn field(mut self, name: impl Into<String>, role: FieldRole) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = role,
            None => self.fields.push((name, role)),
        }
        self
    }

    /// Declare a field that can also serve as an identifier
    ///
    /// Only fields declared with a kind are accepted as an explicit
    /// identifier override.
    pub fn field_with_kind(
        mut self,
        name: impl Into<String>,
        role: FieldRole,
        kind: IdKind,
    ) -> Self {
        let name = name.into();
        self.field_kinds.retain(|(n, _)| *n != name);
        self.field_kinds.push((name.clone(), kind));
        self.field(name, role)
    }

    /// Map this type to its summary type
    pub fn summary(mut self, summary_type: impl Into<ContentType>) -> Self {
        self.summary_type = Some(summary_type.into());
        self
    }

    /// Mark the type as carrying audit fields
    pub fn auditable(mut self) -> Self {
        self.auditable = true;
        self
    }

    /// Registered type name
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Identifier field
    pub fn id_field(&self) -> &IdField {
        &self.id
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> &[(String, FieldRole)] {
        &self.fields
    }

    /// Summary type, if any
    pub fn summary_type(&self) -> Option<&ContentType> {
        self.summary_type.as_ref()
    }

    /// Whether the type carries audit fields
    pub fn is_auditable(&self) -> bool {
        self.auditable
    }

    /// Whether the type declares a field with this name (identifier included)
    pub fn has_field(&self, name: &str) -> bool {
        self.id.name == name || self.fields.iter().any(|(n, _)| n == name)
    }

    /// Identifier kind a field holds, if it was declared with one
    pub fn field_kind(&self, name: &str) -> Option<IdKind> {
        if self.id.name == name {
            return Some(self.id.kind);
        }
        self.field_kinds
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, kind)| *kind)
    }

    /// Fields a summary of this type carries: summary- and address-tagged
    /// fields in declaration order, then the identifier field
    pub fn summary_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .fields
            .iter()
            .filter(|(name, role)| role.in_summary() && *name != self.id.name)
            .map(|(name, _)| name.clone())
            .collect();
        fields.push(self.id.name.clone());
        fields
    }

    /// A record with every declared field unset
    fn blank_record(&self) -> Record {
        let mut record = Record::new(self.content_type.clone());
        for (name, _) in &self.fields {
            record.set(name.clone(), Value::Null);
        }
        if self.auditable {
            for name in audit::ALL {
                record.set(name, Value::Null);
            }
        }
        record.set(self.id.name.clone(), self.id.kind.default_value());
        record
    }
}

/// Metadata collaborator consulted by the repository and the stores
pub trait Metadata: Send + Sync {
    /// Identifier field for a type
    ///
    /// `explicit_id_name` overrides the registered identifier when the type
    /// declares a field of that name; the field's own kind applies.
    fn identifier_field(
        &self,
        content_type: &ContentType,
        explicit_id_name: Option<&str>,
    ) -> Result<IdField>;

    /// Ordered field list of a summary of `content_type` shaped as
    /// `summary_type`; the identifier field is always last
    fn summary_fields(
        &self,
        content_type: &ContentType,
        summary_type: &ContentType,
    ) -> Result<Vec<String>>;

    /// Summary type mapped to a content type
    fn summary_type(&self, content_type: &ContentType) -> Option<ContentType>;

    /// Whether records of the type carry audit fields
    fn is_auditable(&self, content_type: &ContentType) -> bool;

    /// Derive the ItemId of a record from its identifier field
    ///
    /// A missing identifier field reads as `Null`, i.e. the kind's default.
    fn item_id(&self, record: &Record, explicit_id_name: Option<&str>) -> Result<ItemId> {
        let content_type = record.content_type();
        let field = self.identifier_field(content_type, explicit_id_name)?;
        let value = record.get(&field.name).unwrap_or(&Value::Null);
        let id = field
            .kind
            .parse(value)
            .map_err(|reason| VesselError::InvalidIdentifier {
                content_type: content_type.clone(),
                field: field.name.clone(),
                reason,
            })?;
        Ok(ItemId {
            content_type: content_type.clone(),
            id,
        })
    }
}

type Constructor = Arc<dyn Fn() -> Result<Record> + Send + Sync>;

/// Per-type operation table
struct TypeEntry {
    descriptor: TypeDescriptor,
    construct: Constructor,
    next_int_id: AtomicI64,
}

/// Registration-based metadata: one operation table per content type
pub struct ContentRegistry {
    entries: HashMap<ContentType, TypeEntry>,
}

impl fmt::Debug for ContentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&ContentType> = self.entries.keys().collect();
        types.sort();
        f.debug_struct("ContentRegistry")
            .field("types", &types)
            .finish()
    }
}

impl ContentRegistry {
    /// Start building a registry
    pub fn builder() -> ContentRegistryBuilder {
        ContentRegistryBuilder::default()
    }

    fn entry(&self, content_type: &ContentType) -> Result<&TypeEntry> {
        self.entries
            .get(content_type)
            .ok_or_else(|| VesselError::UnregisteredType(content_type.clone()))
    }

    /// Descriptor of a registered type
    pub fn descriptor(&self, content_type: &ContentType) -> Result<&TypeDescriptor> {
        self.entry(content_type).map(|e| &e.descriptor)
    }

    /// Whether a type is registered
    pub fn contains(&self, content_type: &ContentType) -> bool {
        self.entries.contains_key(content_type)
    }

    /// Registered types, sorted by name
    pub fn content_types(&self) -> Vec<ContentType> {
        let mut types: Vec<ContentType> = self.entries.keys().cloned().collect();
        types.sort();
        types
    }

    /// Construct a fresh default record of a registered type
    pub fn new_record(&self, content_type: &ContentType) -> Result<Record> {
        (self.entry(content_type)?.construct)()
    }

    /// Allocate a fresh identifier for a new record of the type
    ///
    /// UUID and text identifiers get a random v4 UUID; integer identifiers
    /// come from a per-type sequence starting at 1.
    pub fn allocate_id(&self, content_type: &ContentType, kind: IdKind) -> Result<IdValue> {
        let entry = self.entry(content_type)?;
        Ok(match kind {
            IdKind::Uuid => IdValue::Uuid(Uuid::new_v4()),
            IdKind::Text => IdValue::Text(Uuid::new_v4().to_string()),
            IdKind::Int => IdValue::Int(entry.next_int_id.fetch_add(1, Ordering::Relaxed)),
        })
    }

    /// Note an identifier written explicitly so the integer sequence never
    /// hands it out again
    pub fn observe_id(&self, content_type: &ContentType, id: &IdValue) {
        if let (Ok(entry), IdValue::Int(n)) = (self.entry(content_type), id) {
            entry
                .next_int_id
                .fetch_max(n.saturating_add(1), Ordering::Relaxed);
        }
    }
}

impl Metadata for ContentRegistry {
    fn identifier_field(
        &self,
        content_type: &ContentType,
        explicit_id_name: Option<&str>,
    ) -> Result<IdField> {
        let descriptor = self.descriptor(content_type)?;
        match explicit_id_name {
            Some(name) if descriptor.has_field(name) => {
                let kind = descriptor.field_kind(name).ok_or_else(|| {
                    VesselError::InvalidIdentifier {
                        content_type: content_type.clone(),
                        field: name.to_string(),
                        reason: "field is not declared with an identifier kind".to_string(),
                    }
                })?;
                Ok(IdField {
                    name: name.to_string(),
                    kind,
                })
            }
            _ => Ok(descriptor.id.clone()),
        }
    }

    fn summary_fields(
        &self,
        content_type: &ContentType,
        summary_type: &ContentType,
    ) -> Result<Vec<String>> {
        let descriptor = self.descriptor(content_type)?;
        if descriptor.summary_type() != Some(summary_type) {
            return Err(VesselError::NoSummaryType(content_type.clone()));
        }
        Ok(descriptor.summary_fields())
    }

    fn summary_type(&self, content_type: &ContentType) -> Option<ContentType> {
        self.entries
            .get(content_type)
            .and_then(|e| e.descriptor.summary_type.clone())
    }

    fn is_auditable(&self, content_type: &ContentType) -> bool {
        self.entries
            .get(content_type)
            .map(|e| e.descriptor.auditable)
            .unwrap_or(false)
    }
}

/// Builder for [`ContentRegistry`]
#[derive(Default)]
pub struct ContentRegistryBuilder {
    entries: HashMap<ContentType, TypeEntry>,
}

impl ContentRegistryBuilder {
    /// Register a typed container
    ///
    /// New records are built from `T::default()`.
    pub fn register<T: Content>(self) -> Self {
        let construct: Constructor = Arc::new(|| T::default().to_record());
        self.insert(T::descriptor(), construct)
    }

    /// Register a type known only by its descriptor
    ///
    /// New records carry every declared field as `Null` and the identifier's
    /// default value.
    pub fn register_descriptor(self, descriptor: TypeDescriptor) -> Self {
        let template = descriptor.blank_record();
        let construct: Constructor = Arc::new(move || Ok(template.clone()));
        self.insert(descriptor, construct)
    }

    fn insert(mut self, descriptor: TypeDescriptor, construct: Constructor) -> Self {
        info!(
            content_type = %descriptor.content_type,
            id_field = %descriptor.id.name,
            summary = ?descriptor.summary_type.as_ref().map(|s| s.as_str()),
            "Registered content type"
        );
        // Re-registration replaces the earlier entry
        self.entries.insert(
            descriptor.content_type.clone(),
            TypeEntry {
                descriptor,
                construct,
                next_int_id: AtomicI64::new(1),
            },
        );
        self
    }

    /// Finish registration
    pub fn build(self) -> ContentRegistry {
        ContentRegistry {
            entries: self.entries,
        }
    }
}
