//! Facade projection
//!
//! Reads can target full records (`Target::Items`) or summaries
//! (`Target::Summaries`). Items pass through unchanged; a summary is built
//! by copying the metadata-designated summary fields plus the identifier
//! field into a record of the type's summary type.
//!
//! Summary field lists are computed once per content type and cached.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

use vessel_core::{ContentType, Metadata, Record, Result, Target, VesselError};

/// Projects stored records into the shape a read asked for
pub struct Facade {
    metadata: Arc<dyn Metadata>,
    id_name: Option<String>,
    summary_fields: DashMap<ContentType, (ContentType, Arc<[String]>)>,
}

impl Facade {
    /// Create a facade over a metadata collaborator
    ///
    /// `id_name` is the explicit identifier field override, if configured.
    pub fn new(metadata: Arc<dyn Metadata>, id_name: Option<String>) -> Self {
        Self {
            metadata,
            id_name,
            summary_fields: DashMap::new(),
        }
    }

    /// Project one record for a read target
    ///
    /// # Errors
    ///
    /// Returns `NoSummaryType` when summaries are requested for a type
    /// without a summary type, or any metadata lookup error.
    pub fn project(&self, target: Target, record: Record) -> Result<Record> {
        match target {
            Target::Items => Ok(record),
            Target::Summaries => self.summarize(&record),
        }
    }

    /// Summary of a record
    pub fn summarize(&self, record: &Record) -> Result<Record> {
        let (summary_type, fields) = self.summary_layout(record.content_type())?;
        Ok(record.project(summary_type, &fields))
    }

    /// Summary type and ordered field list for a content type
    ///
    /// The identifier field (honouring the explicit override) is always last.
    pub fn summary_layout(&self, content_type: &ContentType) -> Result<(ContentType, Arc<[String]>)> {
        if let Some(cached) = self.summary_fields.get(content_type) {
            return Ok(cached.value().clone());
        }

        let summary_type = self
            .metadata
            .summary_type(content_type)
            .ok_or_else(|| VesselError::NoSummaryType(content_type.clone()))?;
        let mut fields = self.metadata.summary_fields(content_type, &summary_type)?;
        if self.id_name.is_some() {
            let registered = self.metadata.identifier_field(content_type, None)?;
            let effective = self
                .metadata
                .identifier_field(content_type, self.id_name.as_deref())?;
            if registered.name != effective.name {
                fields.retain(|f| f != &registered.name && f != &effective.name);
                fields.push(effective.name);
            }
        }

        let layout = (summary_type, Arc::<[String]>::from(fields));
        self.summary_fields
            .insert(content_type.clone(), layout.clone());
        Ok(layout)
    }
}

impl fmt::Debug for Facade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade")
            .field("id_name", &self.id_name)
            .field("cached_layouts", &self.summary_fields.len())
            .finish()
    }
}
