//! Error types for Vessel
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::types::ContentType;
use std::io;
use thiserror::Error;

/// Result type alias for Vessel operations
pub type Result<T> = std::result::Result<T, VesselError>;

/// Error types for the Vessel mediator
#[derive(Debug, Error)]
pub enum VesselError {
    /// A single type-group of an id lookup exceeded the fixed batch ceiling
    #[error(
        "Invalid argument: requested {requested} ids of type {content_type} at once, request in batches of maximum size {max}"
    )]
    BatchTooLarge {
        /// Type whose group was too large
        content_type: ContentType,
        /// Number of ids requested for that type
        requested: usize,
        /// Maximum allowed per type-group
        max: usize,
    },

    /// Generic invalid argument supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Content type has no registered metadata
    #[error("Unregistered content type: {0}")]
    UnregisteredType(ContentType),

    /// Content type has no summary type registered
    #[error("No summary type registered for content type {0}")]
    NoSummaryType(ContentType),

    /// Identifier field holds a value that cannot be an identifier of its kind
    #[error("Invalid identifier for {content_type}.{field}: {reason}")]
    InvalidIdentifier {
        /// Type of the record
        content_type: ContentType,
        /// Identifier field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// An event handler failed or returned a payload of the wrong shape
    #[error("Event handler error: {0}")]
    Handler(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration could not be parsed or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl VesselError {
    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        VesselError::InvalidArgument(message.into())
    }

    /// Create a handler error
    pub fn handler(message: impl Into<String>) -> Self {
        VesselError::Handler(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        VesselError::Storage(message.into())
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        VesselError::Serialization(message.into())
    }

    /// Whether this error reports a bad argument supplied by the caller
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            VesselError::BatchTooLarge { .. } | VesselError::InvalidArgument(_)
        )
    }
}

impl From<serde_json::Error> for VesselError {
    fn from(e: serde_json::Error) -> Self {
        VesselError::Serialization(e.to_string())
    }
}
