//! Repository configuration via `vessel.toml`
//!
//! All settings are optional; an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use vessel_core::{Result, VesselError};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "vessel.toml";

/// Repository configuration loaded from `vessel.toml`.
///
/// # Example
///
/// ```toml
/// # Identifier field to use instead of each type's registered one,
/// # for types that declare a field of this name
/// id_name = "legacy_key"
///
/// # Query timeout handed to every data source scope, in seconds
/// query_timeout_secs = 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Explicit identifier field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_name: Option<String>,
    /// Query timeout in seconds; `None` leaves the backend default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_timeout_secs: Option<u64>,
}

impl RepositoryConfig {
    /// Use an explicit identifier field name.
    pub fn with_id_name(mut self, id_name: impl Into<String>) -> Self {
        self.id_name = Some(id_name.into());
        self
    }

    /// Set the query timeout in seconds.
    pub fn with_query_timeout_secs(mut self, secs: u64) -> Self {
        self.query_timeout_secs = Some(secs);
        self
    }

    /// Query timeout as a duration.
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }

    /// Check field values.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty `id_name` or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if matches!(self.id_name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(VesselError::Config("id_name must not be empty".to_string()));
        }
        if self.query_timeout_secs == Some(0) {
            return Err(VesselError::Config(
                "query_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Vessel repository configuration
#
# Identifier field to use instead of each type's registered identifier.
# Applies only to types that declare a field of this name.
# id_name = "id"

# Query timeout handed to every data source scope, in seconds.
# Backends that cannot enforce a timeout ignore it.
# query_timeout_secs = 30
"#
    }

    /// Parse and validate config text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this config or
    /// fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RepositoryConfig = toml::from_str(content)
            .map_err(|e| VesselError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VesselError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            VesselError::Config(msg) => {
                VesselError::Config(format!("{} ('{}')", msg, path.display()))
            }
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VesselError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
