//! File-based configuration source.

use super::ConfigSource;
use crate::error::{NotifierError, Result};
use config::File;
use std::collections::HashMap;
use std::path::PathBuf;

/// File-based configuration source.
///
/// Reads `channel` and `token` from a YAML, TOML, or JSON file; the format
/// follows the file extension.
///
/// # Examples
///
/// ```rust,no_run
/// use nowplaying_notify::sources::FileSource;
///
/// let source = FileSource::new("config/slack.yaml");
/// ```
pub struct FileSource {
    path: PathBuf,
    priority: i32,
}

impl FileSource {
    /// Create a new file source.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            priority: 100,
        }
    }

    /// Set the priority for this source.
    ///
    /// Higher priority sources override lower priority ones.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Validate that the file extension is supported.
    fn validate_extension(&self) -> Result<()> {
        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                NotifierError::LoadError(format!(
                    "Unable to determine file format for: {}",
                    self.path.display()
                ))
            })?;

        match extension {
            "yaml" | "yml" | "toml" | "json" => Ok(()),
            _ => Err(NotifierError::LoadError(format!(
                "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json",
                extension
            ))),
        }
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<HashMap<String, config::Value>> {
        self.validate_extension()?;

        std::fs::metadata(&self.path)?;

        let parsed = config::Config::builder()
            .add_source(File::from(self.path.clone()).required(true))
            .build()
            .map_err(|e| NotifierError::LoadError(format!("Failed to load file: {}", e)))?;

        parsed
            .try_deserialize::<HashMap<String, config::Value>>()
            .map_err(|e| {
                NotifierError::DeserializationError(format!(
                    "Failed to parse {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
