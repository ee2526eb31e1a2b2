//! Engine configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use target_editor_core::Marker;

/// What the validation pipeline does with results that arrive after a newer request was made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResultPolicy {
    /// Drop results whose generation is older than the newest request.
    #[default]
    Discard,
    /// Apply every result as it completes (last to finish wins).
    CompletionOrder,
}

/// Configuration shared by the parser, folding scanner and validation pipeline.
///
/// Hosts typically keep this in their settings store and load it with
/// [`EngineConfig::from_json_str`]. Missing fields fall back to [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Tag name that becomes the tree's root reference.
    pub root_tag: String,
    /// File extensions (without the dot) handled by the engine.
    pub file_extensions: Vec<String>,
    /// Marker name attached to validation diagnostics.
    pub validation_marker: String,
    /// Policy for out-of-order validation results.
    pub stale_results: StaleResultPolicy,
    /// Whether multi-line comments produce folding regions.
    pub fold_comments: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_tag: "target".to_string(),
            file_extensions: vec!["target".to_string()],
            validation_marker: Marker::VALIDATION.as_str().to_string(),
            stale_results: StaleResultPolicy::Discard,
            fold_comments: true,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON settings.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.root_tag.trim().is_empty() {
            return Err(ConfigError::EmptyRootTag);
        }
        Ok(config)
    }

    /// Set the root tag name.
    pub fn with_root_tag(mut self, root_tag: impl Into<String>) -> Self {
        self.root_tag = root_tag.into();
        self
    }

    /// Add a handled file extension.
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extensions.push(extension.into());
        self
    }

    /// Set the stale validation result policy.
    pub fn with_stale_results(mut self, policy: StaleResultPolicy) -> Self {
        self.stale_results = policy;
        self
    }

    /// Control whether comments fold.
    pub fn with_fold_comments(mut self, fold_comments: bool) -> Self {
        self.fold_comments = fold_comments;
        self
    }

    /// The validation marker.
    pub fn marker(&self) -> Marker {
        Marker::from(self.validation_marker.clone())
    }

    /// Returns `true` if `path` has one of the handled extensions (case-insensitive).
    pub fn handles_path(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.file_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(extension))
    }
}
