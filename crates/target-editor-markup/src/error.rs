//! Error types.

use std::path::PathBuf;
use thiserror::Error;

/// Why a document failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("comment is never closed (missing `-->`)")]
    /// A `<!--` without a matching `-->`.
    UnterminatedComment,

    #[error("tag is never closed (missing `>`)")]
    /// A `<` without a matching `>`.
    UnterminatedTag,

    #[error("end tag `</{name}>` has no matching start tag")]
    /// An end tag with no open element.
    StrayEndTag {
        /// Name of the end tag.
        name: String,
    },

    #[error("end tag `</{found}>` does not match open element `<{expected}>`")]
    /// An end tag whose name differs from the innermost open element.
    MismatchedEndTag {
        /// Name of the innermost open element.
        expected: String,
        /// Name of the end tag.
        found: String,
    },

    #[error("element `<{name}>` is never closed")]
    /// An element still open at the end of the document.
    UnclosedElement {
        /// Name of the innermost open element.
        name: String,
    },
}

/// A positioned lexical or structural failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at offset {offset}: {kind}")]
pub struct ParseError {
    /// Character offset of the failure.
    pub offset: usize,
    /// Failure reason.
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Create a parse error.
    pub fn new(offset: usize, kind: ParseErrorKind) -> Self {
        Self { offset, kind }
    }

    /// The failure reason without the positional preamble.
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }
}

/// Failures integrating with the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("document has no backing location")]
    /// The text source is not backed by a file.
    NoBackingLocation,

    #[error("`{}` is not a target definition", path.display())]
    /// The document's file extension is not handled by this engine.
    NotATargetDocument {
        /// Location of the rejected document.
        path: PathBuf,
    },

    #[error("no annotation sink is available")]
    /// The host has no annotation model attached to the editor.
    NoAnnotationSink,

    #[error("the target editor session is not active")]
    /// The session was never activated or has been deactivated.
    SessionInactive,
}

impl HostError {
    /// A sentence suitable for showing to the user in place of engine output.
    pub fn fallback_message(&self) -> String {
        match self {
            Self::NoBackingLocation => {
                "This editor is not backed by a file, so the target definition cannot be analyzed."
                    .to_string()
            }
            Self::NotATargetDocument { path } => format!(
                "{} is not a target definition file; folding and validation are disabled.",
                path.display()
            ),
            Self::NoAnnotationSink => {
                "The editor has no annotation model; folding regions cannot be shown.".to_string()
            }
            Self::SessionInactive => {
                "Folding and validation are off until the target definition is reopened."
                    .to_string()
            }
        }
    }
}

/// Failures loading an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine configuration: {0}")]
    /// The settings document could not be deserialized.
    Json(#[from] serde_json::Error),

    #[error("root tag must not be empty")]
    /// The configured root tag is empty.
    EmptyRootTag,
}
