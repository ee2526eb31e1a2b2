#![warn(missing_docs)]
//! Target Editor Markup - analysis engine for target definition documents
//!
//! # Overview
//!
//! This crate turns the raw text of a target definition into the structures an editor needs:
//!
//! - [`TagLexer`] + [`classify`]: tag events with exact character offsets and attributes
//! - [`TreeBuilder`] / [`MarkupParser`]: an offset-annotated element tree with typed nodes
//! - [`FoldingScanner`]: multi-line foldable spans computed straight from the characters
//! - [`FoldingReconciler`]: minimal add/remove calls against the host's annotations
//! - [`ValidationPipeline`]: background structural validation with a single error marker
//! - [`TargetEditorSession`]: the per-document glue for a host's buffer lifecycle
//!
//! Host-facing types ([`TextSource`](target_editor_core::TextSource),
//! [`AnnotationSink`](target_editor_core::AnnotationSink)) live in `target-editor-core`.
//!
//! # Quick Start
//!
//! ```rust
//! use target_editor_markup::{FoldingReconciler, FoldingScanner};
//! use target_editor_core::{AnnotationModel, Span};
//!
//! let text = "<target>\n  <locations>\n  </locations>\n</target>";
//! let spans = FoldingScanner::new().scan(text);
//! assert_eq!(spans, vec![Span::new(11, 26), Span::new(0, 47)]);
//!
//! let mut model = AnnotationModel::new();
//! let mut reconciler = FoldingReconciler::new();
//! let stats = reconciler.reconcile(&spans, &mut model);
//! assert_eq!(stats.added, 2);
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod event;
pub mod folding;
pub mod lexer;
pub mod parser;
pub mod reconcile;
pub mod session;
pub mod tree;
pub mod validation;

pub use classifier::classify;
pub use config::{EngineConfig, StaleResultPolicy};
pub use error::{ConfigError, HostError, ParseError, ParseErrorKind};
pub use event::{TagEvent, TagKind};
pub use folding::{FoldingScanner, FoldingState};
pub use lexer::TagLexer;
pub use parser::MarkupParser;
pub use reconcile::{FoldingReconciler, ReconcileStats};
pub use session::TargetEditorSession;
pub use tree::{MarkupTree, Node, NodeId, NodeKind, TreeBuilder};
pub use validation::{
    ApplyResult, ValidationOutcome, ValidationPipeline, ValidationTicket, validate,
};
