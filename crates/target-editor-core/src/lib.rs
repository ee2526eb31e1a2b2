#![warn(missing_docs)]
//! Target Editor Core - host-facing model for the target definition editor engine
//!
//! # Overview
//!
//! `target-editor-core` holds the narrow interfaces between an editor host and the markup
//! analysis engine (`target-editor-markup`):
//!
//! - [`TextSource`]: read access to the document (text, length, char-at, line lookup)
//! - [`TextChange`]: change notifications (old range + replacement text)
//! - [`AnnotationSink`]: host-owned annotation storage (`add` / `remove` / `remove_all`)
//! - [`Diagnostic`]: positioned validation messages
//!
//! It also ships reference implementations of both host sides: a rope-backed [`Document`]
//! and an in-memory [`AnnotationModel`].
//!
//! # Quick Start
//!
//! ```rust
//! use target_editor_core::{AnnotationModel, AnnotationSink, Marker, Span};
//!
//! let mut sink = AnnotationModel::new();
//! let fold = sink.add(None, None, Span::new(0, 42));
//! sink.add(Some(&Marker::VALIDATION), Some("element is never closed"), Span::new(8, 0));
//!
//! sink.remove_all(&Marker::VALIDATION);
//! assert_eq!(sink.len(), 1);
//! assert!(sink.get(fold).is_some());
//! ```
//!
//! All offsets are character offsets (Unicode scalar values).

pub mod annotations;
pub mod diagnostics;
pub mod document;
pub mod text;

pub use annotations::{Annotation, AnnotationHandle, AnnotationModel, AnnotationSink, Marker, Span};
pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use document::{ChangeCallback, Document};
pub use text::{TextChange, TextSource};
