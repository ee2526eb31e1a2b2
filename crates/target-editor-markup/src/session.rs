//! Per-document session.
//!
//! Wires one open document to the parser, folding reconciler and validation pipeline. Hosts
//! call into the session from their buffer lifecycle: open, change, idle reconcile and close.

use crate::config::EngineConfig;
use crate::error::HostError;
use crate::folding::FoldingScanner;
use crate::parser::MarkupParser;
use crate::reconcile::{FoldingReconciler, ReconcileStats};
use crate::tree::MarkupTree;
use crate::validation::{ValidationPipeline, ValidationTicket};
use std::path::Path;
use std::time::Duration;
use target_editor_core::{AnnotationSink, Diagnostic, TextSource};

/// Engine state for one open target definition.
#[derive(Debug)]
pub struct TargetEditorSession {
    config: EngineConfig,
    parser: MarkupParser,
    reconciler: FoldingReconciler,
    pipeline: ValidationPipeline,
    active: bool,
}

impl TargetEditorSession {
    /// Create an inactive session.
    pub fn new(config: EngineConfig) -> Self {
        let parser = MarkupParser::from_config(&config);
        let reconciler =
            FoldingReconciler::new().with_scanner(FoldingScanner::from_config(&config));
        let pipeline = ValidationPipeline::new(&config);
        Self {
            config,
            parser,
            reconciler,
            pipeline,
            active: false,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns `true` if files at `path` are handled by this engine.
    pub fn is_relevant(&self, path: &Path) -> bool {
        self.config.handles_path(path)
    }

    /// Returns `true` after a successful [`TargetEditorSession::activate`].
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Attach the session to a document and run the first validation and folding pass.
    pub fn activate<T, S>(&mut self, source: &T, sink: &mut S) -> Result<(), HostError>
    where
        T: TextSource + ?Sized,
        S: AnnotationSink + ?Sized,
    {
        let path = source.location().ok_or(HostError::NoBackingLocation)?;
        if !self.is_relevant(path) {
            return Err(HostError::NotATargetDocument {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(path = %path.display(), "target editor session activated");
        self.active = true;
        self.pipeline.request(source.text(), sink);
        self.reconciler.update(source, Some(sink));
        Ok(())
    }

    /// Detach from the document, removing every annotation the session added.
    pub fn deactivate<S>(&mut self, sink: &mut S)
    where
        S: AnnotationSink + ?Sized,
    {
        self.reconciler.reconcile(&[], sink);
        self.reconciler.reset();
        sink.remove_all(self.pipeline.marker());
        self.active = false;
    }

    /// React to a document change by starting a new validation.
    pub fn document_changed<T, S>(
        &mut self,
        source: &T,
        sink: &mut S,
    ) -> Result<ValidationTicket, HostError>
    where
        T: TextSource + ?Sized,
        S: AnnotationSink + ?Sized,
    {
        self.ensure_active()?;
        Ok(self.pipeline.request(source.text(), sink))
    }

    /// Recompute folding regions.
    ///
    /// Returns `Ok(None)` when the text did not change since the last pass. An inactive
    /// session never touches the sink.
    pub fn reconcile_folding<T, S>(
        &mut self,
        source: &T,
        sink: Option<&mut S>,
    ) -> Result<Option<ReconcileStats>, HostError>
    where
        T: TextSource + ?Sized,
        S: AnnotationSink + ?Sized,
    {
        self.ensure_active()?;
        let sink = sink.ok_or(HostError::NoAnnotationSink)?;
        Ok(self.reconciler.update(source, Some(sink)))
    }

    /// Forget folding state after the host dropped its annotations.
    pub fn annotations_discarded(&mut self) {
        self.reconciler.reset();
    }

    /// Apply validation results that have already arrived.
    pub fn poll_validation<S>(&mut self, sink: &mut S) -> usize
    where
        S: AnnotationSink + ?Sized,
    {
        self.pipeline.poll(sink)
    }

    /// Block until pending validations finish or `timeout` elapses.
    pub fn wait_validation<S>(&mut self, sink: &mut S, timeout: Duration) -> bool
    where
        S: AnnotationSink + ?Sized,
    {
        self.pipeline.wait(sink, timeout)
    }

    /// The live validation diagnostic.
    pub fn current_diagnostic(&self) -> Option<&Diagnostic> {
        self.pipeline.current_diagnostic()
    }

    /// Parse `source` and return the line where the root element starts.
    ///
    /// A root found before a parse failure still counts.
    pub fn affordance_line<T>(&mut self, source: &T) -> Option<usize>
    where
        T: TextSource + ?Sized,
    {
        if let Err(err) = self.parser.parse(&source.text()) {
            tracing::trace!(error = %err, "affordance computed from partial tree");
        }
        let root = self.parser.tree().root()?;
        Some(source.line_of_offset(root.start_offset))
    }

    /// The tree from the last parse.
    pub fn tree(&self) -> &MarkupTree {
        self.parser.tree()
    }

    /// The validation pipeline.
    pub fn pipeline(&self) -> &ValidationPipeline {
        &self.pipeline
    }

    fn ensure_active(&self) -> Result<(), HostError> {
        if self.active {
            Ok(())
        } else {
            Err(HostError::SessionInactive)
        }
    }
}

impl Default for TargetEditorSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use target_editor_core::{AnnotationModel, Document};

    #[test]
    fn test_unbacked_document_is_rejected() {
        let mut session = TargetEditorSession::default();
        let mut model = AnnotationModel::new();
        let err = session.activate("<target/>", &mut model).unwrap_err();
        assert_eq!(err, HostError::NoBackingLocation);
        assert!(!session.is_active());
    }

    #[test]
    fn test_deactivate_removes_session_annotations() {
        let mut session = TargetEditorSession::default();
        let mut model = AnnotationModel::new();
        let doc = Document::new("<target>\n<locations>\n").with_location("a.target");
        session.activate(&doc, &mut model).unwrap();
        assert!(session.wait_validation(&mut model, Duration::from_secs(5)));
        assert!(!model.is_empty());

        session.deactivate(&mut model);
        assert!(model.is_empty());
        assert!(!session.is_active());
    }

    #[test]
    fn test_inactive_session_ignores_edits() {
        let mut session = TargetEditorSession::default();
        let mut model = AnnotationModel::new();
        let doc = Document::new("<target>\n<locations>\n").with_location("a.target");

        assert_eq!(
            session.document_changed(&doc, &mut model),
            Err(HostError::SessionInactive)
        );
        assert_eq!(
            session.reconcile_folding(&doc, Some(&mut model)),
            Err(HostError::SessionInactive)
        );
        assert!(model.is_empty());
        assert_eq!(session.pipeline().in_flight(), 0);

        session.activate(&doc, &mut model).unwrap();
        assert!(session.wait_validation(&mut model, Duration::from_secs(5)));
        session.deactivate(&mut model);

        assert_eq!(
            session.document_changed(&doc, &mut model),
            Err(HostError::SessionInactive)
        );
        session.annotations_discarded();
        assert_eq!(
            session.reconcile_folding(&doc, Some(&mut model)),
            Err(HostError::SessionInactive)
        );
        assert!(model.is_empty());
        assert_eq!(session.pipeline().in_flight(), 0);
    }
}
