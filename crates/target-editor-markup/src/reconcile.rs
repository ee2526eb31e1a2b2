//! Folding annotation reconciliation.
//!
//! Keeps the host's folding annotations in sync with the scanner output using the smallest set
//! of add/remove calls. Unchanged regions keep their handles, so host-side state such as a
//! collapsed fold survives re-scans.

use crate::folding::FoldingScanner;
use std::collections::HashSet;
use target_editor_core::{AnnotationHandle, AnnotationSink, Span, TextSource};

/// Number of sink calls made by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Annotations added.
    pub added: usize,
    /// Annotations removed.
    pub removed: usize,
}

impl ReconcileStats {
    /// Returns `true` if the pass made no sink calls.
    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Owns the folding annotations it has added to a sink.
#[derive(Debug, Clone, Default)]
pub struct FoldingReconciler {
    records: Vec<(Span, AnnotationHandle)>,
    last_text: Option<String>,
    scanner: FoldingScanner,
}

impl FoldingReconciler {
    /// Create a reconciler with the default scanner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `scanner` to compute spans in [`FoldingReconciler::update`].
    pub fn with_scanner(mut self, scanner: FoldingScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Rescan `source` and reconcile if its text changed since the last pass.
    ///
    /// Returns `None` when the pass was skipped: no sink is attached or the text is unchanged.
    pub fn update<T, S>(&mut self, source: &T, sink: Option<&mut S>) -> Option<ReconcileStats>
    where
        T: TextSource + ?Sized,
        S: AnnotationSink + ?Sized,
    {
        let sink = sink?;
        let text = source.text();
        if self.last_text.as_deref() == Some(text.as_str()) {
            tracing::trace!("folding update skipped, text unchanged");
            return None;
        }

        let spans = self.scanner.scan(&text);
        let stats = self.reconcile(&spans, sink);
        self.last_text = Some(text);
        Some(stats)
    }

    /// Diff `spans` against the retained records and apply the difference to `sink`.
    ///
    /// A span listed more than once is added once.
    pub fn reconcile<S>(&mut self, spans: &[Span], sink: &mut S) -> ReconcileStats
    where
        S: AnnotationSink + ?Sized,
    {
        let wanted = spans.iter().copied().collect::<HashSet<_>>();
        let mut stats = ReconcileStats::default();

        let mut kept = HashSet::with_capacity(self.records.len());
        self.records.retain(|(span, handle)| {
            if wanted.contains(span) {
                kept.insert(*span);
                true
            } else {
                sink.remove(*handle);
                stats.removed += 1;
                false
            }
        });

        for span in spans {
            if kept.insert(*span) {
                let handle = sink.add(None, None, *span);
                self.records.push((*span, handle));
                stats.added += 1;
            }
        }

        tracing::debug!(
            added = stats.added,
            removed = stats.removed,
            total = self.records.len(),
            "folding annotations reconciled"
        );
        stats
    }

    /// Spans and handles currently owned by the reconciler.
    pub fn records(&self) -> &[(Span, AnnotationHandle)] {
        &self.records
    }

    /// Forget all records and the text snapshot.
    ///
    /// Call this when the host discarded its annotations; the next update re-adds everything.
    pub fn reset(&mut self) {
        self.records.clear();
        self.last_text = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use target_editor_core::AnnotationModel;

    #[test]
    fn test_unchanged_spans_keep_handles() {
        let mut model = AnnotationModel::new();
        let mut reconciler = FoldingReconciler::new();
        reconciler.reconcile(&[Span::new(0, 10), Span::new(2, 4)], &mut model);
        let before = reconciler.records().to_vec();

        let stats = reconciler.reconcile(&[Span::new(2, 4), Span::new(0, 10)], &mut model);
        assert!(stats.is_unchanged());
        let mut after = reconciler.records().to_vec();
        after.sort();
        let mut before = before;
        before.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_duplicate_spans_are_added_once() {
        let mut model = AnnotationModel::new();
        let mut reconciler = FoldingReconciler::new();
        let stats = reconciler.reconcile(&[Span::new(0, 5), Span::new(0, 5)], &mut model);
        assert_eq!(stats, ReconcileStats { added: 1, removed: 0 });
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_update_without_sink_is_skipped() {
        let mut reconciler = FoldingReconciler::new();
        assert_eq!(reconciler.update("<a>\n</a>", None::<&mut AnnotationModel>), None);
        assert!(reconciler.records().is_empty());
    }

    #[test]
    fn test_reset_forces_full_readd() {
        let mut model = AnnotationModel::new();
        let mut reconciler = FoldingReconciler::new();
        let text = "<a>\n</a>";
        assert_eq!(
            reconciler.update(text, Some(&mut model)),
            Some(ReconcileStats { added: 1, removed: 0 })
        );
        assert_eq!(reconciler.update(text, Some(&mut model)), None);

        model.clear();
        reconciler.reset();
        assert_eq!(
            reconciler.update(text, Some(&mut model)),
            Some(ReconcileStats { added: 1, removed: 0 })
        );
        assert_eq!(model.len(), 1);
    }
}
