//! Background structural validation.
//!
//! Every document change clears the current error marker and re-parses the full text on a
//! worker thread. Results come back over a channel and are applied on the host thread with
//! [`ValidationPipeline::poll`] or [`ValidationPipeline::wait`]. At most one diagnostic is live
//! at a time.
//!
//! Requests carry a generation number. Under [`StaleResultPolicy::Discard`] a result older than
//! the newest request is dropped, so a slow worker can never overwrite a fresher outcome.

use crate::config::{EngineConfig, StaleResultPolicy};
use crate::lexer::TagLexer;
use crate::tree::TreeBuilder;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use target_editor_core::{AnnotationSink, Diagnostic, Marker, TextSource};

/// Identifies one validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValidationTicket {
    /// Monotonic request number, starting at 1.
    pub generation: u64,
}

/// A finished validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Generation of the request that produced this outcome.
    pub generation: u64,
    /// The failure, or `None` when the document is well formed.
    pub diagnostic: Option<Diagnostic>,
}

/// What [`ValidationPipeline::apply`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    /// The outcome replaced the current marker state.
    Applied,
    /// The outcome was stale and dropped.
    Discarded,
}

/// Parse `text` and describe the first failure, if any.
///
/// The diagnostic message is the failure reason without positional preamble; its line is taken
/// from the text itself.
pub fn validate(text: &str, root_tag: &str) -> Option<Diagnostic> {
    let (_, outcome) = TreeBuilder::new(root_tag).build(TagLexer::new(text));
    let err = outcome.err()?;
    let offset = err.offset.min(text.len_chars());
    Some(Diagnostic::error(
        offset,
        text.line_of_offset(offset),
        err.reason(),
    ))
}

/// Runs validation requests off the host thread and applies their results.
#[derive(Debug)]
pub struct ValidationPipeline {
    root_tag: String,
    marker: Marker,
    policy: StaleResultPolicy,
    latest: u64,
    applied: u64,
    in_flight: usize,
    tx: mpsc::Sender<ValidationOutcome>,
    rx: mpsc::Receiver<ValidationOutcome>,
    current: Option<Diagnostic>,
}

impl ValidationPipeline {
    /// Create a pipeline from engine configuration.
    pub fn new(config: &EngineConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            root_tag: config.root_tag.clone(),
            marker: config.marker(),
            policy: config.stale_results,
            latest: 0,
            applied: 0,
            in_flight: 0,
            tx,
            rx,
            current: None,
        }
    }

    /// The marker attached to validation diagnostics.
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// The stale-result policy in effect.
    pub fn policy(&self) -> StaleResultPolicy {
        self.policy
    }

    /// Clear the marker and start validating `text` in the background.
    pub fn request<S>(&mut self, text: String, sink: &mut S) -> ValidationTicket
    where
        S: AnnotationSink + ?Sized,
    {
        sink.remove_all(&self.marker);
        self.current = None;
        self.latest += 1;
        let generation = self.latest;
        self.in_flight += 1;

        let tx = self.tx.clone();
        let root_tag = self.root_tag.clone();
        let worker = thread::Builder::new()
            .name(format!("target-validation-{generation}"))
            .spawn(move || {
                let diagnostic = validate(&text, &root_tag);
                // The pipeline may have been dropped meanwhile.
                let _ = tx.send(ValidationOutcome {
                    generation,
                    diagnostic,
                });
            });

        if let Err(err) = worker {
            tracing::warn!(generation, error = %err, "validation worker failed to start");
            self.in_flight -= 1;
            // The document stays unvalidated until the next change.
            return ValidationTicket { generation };
        }

        tracing::debug!(generation, "validation requested");
        ValidationTicket { generation }
    }

    /// Apply every result that has already arrived. Returns how many were received.
    pub fn poll<S>(&mut self, sink: &mut S) -> usize
    where
        S: AnnotationSink + ?Sized,
    {
        let mut received = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply(outcome, sink);
            received += 1;
        }
        received
    }

    /// Block until every outstanding request has reported, or `timeout` elapses.
    ///
    /// Returns `true` when the pipeline is idle afterwards.
    pub fn wait<S>(&mut self, sink: &mut S, timeout: Duration) -> bool
    where
        S: AnnotationSink + ?Sized,
    {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(outcome) => {
                    self.in_flight -= 1;
                    self.apply(outcome, sink);
                }
                Err(_) => break,
            }
        }
        self.in_flight == 0
    }

    /// Apply one outcome to `sink` according to the stale-result policy.
    pub fn apply<S>(&mut self, outcome: ValidationOutcome, sink: &mut S) -> ApplyResult
    where
        S: AnnotationSink + ?Sized,
    {
        if self.policy == StaleResultPolicy::Discard && outcome.generation < self.latest {
            tracing::trace!(
                generation = outcome.generation,
                latest = self.latest,
                "discarding stale validation result"
            );
            return ApplyResult::Discarded;
        }

        sink.remove_all(&self.marker);
        if let Some(diagnostic) = &outcome.diagnostic {
            sink.add(
                Some(&self.marker),
                Some(&diagnostic.message),
                diagnostic.span(),
            );
            tracing::debug!(
                generation = outcome.generation,
                offset = diagnostic.offset,
                line = diagnostic.line,
                message = %diagnostic.message,
                "validation failed"
            );
        }
        self.applied = outcome.generation;
        self.current = outcome.diagnostic;
        ApplyResult::Applied
    }

    /// Number of requests whose results have not been received.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Generation of the newest request.
    pub fn latest_generation(&self) -> u64 {
        self.latest
    }

    /// Generation of the last applied outcome (0 before any).
    pub fn applied_generation(&self) -> u64 {
        self.applied
    }

    /// The live diagnostic, if the last applied outcome was a failure.
    pub fn current_diagnostic(&self) -> Option<&Diagnostic> {
        self.current.as_ref()
    }
}
