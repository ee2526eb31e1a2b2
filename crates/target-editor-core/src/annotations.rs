//! Annotation data model.
//!
//! Annotations are host-owned marks anchored to document character offsets: folding regions,
//! error markers, inline affordances. The engine never stores them itself; it talks to an
//! [`AnnotationSink`] and keeps only the opaque [`AnnotationHandle`]s the sink returns.

use std::borrow::Cow;
use std::collections::BTreeMap;

/// A `(start_offset, length)` interval in character offsets.
///
/// Spans compare by value: two spans with the same pair are the same span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// Start offset (inclusive).
    pub start_offset: usize,
    /// Length in characters.
    pub length: usize,
}

impl Span {
    /// Create a span.
    pub const fn new(start_offset: usize, length: usize) -> Self {
        Self {
            start_offset,
            length,
        }
    }

    /// Create a span from a half-open `start..end` range.
    pub fn from_range(start: usize, end: usize) -> Self {
        Self::new(start, end.saturating_sub(start))
    }

    /// Exclusive end offset.
    pub fn end_offset(&self) -> usize {
        self.start_offset.saturating_add(self.length)
    }

    /// Check if the span contains a specific offset.
    pub fn contains(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset < self.end_offset()
    }

    /// Returns `true` for point-anchored spans.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// An opaque identifier minted by an [`AnnotationSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnnotationHandle(pub u64);

/// Identifier tagging a class of annotations for selective bulk removal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marker(Cow<'static, str>);

impl Marker {
    /// Marker used for structural validation diagnostics.
    pub const VALIDATION: Self = Self(Cow::Borrowed("target-editor.validation"));

    /// Create a marker from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The marker name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Marker {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host-owned annotation storage.
pub trait AnnotationSink {
    /// Add an annotation and return its handle.
    ///
    /// Folding regions are added without a marker or message; diagnostics carry both.
    fn add(&mut self, marker: Option<&Marker>, message: Option<&str>, span: Span)
    -> AnnotationHandle;

    /// Remove a single annotation. Unknown handles are ignored.
    fn remove(&mut self, handle: AnnotationHandle);

    /// Remove every annotation tagged with `marker`.
    fn remove_all(&mut self, marker: &Marker);
}

/// A single stored annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Optional class marker.
    pub marker: Option<Marker>,
    /// Optional message (diagnostic text).
    pub message: Option<String>,
    /// Anchor span.
    pub span: Span,
}

/// In-memory [`AnnotationSink`].
///
/// Handles are allocated sequentially and never reused.
#[derive(Debug, Default)]
pub struct AnnotationModel {
    annotations: BTreeMap<AnnotationHandle, Annotation>,
    next_handle: u64,
}

impl AnnotationModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live annotations.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Returns `true` if no annotation is live.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Look up an annotation by handle.
    pub fn get(&self, handle: AnnotationHandle) -> Option<&Annotation> {
        self.annotations.get(&handle)
    }

    /// Iterate live annotations in handle (insertion) order.
    pub fn iter(&self) -> impl Iterator<Item = (AnnotationHandle, &Annotation)> {
        self.annotations.iter().map(|(handle, a)| (*handle, a))
    }

    /// Annotations tagged with `marker`.
    pub fn with_marker<'a>(&'a self, marker: &'a Marker) -> impl Iterator<Item = &'a Annotation> {
        self.annotations
            .values()
            .filter(move |a| a.marker.as_ref() == Some(marker))
    }

    /// Spans of unmarked annotations (folding regions), sorted by start offset.
    pub fn unmarked_spans(&self) -> Vec<Span> {
        let mut spans = self
            .annotations
            .values()
            .filter(|a| a.marker.is_none())
            .map(|a| a.span)
            .collect::<Vec<_>>();
        spans.sort();
        spans
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.annotations.clear();
    }
}

impl AnnotationSink for AnnotationModel {
    fn add(
        &mut self,
        marker: Option<&Marker>,
        message: Option<&str>,
        span: Span,
    ) -> AnnotationHandle {
        let handle = AnnotationHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.annotations.insert(
            handle,
            Annotation {
                marker: marker.cloned(),
                message: message.map(str::to_string),
                span,
            },
        );
        handle
    }

    fn remove(&mut self, handle: AnnotationHandle) {
        self.annotations.remove(&handle);
    }

    fn remove_all(&mut self, marker: &Marker) {
        self.annotations
            .retain(|_, a| a.marker.as_ref() != Some(marker));
    }
}
