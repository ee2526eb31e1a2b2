//! Rope-backed in-memory document.
//!
//! [`Document`] is the reference [`TextSource`] implementation: it stores text in a
//! [`ropey::Rope`] (O(log n) offset → line lookup), tracks a version number and notifies
//! subscribers with a [`TextChange`] after every edit.

use crate::text::{TextChange, TextSource};
use ropey::Rope;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Change callback function type.
pub type ChangeCallback = Box<dyn FnMut(&TextChange) + Send>;

/// An editable document.
///
/// # Example
///
/// ```rust
/// use target_editor_core::{Document, TextSource};
/// use std::sync::{Arc, Mutex};
///
/// let mut doc = Document::new("<target>\n</target>");
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let seen_clone = Arc::clone(&seen);
/// doc.subscribe(move |change| seen_clone.lock().unwrap().push(change.clone()));
///
/// doc.insert(8, "\n<locations/>");
/// assert_eq!(doc.line_of_offset(10), 1);
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
pub struct Document {
    rope: Rope,
    location: Option<PathBuf>,
    version: u64,
    callbacks: Vec<ChangeCallback>,
}

impl Document {
    /// Create a document without a backing file.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            location: None,
            version: 0,
            callbacks: Vec::new(),
        }
    }

    /// Attach the file backing this document.
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Monotonic version, incremented on every non-empty edit.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Total line count (an empty document has one line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get line number and column from a character offset.
    pub fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        (line, offset - self.rope.line_to_char(line))
    }

    /// Get the character offset of the first character of `line`.
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(line)
    }

    /// Subscribe to text changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&TextChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Replace `range` (char offsets, clamped to the document) with `text`.
    ///
    /// Returns the applied change. Subscribers are not notified for no-op edits.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> TextChange {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        let change = TextChange::new(start..end, text);
        if change.is_noop() {
            return change;
        }

        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
        self.version = self.version.saturating_add(1);

        tracing::trace!(
            version = self.version,
            start,
            end,
            inserted = change.inserted_len(),
            "document changed"
        );

        for callback in &mut self.callbacks {
            callback(&change);
        }
        change
    }

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> TextChange {
        self.replace(offset..offset, text)
    }

    /// Delete the characters in `range`.
    pub fn delete(&mut self, range: Range<usize>) -> TextChange {
        self.replace(range, "")
    }

    /// Replace the whole text.
    pub fn set_text(&mut self, text: &str) -> TextChange {
        let len = self.rope.len_chars();
        self.replace(0..len, text)
    }
}

impl TextSource for Document {
    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.rope.get_char(offset)
    }

    fn line_of_offset(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("len_chars", &self.rope.len_chars())
            .field("location", &self.location)
            .field("version", &self.version)
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}
