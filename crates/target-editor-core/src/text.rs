//! Text source abstraction.
//!
//! The analysis engine never talks to a concrete editor buffer. It reads through [`TextSource`],
//! expressed in **character offsets** (Unicode scalar values), and learns about edits through
//! [`TextChange`] records.

use std::ops::Range;
use std::path::Path;

/// Read access to a document's text, as consumed by the analysis engine.
pub trait TextSource {
    /// The full document text.
    fn text(&self) -> String;

    /// Document length in characters.
    fn len_chars(&self) -> usize;

    /// The character at `offset`, or `None` past the end of the document.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Zero-based line containing `offset`.
    ///
    /// `\n`, `\r\n` and a lone `\r` each end a line. Offsets past the end of the document map to
    /// the last line.
    fn line_of_offset(&self, offset: usize) -> usize;

    /// The file backing this document, if any.
    fn location(&self) -> Option<&Path> {
        None
    }
}

impl TextSource for str {
    fn text(&self) -> String {
        self.to_string()
    }

    fn len_chars(&self) -> usize {
        self.chars().count()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.chars().nth(offset)
    }

    fn line_of_offset(&self, offset: usize) -> usize {
        let mut chars = self.chars().peekable();
        let mut line = 0;
        for _ in 0..offset {
            let Some(c) = chars.next() else {
                break;
            };
            match c {
                '\n' => line += 1,
                // `\r\n` is one break, counted at its `\n`.
                '\r' if chars.peek() != Some(&'\n') => line += 1,
                _ => {}
            }
        }
        line
    }
}

impl TextSource for String {
    fn text(&self) -> String {
        self.clone()
    }

    fn len_chars(&self) -> usize {
        self.as_str().len_chars()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.as_str().char_at(offset)
    }

    fn line_of_offset(&self, offset: usize) -> usize {
        self.as_str().line_of_offset(offset)
    }
}

/// A single replacement applied to a document.
///
/// `range` is the replaced character range in the document **before** the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// Replaced range (char offsets, half-open) in the pre-change document.
    pub range: Range<usize>,
    /// Text inserted in place of `range` (may be empty).
    pub replacement: String,
}

impl TextChange {
    /// Create a change record.
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Number of characters removed.
    pub fn removed_len(&self) -> usize {
        self.range.end.saturating_sub(self.range.start)
    }

    /// Number of characters inserted.
    pub fn inserted_len(&self) -> usize {
        self.replacement.chars().count()
    }

    /// Exclusive end of the inserted text in the post-change document.
    pub fn new_end(&self) -> usize {
        self.range.start.saturating_add(self.inserted_len())
    }

    /// Returns `true` if the change neither removes nor inserts anything.
    pub fn is_noop(&self) -> bool {
        self.removed_len() == 0 && self.replacement.is_empty()
    }
}
