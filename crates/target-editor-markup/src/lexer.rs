//! Tag lexer.
//!
//! Scans raw document text for tag-like `<...>` spans and yields them as [`TagEvent`]s with
//! exact character offsets. Comments are skipped without producing events. This is not an XML
//! tokenizer: entities, CDATA contents and namespaces are not modeled.

use crate::classifier::classify;
use crate::error::{ParseError, ParseErrorKind};
use crate::event::TagEvent;
use regex::Regex;
use std::sync::LazyLock;

/// A tag span may cross line boundaries.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("tag pattern is valid"));

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Iterator over the tags of a document.
///
/// Each item is either a classified tag or a lexical failure. After a failure the iterator is
/// exhausted. Create a new lexer to restart from the beginning.
///
/// # Example
///
/// ```rust
/// use target_editor_markup::TagLexer;
///
/// let names = TagLexer::new("<target><!-- skipped --><locations/></target>")
///     .map(|event| event.map(|e| e.name))
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(names, ["target", "locations", "target"]);
/// ```
#[derive(Debug, Clone)]
pub struct TagLexer<'a> {
    text: &'a str,
    /// Byte position of the unscanned remainder.
    cursor: usize,
    /// Byte position of the first `<!--` at or after the cursor, once searched for.
    next_comment: Option<usize>,
    /// No `<!--` remains past the cursor.
    comments_exhausted: bool,
    offsets: CharOffsets<'a>,
    finished: bool,
}

impl<'a> TagLexer<'a> {
    /// Create a lexer over the full document text.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            cursor: 0,
            next_comment: None,
            comments_exhausted: false,
            offsets: CharOffsets::new(text),
            finished: false,
        }
    }

    /// Position of the next comment opening, searching again only once the cursor passed the
    /// cached one.
    fn next_comment(&mut self) -> Option<usize> {
        if self.comments_exhausted {
            return None;
        }
        if let Some(at) = self.next_comment
            && at >= self.cursor
        {
            return Some(at);
        }
        self.next_comment = self.text[self.cursor..]
            .find(COMMENT_OPEN)
            .map(|found| self.cursor + found);
        self.comments_exhausted = self.next_comment.is_none();
        self.next_comment
    }

    fn fail(
        &mut self,
        byte_pos: usize,
        kind: ParseErrorKind,
    ) -> Option<Result<TagEvent, ParseError>> {
        self.finished = true;
        let offset = self.offsets.char_offset(byte_pos);
        tracing::trace!(offset, %kind, "lexer stopped");
        Some(Err(ParseError::new(offset, kind)))
    }
}

impl Iterator for TagLexer<'_> {
    type Item = Result<TagEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        while !self.finished {
            let comment = self.next_comment().map(|at| at - self.cursor);
            let rest = &text[self.cursor..];
            let tag = TAG_PATTERN.find(rest);

            // A comment opening no later than the next tag hides everything up to its close.
            if let Some(comment_start) = comment
                && tag.is_none_or(|m| comment_start <= m.start())
            {
                let body = comment_start + COMMENT_OPEN.len();
                match rest[body..].find(COMMENT_CLOSE) {
                    Some(close) => {
                        self.cursor += body + close + COMMENT_CLOSE.len();
                        continue;
                    }
                    None => {
                        let at = self.cursor + comment_start;
                        return self.fail(at, ParseErrorKind::UnterminatedComment);
                    }
                }
            }

            let Some(m) = tag else {
                self.finished = true;
                // A stray `<` with no closing `>` left in the remainder.
                return match rest.find('<') {
                    Some(lt) => {
                        let at = self.cursor + lt;
                        self.fail(at, ParseErrorKind::UnterminatedTag)
                    }
                    None => None,
                };
            };

            let start = self.cursor + m.start();
            self.cursor += m.end();
            let start_offset = self.offsets.char_offset(start);
            return Some(Ok(classify(m.as_str(), start_offset)));
        }
        None
    }
}

/// Converts monotonically increasing byte positions into character offsets.
#[derive(Debug, Clone)]
struct CharOffsets<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn char_offset(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}
