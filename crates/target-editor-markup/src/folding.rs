//! Character-level folding scanner.
//!
//! Computes multi-line foldable spans straight from raw text with a small state machine. It
//! never consults the element tree, so it keeps producing useful regions while the document
//! is malformed mid-edit.
//!
//! Pairing is approximate: every tag name has a FIFO queue of pending start offsets, and a
//! closing occurrence pops the oldest one. Interleaved same-named elements at different depths
//! can therefore mis-pair. Each span runs from the opening `<` to the end of the line holding
//! the closing tag, and only spans crossing a line break are kept.

use crate::config::EngineConfig;
use std::collections::{HashMap, VecDeque};
use target_editor_core::Span;

/// Pseudo tag name under which comments are paired.
pub const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Scanning phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldingState {
    /// Looking for the next `<` (or a `/>` closing the current start tag).
    SeekTagOpen,
    /// After `<` or `</`, waiting for the first name character.
    SeekWordStart,
    /// Inside a tag name.
    SeekWordEnd,
    /// Inside a comment, waiting for `-->`.
    SeekCommentEnd,
    /// A name closed on this line; waiting for the line terminator.
    SeekLineEnd,
}

/// Computes foldable spans for a document.
#[derive(Debug, Clone)]
pub struct FoldingScanner {
    fold_comments: bool,
}

impl FoldingScanner {
    /// Create a scanner that folds tags and comments.
    pub fn new() -> Self {
        Self {
            fold_comments: true,
        }
    }

    /// Create a scanner from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new().with_comment_folding(config.fold_comments)
    }

    /// Control whether multi-line comments fold.
    pub fn with_comment_folding(mut self, fold_comments: bool) -> Self {
        self.fold_comments = fold_comments;
        self
    }

    /// Scan `text` and return foldable spans (char offsets).
    ///
    /// Names closing on the same line resolve in the order their closers appear, and spans are
    /// returned in that resolution order.
    pub fn scan(&self, text: &str) -> Vec<Span> {
        Scan::new(text, self.fold_comments).run()
    }
}

impl Default for FoldingScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call scanner state.
struct Scan {
    chars: Vec<char>,
    fold_comments: bool,
    state: FoldingState,
    /// Current zero-based line.
    line: usize,
    /// Pending `(start_offset, start_line)` per name, oldest first.
    pending: HashMap<String, VecDeque<(usize, usize)>>,
    /// Names closed on the current line, in textual order.
    closing: Vec<String>,
    tag_start: usize,
    in_end_tag: bool,
    word_start: usize,
    /// Start tag whose `>` has not been seen yet.
    open_start_tag: Option<String>,
    spans: Vec<Span>,
}

impl Scan {
    fn new(text: &str, fold_comments: bool) -> Self {
        Self {
            chars: text.chars().collect(),
            fold_comments,
            state: FoldingState::SeekTagOpen,
            line: 0,
            pending: HashMap::new(),
            closing: Vec::new(),
            tag_start: 0,
            in_end_tag: false,
            word_start: 0,
            open_start_tag: None,
            spans: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Span> {
        let mut i = 0;
        while i < self.chars.len() {
            let c = self.chars[i];
            if is_line_terminator(c) {
                self.flush_closing(i);
            }

            let next = match self.state {
                FoldingState::SeekTagOpen => self.seek_tag_open(i),
                FoldingState::SeekWordStart => self.seek_word_start(i),
                FoldingState::SeekWordEnd => self.seek_word_end(i),
                FoldingState::SeekCommentEnd => self.seek_comment_end(i),
                FoldingState::SeekLineEnd => self.seek_line_end(i),
            };

            // `next == i` re-dispatches the same character in the new state.
            if next > i {
                if self.is_line_break_at(i) {
                    self.line += 1;
                }
                i = next;
            }
        }

        if self.state == FoldingState::SeekWordEnd {
            let len = self.chars.len();
            self.complete_name(len);
        }
        let len = self.chars.len();
        self.flush_closing(len);
        self.spans
    }

    fn seek_tag_open(&mut self, i: usize) -> usize {
        match self.chars[i] {
            '<' => self.tag_open(i),
            '/' if self.peek(i + 1) == Some('>') => {
                if let Some(name) = self.open_start_tag.take() {
                    self.close_on_line(name);
                }
                i + 2
            }
            '>' => {
                self.open_start_tag = None;
                i + 1
            }
            _ => i + 1,
        }
    }

    fn tag_open(&mut self, i: usize) -> usize {
        self.open_start_tag = None;

        if self.starts_with(i, COMMENT_OPEN) {
            if self.fold_comments {
                self.push_start(COMMENT_OPEN.to_string(), i);
            }
            self.state = FoldingState::SeekCommentEnd;
            return i + COMMENT_OPEN.chars().count();
        }

        match self.peek(i + 1) {
            // Processing instructions and declarations never fold.
            Some('?' | '!') => i + 1,
            Some('/') => {
                self.tag_start = i;
                self.in_end_tag = true;
                self.state = FoldingState::SeekWordStart;
                i + 2
            }
            _ => {
                self.tag_start = i;
                self.in_end_tag = false;
                self.state = FoldingState::SeekWordStart;
                i + 1
            }
        }
    }

    fn seek_word_start(&mut self, i: usize) -> usize {
        let c = self.chars[i];
        if c == '<' || c == '>' {
            self.state = FoldingState::SeekTagOpen;
            return i;
        }
        if c.is_whitespace() {
            return i + 1;
        }
        self.word_start = i;
        self.state = FoldingState::SeekWordEnd;
        i + 1
    }

    fn seek_word_end(&mut self, i: usize) -> usize {
        if is_name_char(self.chars[i]) {
            return i + 1;
        }
        self.complete_name(i);
        i
    }

    fn seek_comment_end(&mut self, i: usize) -> usize {
        if !self.starts_with(i, COMMENT_CLOSE) {
            return i + 1;
        }
        if self.fold_comments {
            self.close_on_line(COMMENT_OPEN.to_string());
        } else {
            self.state = FoldingState::SeekTagOpen;
        }
        i + COMMENT_CLOSE.chars().count()
    }

    fn seek_line_end(&mut self, i: usize) -> usize {
        if is_line_terminator(self.chars[i]) {
            self.state = FoldingState::SeekTagOpen;
            return i + 1;
        }
        // Later tags on the same line are still tracked.
        self.seek_tag_open(i)
    }

    fn complete_name(&mut self, end: usize) {
        let name = self.chars[self.word_start..end].iter().collect::<String>();
        if self.in_end_tag {
            self.close_on_line(name);
        } else {
            self.push_start(name.clone(), self.tag_start);
            self.open_start_tag = Some(name);
            self.state = FoldingState::SeekTagOpen;
        }
    }

    fn push_start(&mut self, name: String, offset: usize) {
        self.pending
            .entry(name)
            .or_default()
            .push_back((offset, self.line));
    }

    fn close_on_line(&mut self, name: String) {
        self.closing.push(name);
        self.state = FoldingState::SeekLineEnd;
    }

    /// Resolve every name closed on the current line; `end` is the line end offset.
    fn flush_closing(&mut self, end: usize) {
        for name in std::mem::take(&mut self.closing) {
            let Some((start, start_line)) = self
                .pending
                .get_mut(&name)
                .and_then(|queue| queue.pop_front())
            else {
                continue;
            };
            if start_line < self.line {
                self.spans.push(Span::from_range(start, end));
            }
        }
    }

    fn peek(&self, i: usize) -> Option<char> {
        self.chars.get(i).copied()
    }

    fn starts_with(&self, i: usize, pattern: &str) -> bool {
        let mut offset = i;
        for expected in pattern.chars() {
            if self.peek(offset) != Some(expected) {
                return false;
            }
            offset += 1;
        }
        true
    }

    /// `\n`, or a `\r` not followed by `\n`.
    fn is_line_break_at(&self, i: usize) -> bool {
        match self.chars[i] {
            '\n' => true,
            '\r' => self.peek(i + 1) != Some('\n'),
            _ => false,
        }
    }
}

fn is_line_terminator(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '/' | '>' | '<')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Vec<Span> {
        FoldingScanner::new().scan(text)
    }

    #[test]
    fn test_single_line_never_folds() {
        assert!(scan("<a><b></b></a>").is_empty());
        assert!(scan("<!-- one line -->").is_empty());
    }

    #[test]
    fn test_simple_pair() {
        assert_eq!(scan("<a>\nx\n</a>"), vec![Span::new(0, 10)]);
    }

    #[test]
    fn test_span_ends_at_end_of_closing_line() {
        let text = "<a>\n</a> trailing text\nnext";
        assert_eq!(scan(text), vec![Span::new(0, 22)]);
    }

    #[test]
    fn test_crlf_line_end() {
        let text = "<a>\r\n</a>\r\n";
        assert_eq!(scan(text), vec![Span::new(0, 9)]);
    }

    #[test]
    fn test_multiline_comment_folds() {
        let text = "<!--\n  note\n-->\n<a/>";
        assert_eq!(scan(text), vec![Span::new(0, 15)]);
    }

    #[test]
    fn test_comment_folding_can_be_disabled() {
        let text = "<!--\n  note\n-->\n<a>\n</a>";
        let spans = FoldingScanner::new().with_comment_folding(false).scan(text);
        assert_eq!(spans, vec![Span::new(16, 8)]);
    }

    #[test]
    fn test_tags_inside_comment_are_ignored() {
        let text = "<!-- <a>\n --><b>\n</b>";
        assert_eq!(scan(text), vec![Span::new(0, 16), Span::new(13, 8)]);
    }

    #[test]
    fn test_multiline_self_closing_tag_folds() {
        let text = "<unit\n  id=\"a\"/>\n";
        assert_eq!(scan(text), vec![Span::new(0, 16)]);
    }

    #[test]
    fn test_processing_instruction_is_skipped() {
        let text = "<?xml version=\"1.0\"?>\n<a>\n</a>";
        assert_eq!(scan(text), vec![Span::new(22, 8)]);
    }

    #[test]
    fn test_end_tag_without_start_is_ignored() {
        assert!(scan("</a>\n</b>\n").is_empty());
    }

    #[test]
    fn test_unclosed_start_is_not_folded() {
        assert_eq!(scan("<a>\n<b>\n</b>\n"), vec![Span::new(4, 8)]);
    }

    #[test]
    fn test_truncated_end_tag_at_eof() {
        assert_eq!(scan("<a>\n</a"), vec![Span::new(0, 7)]);
    }
}
