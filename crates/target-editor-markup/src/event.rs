//! Tag events produced by the lexer.

use std::collections::BTreeMap;

/// Lexical shape of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<name ...>`
    Start,
    /// `</name>`
    End,
    /// `<name .../>`
    SelfClosing,
    /// `<?name ...?>`
    ProcessingInstruction,
    /// `<!NAME ...>` (e.g. `DOCTYPE`)
    Declaration,
}

/// One opening, closing or self-closing tag occurrence with its source offsets.
///
/// Offsets are character offsets; `end_offset` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent {
    /// Tag name (`unit` for `<unit .../>`).
    pub name: String,
    /// The matched tag text, from `<` through `>`.
    pub raw_text: String,
    /// Offset of the `<`.
    pub start_offset: usize,
    /// Offset just past the `>`.
    pub end_offset: usize,
    /// Lexical shape.
    pub kind: TagKind,
    /// `key="value"` pairs; a repeated key keeps its last value.
    pub attributes: BTreeMap<String, String>,
}

impl TagEvent {
    /// Opens an element (start or self-closing tag).
    pub fn is_start(&self) -> bool {
        matches!(self.kind, TagKind::Start | TagKind::SelfClosing)
    }

    /// Closes an element (end or self-closing tag).
    pub fn is_end(&self) -> bool {
        matches!(self.kind, TagKind::End | TagKind::SelfClosing)
    }

    /// Processing instructions and declarations never produce tree nodes.
    pub fn is_markup_declaration(&self) -> bool {
        matches!(
            self.kind,
            TagKind::ProcessingInstruction | TagKind::Declaration
        )
    }

    /// Attribute value by key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
