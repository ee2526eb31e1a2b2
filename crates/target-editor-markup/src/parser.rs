//! Caller-owned parser.

use crate::config::EngineConfig;
use crate::error::ParseError;
use crate::lexer::TagLexer;
use crate::tree::{MarkupTree, TreeBuilder};

/// A caller-owned parser: lexer, classifier and tree builder behind one call.
///
/// Each open document should own its parser; nothing is shared between instances.
///
/// # Example
///
/// ```rust
/// use target_editor_markup::{MarkupParser, NodeKind};
///
/// let mut parser = MarkupParser::new();
/// let tree = parser
///     .parse(r#"<target><locations><location><unit id="foo" version="1.0.0"/></location></locations></target>"#)
///     .unwrap();
///
/// let unit = tree.units().next().unwrap();
/// assert_eq!(
///     unit.kind,
///     NodeKind::Unit { id: Some("foo".into()), version: Some("1.0.0".into()) }
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MarkupParser {
    root_tag: String,
    tree: MarkupTree,
    last_error: Option<ParseError>,
}

impl MarkupParser {
    /// Create a parser for `<target>` documents.
    pub fn new() -> Self {
        Self::with_root_tag("target")
    }

    /// Create a parser with a custom root tag.
    pub fn with_root_tag(root_tag: impl Into<String>) -> Self {
        Self {
            root_tag: root_tag.into(),
            tree: MarkupTree::default(),
            last_error: None,
        }
    }

    /// Create a parser from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_root_tag(config.root_tag.clone())
    }

    /// The root tag name.
    pub fn root_tag(&self) -> &str {
        &self.root_tag
    }

    /// Rebuild the tree from `text`, discarding the previous one.
    ///
    /// On failure the partial tree stays available through [`MarkupParser::tree`].
    pub fn parse(&mut self, text: &str) -> Result<&MarkupTree, ParseError> {
        let (tree, outcome) = TreeBuilder::new(&self.root_tag).build(TagLexer::new(text));
        self.tree = tree;
        self.last_error = outcome.as_ref().err().cloned();
        outcome.map(|()| &self.tree)
    }

    /// The tree from the last [`MarkupParser::parse`] call.
    pub fn tree(&self) -> &MarkupTree {
        &self.tree
    }

    /// The failure from the last [`MarkupParser::parse`] call, if any.
    pub fn last_error(&self) -> Option<&ParseError> {
        self.last_error.as_ref()
    }
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_parse_starts_from_scratch() {
        let mut parser = MarkupParser::new();
        assert!(parser.parse("<target><a/></target>").is_ok());
        assert_eq!(parser.tree().len(), 2);

        assert!(parser.parse("<other/>").is_ok());
        assert_eq!(parser.tree().len(), 1);
        assert!(parser.tree().root().is_none());
    }

    #[test]
    fn test_failure_is_recorded_and_cleared() {
        let mut parser = MarkupParser::new();
        assert!(parser.parse("<target>").is_err());
        assert!(parser.last_error().is_some());
        assert_eq!(parser.tree().len(), 1);

        assert!(parser.parse("<target/>").is_ok());
        assert!(parser.last_error().is_none());
    }

    #[test]
    fn test_parsers_do_not_share_state() {
        let mut first = MarkupParser::new();
        let mut second = MarkupParser::with_root_tag("feature");
        first.parse("<target/>").unwrap();
        second.parse("<feature/>").unwrap();
        assert_eq!(first.tree().root().map(|n| n.tag_name.as_str()), Some("target"));
        assert_eq!(second.tree().root().map(|n| n.tag_name.as_str()), Some("feature"));
    }
}
