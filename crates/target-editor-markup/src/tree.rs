//! Offset-annotated element tree.
//!
//! [`TreeBuilder`] consumes the tag event stream in a single pass. Nodes live in an arena owned
//! by [`MarkupTree`]; parent links are [`NodeId`] back-references, so dropping the tree drops
//! every node at once.

use crate::error::{ParseError, ParseErrorKind};
use crate::event::{TagEvent, TagKind};
use std::collections::BTreeMap;

/// Index of a node inside its [`MarkupTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in document order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Extra data for recognized tag names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Any other element.
    Element,
    /// `<target name="...">`
    Target {
        /// Display name of the target definition.
        name: Option<String>,
    },
    /// `<location type="...">`
    Location {
        /// Location type (e.g. `InstallableUnit`, `Directory`).
        location_type: Option<String>,
        /// Copied from a nested `<repository location="..."/>`.
        repository_location: Option<String>,
    },
    /// `<repository location="..."/>`
    Repository {
        /// Repository URL.
        location: Option<String>,
    },
    /// `<unit id="..." version="..."/>`
    Unit {
        /// Installable unit identifier.
        id: Option<String>,
        /// Installable unit version.
        version: Option<String>,
    },
}

impl NodeKind {
    fn for_event(event: &TagEvent) -> Self {
        let attr = |key: &str| event.attribute(key).map(str::to_string);
        match event.name.as_str() {
            "target" => Self::Target { name: attr("name") },
            "location" => Self::Location {
                location_type: attr("type"),
                repository_location: None,
            },
            "repository" => Self::Repository {
                location: attr("location"),
            },
            "unit" => Self::Unit {
                id: attr("id"),
                version: attr("version"),
            },
            _ => Self::Element,
        }
    }
}

/// One parsed element and its span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Tag name.
    pub tag_name: String,
    /// Offset of the start tag's `<`.
    pub start_offset: usize,
    /// Offset just past the matching end tag's `>`; `None` while the element is open.
    pub end_offset: Option<usize>,
    /// Enclosing element.
    pub parent: Option<NodeId>,
    /// Child elements in document order.
    pub children: Vec<NodeId>,
    /// Attributes of the start tag.
    pub attributes: BTreeMap<String, String>,
    /// Recognized-tag data.
    pub kind: NodeKind,
}

impl Node {
    /// Returns `true` if `offset` lies in `[start_offset, end_offset)`.
    ///
    /// Open elements contain every offset after their start.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start_offset && self.end_offset.is_none_or(|end| offset < end)
    }

    /// Attribute value by key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A rooted element tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupTree {
    nodes: Vec<Node>,
    top_level: Vec<NodeId>,
    root: Option<NodeId>,
}

impl MarkupTree {
    /// The node created by the designated root tag (the last one, if it occurs repeatedly).
    pub fn root(&self) -> Option<&Node> {
        self.root.and_then(|id| self.get(id))
    }

    /// Id of the root node.
    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Elements without a parent, in document order.
    pub fn top_level(&self) -> impl Iterator<Item = &Node> {
        self.top_level.iter().filter_map(|id| self.get(*id))
    }

    /// Child elements of `id`.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self.get(id)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(|child| self.get(*child))
    }

    /// Parent element of `id`.
    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// All nodes in document order (by start offset).
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// The deepest element containing `offset`.
    pub fn node_at(&self, offset: usize) -> Option<(NodeId, &Node)> {
        let mut candidates = self.top_level.as_slice();
        let mut found = None;
        while let Some(&id) = candidates.iter().find(|id| self.nodes[id.0].contains(offset)) {
            found = Some(id);
            candidates = self.nodes[id.0].children.as_slice();
        }
        found.map(|id| (id, &self.nodes[id.0]))
    }

    /// All `<unit>` nodes in document order.
    pub fn units(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Unit { .. }))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Single-pass tree builder over a tag event stream.
///
/// The builder tracks only the innermost open element; ascending follows parent links.
#[derive(Debug)]
pub struct TreeBuilder<'a> {
    root_tag: &'a str,
    tree: MarkupTree,
    open: Option<NodeId>,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder; elements named `root_tag` set the tree's root reference.
    pub fn new(root_tag: &'a str) -> Self {
        Self {
            root_tag,
            tree: MarkupTree::default(),
            open: None,
        }
    }

    /// Consume `events` and return the tree plus the build outcome.
    ///
    /// On failure the tree holds everything built before the failing event.
    pub fn build<I>(mut self, events: I) -> (MarkupTree, Result<(), ParseError>)
    where
        I: IntoIterator<Item = Result<TagEvent, ParseError>>,
    {
        for event in events {
            let step = event.and_then(|event| self.push(event));
            if let Err(err) = step {
                return (self.tree, Err(err));
            }
        }
        let outcome = self.finish_check();
        (self.tree, outcome)
    }

    /// Feed one event.
    pub fn push(&mut self, event: TagEvent) -> Result<(), ParseError> {
        match event.kind {
            TagKind::ProcessingInstruction | TagKind::Declaration => Ok(()),
            TagKind::Start | TagKind::SelfClosing => {
                self.open_element(event);
                Ok(())
            }
            TagKind::End => self.close_element(event),
        }
    }

    fn open_element(&mut self, event: TagEvent) {
        let id = NodeId(self.tree.nodes.len());
        let kind = NodeKind::for_event(&event);

        if let NodeKind::Repository {
            location: Some(location),
        } = &kind
        {
            self.attach_repository(location);
        }

        let self_closing = event.kind == TagKind::SelfClosing;
        let is_root = event.name == self.root_tag;

        self.tree.nodes.push(Node {
            tag_name: event.name,
            start_offset: event.start_offset,
            end_offset: self_closing.then_some(event.end_offset),
            parent: self.open,
            children: Vec::new(),
            attributes: event.attributes,
            kind,
        });

        match self.open {
            Some(parent) => self.tree.nodes[parent.0].children.push(id),
            None => self.tree.top_level.push(id),
        }
        if is_root {
            self.tree.root = Some(id);
        }
        if !self_closing {
            self.open = Some(id);
        }
    }

    fn close_element(&mut self, event: TagEvent) -> Result<(), ParseError> {
        let Some(open) = self.open else {
            return Err(ParseError::new(
                event.start_offset,
                ParseErrorKind::StrayEndTag { name: event.name },
            ));
        };

        let node = &mut self.tree.nodes[open.0];
        if node.tag_name != event.name {
            return Err(ParseError::new(
                event.start_offset,
                ParseErrorKind::MismatchedEndTag {
                    expected: node.tag_name.clone(),
                    found: event.name,
                },
            ));
        }

        node.end_offset = Some(event.end_offset);
        self.open = node.parent;
        Ok(())
    }

    /// Copy a repository URL into the nearest enclosing `<location>`.
    fn attach_repository(&mut self, url: &str) {
        let mut cursor = self.open;
        while let Some(id) = cursor {
            let node = &mut self.tree.nodes[id.0];
            if let NodeKind::Location {
                repository_location,
                ..
            } = &mut node.kind
            {
                *repository_location = Some(url.to_string());
                return;
            }
            cursor = node.parent;
        }
    }

    fn finish_check(&self) -> Result<(), ParseError> {
        if let Some(open) = self.open {
            let node = &self.tree.nodes[open.0];
            return Err(ParseError::new(
                node.start_offset,
                ParseErrorKind::UnclosedElement {
                    name: node.tag_name.clone(),
                },
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TagLexer;

    fn build(text: &str) -> (MarkupTree, Result<(), ParseError>) {
        TreeBuilder::new("target").build(TagLexer::new(text))
    }

    #[test]
    fn test_repository_location_reaches_enclosing_location() {
        let text = r#"<target><locations><location type="InstallableUnit"><unit id="a" version="1"/><repository location="https://example.org/p2"/></location></locations></target>"#;
        let (tree, result) = build(text);
        assert!(result.is_ok());

        let location = tree
            .iter()
            .map(|(_, node)| node)
            .find(|node| node.tag_name == "location")
            .unwrap();
        assert_eq!(
            location.kind,
            NodeKind::Location {
                location_type: Some("InstallableUnit".to_string()),
                repository_location: Some("https://example.org/p2".to_string()),
            }
        );
    }

    #[test]
    fn test_later_root_tag_wins() {
        let (tree, result) = build("<target name=\"a\"></target><target name=\"b\"></target>");
        assert!(result.is_ok());
        assert_eq!(tree.top_level().count(), 2);
        assert_eq!(
            tree.root().map(|n| n.kind.clone()),
            Some(NodeKind::Target {
                name: Some("b".to_string())
            })
        );
    }

    #[test]
    fn test_stray_end_tag_keeps_partial_tree() {
        let (tree, result) = build("<target></target></locations>");
        assert_eq!(
            result,
            Err(ParseError::new(
                17,
                ParseErrorKind::StrayEndTag {
                    name: "locations".to_string()
                }
            ))
        );
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().and_then(|n| n.end_offset), Some(17));
    }

    #[test]
    fn test_mismatched_end_tag() {
        let (_, result) = build("<target><locations></target>");
        assert_eq!(
            result,
            Err(ParseError::new(
                19,
                ParseErrorKind::MismatchedEndTag {
                    expected: "locations".to_string(),
                    found: "target".to_string(),
                }
            ))
        );
    }

    #[test]
    fn test_node_at_finds_deepest() {
        let text = "<target>\n<locations>\n<unit id=\"x\"/>\n</locations>\n</target>";
        let (tree, result) = build(text);
        assert!(result.is_ok());

        let (_, unit) = tree.node_at(22).unwrap();
        assert_eq!(unit.tag_name, "unit");
        let (_, locations) = tree.node_at(9).unwrap();
        assert_eq!(locations.tag_name, "locations");
        let (root_id, root) = tree.node_at(0).unwrap();
        assert_eq!(root.tag_name, "target");
        assert_eq!(tree.root_id(), Some(root_id));
        assert!(tree.node_at(500).is_none());
    }

    #[test]
    fn test_processing_instruction_produces_no_node() {
        let (tree, result) = build("<?xml version=\"1.0\"?><?pde version=\"3.8\"?><target/>");
        assert!(result.is_ok());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_blank_document_is_valid_and_rootless() {
        for text in ["", "  \n\r\n", "  \n<!-- only a comment -->\n"] {
            let (tree, result) = build(text);
            assert!(result.is_ok(), "{text:?}");
            assert!(tree.is_empty());
            assert!(tree.root().is_none());
        }
    }
}
