//! Tag classification.
//!
//! Turns one matched tag string into a [`TagEvent`]: name, shape and attributes. No schema is
//! consulted; every well-formed `key="value"` token inside the tag is accepted.

use crate::event::{TagEvent, TagKind};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*"([^"]*)""#)
        .expect("attribute pattern is valid")
});

/// Classify a matched tag starting at character offset `start_offset`.
pub fn classify(raw: &str, start_offset: usize) -> TagEvent {
    let end_offset = start_offset + raw.chars().count();

    TagEvent {
        name: tag_name(raw).to_string(),
        raw_text: raw.to_string(),
        start_offset,
        end_offset,
        kind: tag_kind(raw),
        attributes: attributes(raw),
    }
}

fn tag_kind(raw: &str) -> TagKind {
    if raw.starts_with("</") {
        TagKind::End
    } else if raw.starts_with("<?") {
        TagKind::ProcessingInstruction
    } else if raw.starts_with("<!") {
        TagKind::Declaration
    } else if raw.ends_with("/>") {
        TagKind::SelfClosing
    } else {
        TagKind::Start
    }
}

fn tag_name(raw: &str) -> &str {
    let body = raw.strip_prefix('<').unwrap_or(raw);
    let body = body
        .strip_prefix(['/', '?', '!'])
        .unwrap_or(body)
        .trim_start();
    let end = body
        .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>' | '?'))
        .unwrap_or(body.len());
    &body[..end]
}

fn attributes(raw: &str) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    for caps in ATTRIBUTE_PATTERN.captures_iter(raw) {
        if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
            attributes.insert(key.as_str().to_string(), value.as_str().to_string());
        }
    }
    attributes
}
