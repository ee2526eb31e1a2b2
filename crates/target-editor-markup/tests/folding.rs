use pretty_assertions::assert_eq;
use target_editor_core::Span;
use target_editor_markup::{EngineConfig, FoldingScanner};

const SINGLE_LINE: &str = r#"<target><locations><location><unit id="foo" version="1.0.0"/></location></locations></target>"#;

const FIVE_LINES: &str = "<target>\n<locations>\n<location>\n<unit id=\"foo\" version=\"1.0.0\"/>\n</location></locations></target>";

fn slice(text: &str, span: Span) -> String {
    text.chars()
        .skip(span.start_offset)
        .take(span.length)
        .collect()
}

#[test]
fn test_single_line_document_has_no_folds() {
    assert_eq!(FoldingScanner::new().scan(SINGLE_LINE), vec![]);
}

#[test]
fn test_five_line_document_folds_each_multiline_pair() {
    let spans = FoldingScanner::new().scan(FIVE_LINES);
    assert_eq!(
        spans,
        vec![Span::new(21, 76), Span::new(9, 88), Span::new(0, 97)]
    );
    assert!(slice(FIVE_LINES, spans[0]).starts_with("<location>"));
    assert!(slice(FIVE_LINES, spans[1]).starts_with("<locations>"));
    assert!(slice(FIVE_LINES, spans[2]).starts_with("<target>"));
}

#[test]
fn test_one_tag_per_line_layout() {
    let text = "<target>\n  <locations>\n    <location>\n      <unit id=\"foo\"/>\n    </location>\n  </locations>\n</target>\n";
    let spans = FoldingScanner::new().scan(text);
    let folded = spans
        .iter()
        .map(|span| {
            let body = slice(text, *span);
            body.lines().next().unwrap_or_default().trim().to_string()
        })
        .collect::<Vec<_>>();
    assert_eq!(folded, ["<location>", "<locations>", "<target>"]);
    for span in &spans {
        assert!(slice(text, *span).ends_with('>'));
    }
}

#[test]
fn test_scanning_is_deterministic() {
    let scanner = FoldingScanner::new();
    let text = "<!--\nheader\n-->\n<target>\n<a>\n<a>\n</a></a>\n<b x=\"1\"\n/>\n</target>";
    let first = scanner.scan(text);
    let second = scanner.scan(text);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_every_span_crosses_a_line_break() {
    let scanner = FoldingScanner::new();
    let documents = [
        FIVE_LINES,
        "<a><b>\n</b></a>",
        "<a>\r\n<b></b>\r\n</a>",
        "<a>\r<b>\r</b>\r</a>",
        "<!-- x -->\n<!--\n-->\n<a></a>\n<a>\n</a>",
    ];
    for text in documents {
        let spans = scanner.scan(text);
        assert!(!spans.is_empty(), "{text:?}");
        for span in spans {
            let body = slice(text, span);
            assert!(body.contains(['\n', '\r']), "{body:?} from {text:?}");
        }
    }
}

#[test]
fn test_same_name_pairs_oldest_first() {
    // The first closer pairs with the outermost start.
    let text = "<a>\n<a>\n</a>\n</a>";
    assert_eq!(
        FoldingScanner::new().scan(text),
        vec![Span::new(0, 12), Span::new(4, 13)]
    );
}

#[test]
fn test_closers_on_one_line_resolve_in_textual_order() {
    let scanner = FoldingScanner::new();
    assert_eq!(
        scanner.scan("<a>\n<b>\n</b></a>"),
        vec![Span::new(4, 12), Span::new(0, 16)]
    );
    assert_eq!(
        scanner.scan("<a>\n<b>\n</a></b>"),
        vec![Span::new(0, 16), Span::new(4, 12)]
    );
}

#[test]
fn test_crlf_document() {
    let text = FIVE_LINES.replace('\n', "\r\n");
    let spans = FoldingScanner::new().scan(&text);
    assert_eq!(
        spans,
        vec![Span::new(23, 78), Span::new(10, 91), Span::new(0, 101)]
    );
}

#[test]
fn test_config_disables_comment_folding() {
    let text = "<!--\nnote\n-->";
    let config = EngineConfig::default().with_fold_comments(false);
    assert_eq!(FoldingScanner::from_config(&config).scan(text), vec![]);
    assert_eq!(FoldingScanner::new().scan(text), vec![Span::new(0, 13)]);
}
