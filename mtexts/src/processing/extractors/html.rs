use scraper::{Html, Node};

use super::TextExtractor;

/// Elements whose whole subtree is dropped before text collection.
const SKIPPED_ELEMENTS: [&str; 2] = ["script", "style"];

pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn extract(bytes: &[u8]) -> String {
        let html = TextExtractor::decode(bytes);
        Self::extract_from_str(&html)
    }

    pub fn extract_from_str(html: &str) -> String {
        let document = Html::parse_document(html);
        let raw = Self::collect_text(&document);
        Self::normalize(&raw)
    }

    /// Concatenates every text node in document order, skipping script and
    /// style subtrees entirely.
    fn collect_text(document: &Html) -> String {
        let mut text = String::new();
        let mut stack = vec![document.tree.root()];

        while let Some(node) = stack.pop() {
            match node.value() {
                Node::Text(content) => {
                    text.push_str(content);
                    continue;
                }
                Node::Element(element) if SKIPPED_ELEMENTS.contains(&element.name()) => continue,
                _ => {}
            }

            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
        }

        text
    }

    /// Trims each line, splits merged headline runs on double spaces and
    /// joins the non-empty fragments with single newlines.
    fn normalize(text: &str) -> String {
        text.split(Self::is_line_boundary)
            .map(str::trim)
            .flat_map(|line| line.split("  "))
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Line terminators, including vertical tab, form feed, the ASCII
    /// separators, NEL and the Unicode line and paragraph separators.
    fn is_line_boundary(c: char) -> bool {
        matches!(
            c,
            '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_script_and_style_never_leak() {
        let html = r#"<html><head><title>Page</title><style>body { color: red; }</style></head>
<body><h1>Heading</h1><script>alert(1)</script><p>Paragraph text</p></body></html>"#;

        let text = HtmlExtractor::extract(html.as_bytes());
        assert!(!text.contains("alert(1)"));
        assert!(!text.contains("color: red"));
        assert!(text.contains("Heading"));
        assert!(text.contains("Paragraph text"));
    }

    #[test]
    fn test_lines_are_trimmed_and_blank_lines_dropped() {
        let html = "<body>\n   <p>  first  </p>\n\n\n   <p>second</p>\n</body>";
        assert_eq!(HtmlExtractor::extract_from_str(html), "first\nsecond");
    }

    #[test]
    fn test_double_spaces_split_headline_runs() {
        let html = "<body><p>Top story  Second story   Third</p></body>";
        assert_eq!(
            HtmlExtractor::extract_from_str(html),
            "Top story\nSecond story\nThird"
        );
    }

    #[test]
    fn test_form_feeds_and_unicode_separators_break_lines() {
        let text = "Page one\u{000C}Page two\u{2028}Line three\u{2029}Para four\u{0085}Fifth\u{000B}Sixth";
        assert_eq!(
            HtmlExtractor::normalize(text),
            "Page one\nPage two\nLine three\nPara four\nFifth\nSixth"
        );
        assert_eq!(
            HtmlExtractor::extract_from_str("<p>Left\u{2028}Right</p>"),
            "Left\nRight"
        );
    }

    #[test]
    fn test_nested_script_inside_body_content() {
        let html = "<div>before<div><script>var secret = 42;</script></div>after</div>";
        let text = HtmlExtractor::extract_from_str(html);
        assert!(!text.contains("secret"));
        assert_eq!(text, "beforeafter");
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let mut bytes = b"<p>caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"</p>");
        let text = HtmlExtractor::extract(&bytes);
        assert_eq!(text, "caf\u{FFFD}");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(HtmlExtractor::extract(b""), "");
    }
}
