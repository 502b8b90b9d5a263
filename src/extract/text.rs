//! Reduction of fetched markup to visible text.

use scraper::{Html, Node};

/// Elements whose subtree never contributes visible text.
const SKIPPED_ELEMENTS: [&str; 2] = ["script", "style"];

/// Parses `page` as HTML and returns the concatenated text of every text node
/// outside `<script>` and `<style>`.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, and the
/// HTML5 parser recovers from any malformed markup, so this never fails.
/// Text nodes are joined without separators, the same way a DOM's
/// `textContent` reads.
#[must_use]
pub fn visible_text(page: &[u8]) -> String {
    let source = String::from_utf8_lossy(page);
    let document = Html::parse_document(&source);
    let mut text = String::with_capacity(source.len() / 2);

    // Explicit stack: hostile pages can nest elements deeply enough to
    // overflow a recursive walk.
    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(fragment) => text.push_str(fragment),
            Node::Element(element) if SKIPPED_ELEMENTS.contains(&element.name()) => {}
            _ => {
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev());
            }
        }
    }

    text
}
