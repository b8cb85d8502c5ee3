// src/extract/text.rs
// =============================================================================
// This module turns HTML into plain text.
//
// Two flavours:
// - visible_text(): everything a reader would see. Used to measure how much
//   text a page has, which tells us whether it needs a browser.
// - clean_page_text(): only the main content of <body>, without menus,
//   headers, footers, link labels or buttons, and with punctuation removed.
//   This is what we save to disk.
//
// Rust concepts:
// - Iterators: filter/map chains over the DOM tree
// - scraper's DOM is a tree (ego_tree); every node knows its ancestors
// =============================================================================

use scraper::{Html, Node, Selector};

// Text inside these elements is never rendered
const INVISIBLE_TAGS: &[&str] = &["style", "script", "head", "title", "meta", "noscript", "template"];

// Text inside these elements is rendered but is page chrome, not content
const BOILERPLATE_TAGS: &[&str] = &["nav", "header", "footer", "a", "button"];

// Extracts the visible text of a page
//
// Each text node is trimmed, empty ones are dropped, and the rest are
// joined with single spaces. Comments never show up because they are
// Comment nodes, not Text nodes.
//
// Example:
//   "<head><title>T</title></head><body><p>Hi</p><script>x()</script></body>"
//   -> "Hi"
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let pieces: Vec<&str> = document
        .tree
        .root()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            if has_hidden_ancestor(node.ancestors().map(|a| a.value()), INVISIBLE_TAGS) {
                return None;
            }
            let trimmed = text.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
        .collect();

    pieces.join(" ")
}

// Extracts the text we persist for a page
pub fn clean_page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").unwrap();

    // html5ever always synthesizes a <body>, but fall back to the whole tree anyway
    let scope = match document.select(&body_selector).next() {
        Some(body) => *body,
        None => document.tree.root(),
    };

    let mut pieces = Vec::new();
    for node in scope.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let ancestors = || node.ancestors().map(|a| a.value());
        if has_hidden_ancestor(ancestors(), INVISIBLE_TAGS)
            || has_hidden_ancestor(ancestors(), BOILERPLATE_TAGS)
        {
            continue;
        }
        pieces.push(&**text);
    }

    clean_text(&pieces.join(" "))
}

// Normalizes text for storage
//
// - Removes every character that is not a letter, digit, underscore or whitespace
// - Collapses runs of whitespace (including newlines) into one space
//
// Example: "Hello,   world!\n\nIt's  me." -> "Hello world Its me"
pub fn clean_text(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

// True when the text node sits inside one of `tags`, or directly under the
// document with no element parent at all
fn has_hidden_ancestor<'a>(ancestors: impl Iterator<Item = &'a Node>, tags: &[&str]) -> bool {
    let mut saw_element = false;
    for ancestor in ancestors {
        if let Some(element) = ancestor.as_element() {
            saw_element = true;
            if tags.contains(&element.name()) {
                return true;
            }
        }
    }
    !saw_element
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_skips_hidden_elements() {
        let html = r#"
            <html>
              <head><title>Title</title><style>p { color: red }</style></head>
              <body>
                <!-- a comment -->
                <p>Hello</p>
                <script>var x = 1;</script>
                <div>World</div>
              </body>
            </html>
        "#;
        assert_eq!(visible_text(html), "Hello World");
    }

    #[test]
    fn test_visible_text_length_is_char_count() {
        let html = format!("<html><body><p>{}</p></body></html>", "a".repeat(1999));
        assert_eq!(visible_text(&html).chars().count(), 1999);
    }

    #[test]
    fn test_clean_page_text_drops_boilerplate() {
        let html = r#"
            <html><body>
              <header>Site header</header>
              <nav><a href="/">Home</a></nav>
              <main><h1>Article</h1><p>Body text, with <a href="/x">a link</a> inside.</p></main>
              <button>Click</button>
              <footer>Copyright</footer>
            </body></html>
        "#;
        assert_eq!(clean_page_text(html), "Article Body text with inside");
    }

    #[test]
    fn test_clean_text_removes_punctuation_and_whitespace() {
        assert_eq!(clean_text("Hello,   world!\n\nIt's  me."), "Hello world Its me");
        assert_eq!(clean_text("snake_case stays"), "snake_case stays");
        assert_eq!(clean_text("   "), "");
    }
}
