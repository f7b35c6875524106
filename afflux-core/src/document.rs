//! Rich-text document tree.
//!
//! Articles are stored as a TipTap-compatible JSON tree: every node carries a
//! `type`, optional `attrs`, optional `content` children, optional leaf `text`
//! and optional formatting `marks`. The generic shape (rather than a closed
//! enum) is deliberate: the rendering side of the CMS may grow node types this
//! crate has never heard of, and round-tripping must not drop them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

type Attrs = Map<String, JsonValue>;

/// A complete document: the root `doc` node with its block children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Vec<Node>,
}

/// One node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Node>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,
}

/// An inline formatting mark (bold, italic, link, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
}

impl Mark {
    pub fn bold() -> Self {
        Mark {
            kind: "bold".to_string(),
            attrs: None,
        }
    }

    pub fn italic() -> Self {
        Mark {
            kind: "italic".to_string(),
            attrs: None,
        }
    }

    pub fn link(href: &str) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("href".to_string(), json!(href));
        Mark {
            kind: "link".to_string(),
            attrs: Some(attrs),
        }
    }
}

impl Node {
    fn leaf(kind: &str) -> Self {
        Node {
            kind: kind.to_string(),
            attrs: None,
            content: None,
            text: None,
            marks: None,
        }
    }

    /// A plain text leaf.
    pub fn text(text: &str) -> Self {
        let mut node = Node::leaf("text");
        node.text = Some(text.to_string());
        node
    }

    /// A text leaf with formatting marks.
    pub fn marked_text(text: &str, marks: Vec<Mark>) -> Self {
        let mut node = Node::text(text);
        node.marks = Some(marks);
        node
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        let mut node = Node::leaf("paragraph");
        node.content = Some(content);
        node
    }

    pub fn heading(level: u8, text: &str) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("level".to_string(), json!(level));
        let mut node = Node::leaf("heading");
        node.attrs = Some(attrs);
        node.content = Some(vec![Node::text(text)]);
        node
    }

    pub fn bullet_list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::list("bulletList", items)
    }

    pub fn ordered_list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::list("orderedList", items)
    }

    fn list<I>(kind: &str, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let items = items
            .into_iter()
            .map(|item| {
                let mut li = Node::leaf("listItem");
                li.content = Some(vec![Node::paragraph(vec![Node::text(item.as_ref())])]);
                li
            })
            .collect();
        let mut node = Node::leaf(kind);
        node.content = Some(items);
        node
    }

    pub fn image(src: &str, alt: &str) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("src".to_string(), json!(src));
        attrs.insert("alt".to_string(), json!(alt));
        let mut node = Node::leaf("image");
        node.attrs = Some(attrs);
        node
    }

    /// A blockquote containing a single italicised paragraph.
    pub fn blockquote(text: &str) -> Self {
        let mut node = Node::leaf("blockquote");
        node.content = Some(vec![Node::paragraph(vec![Node::marked_text(
            text,
            vec![Mark::italic()],
        )])]);
        node
    }

    /// A table with a header row followed by data rows. Every cell holds a
    /// single paragraph of plain text.
    pub fn table(header: &[&str], rows: &[Vec<String>]) -> Self {
        fn cell(kind: &str, text: &str) -> Node {
            let mut cell = Node::leaf(kind);
            cell.content = Some(vec![Node::paragraph(vec![Node::text(text)])]);
            cell
        }
        fn row(cells: Vec<Node>) -> Node {
            let mut row = Node::leaf("tableRow");
            row.content = Some(cells);
            row
        }

        let mut all_rows = Vec::with_capacity(rows.len() + 1);
        all_rows.push(row(header
            .iter()
            .map(|text| cell("tableHeader", text))
            .collect()));
        for data in rows {
            all_rows.push(row(data
                .iter()
                .map(|text| cell("tableCell", text))
                .collect()));
        }

        let mut node = Node::leaf("table");
        node.content = Some(all_rows);
        node
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            if !out.is_empty() && !out.ends_with(char::is_whitespace) {
                out.push(' ');
            }
            out.push_str(text);
        }
        if let Some(children) = &self.content {
            for child in children {
                child.collect_text(out);
            }
        }
    }
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Document {
            kind: "doc".to_string(),
            content,
        }
    }

    /// True when the root is a well-formed `doc` node.
    pub fn is_well_formed(&self) -> bool {
        self.kind == "doc"
    }

    /// Concatenated textual leaf content, whitespace-separated.
    ///
    /// Only `text` leaves contribute; markup, attrs and image alt text are
    /// excluded so word counts reflect readable prose rather than the size of
    /// the serialized tree.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.content {
            node.collect_text(&mut out);
        }
        out
    }

    /// Prose word count, from the extracted text.
    pub fn word_count(&self) -> usize {
        self.plain_text().split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_carries_level_attr() {
        let node = Node::heading(2, "Pricing");
        assert_eq!(node.kind, "heading");
        assert_eq!(node.attrs.as_ref().unwrap()["level"], json!(2));
        assert_eq!(node.content.as_ref().unwrap()[0].text.as_deref(), Some("Pricing"));
    }

    #[test]
    fn serialization_round_trips() {
        let doc = Document::new(vec![
            Node::heading(2, "Overview"),
            Node::paragraph(vec![
                Node::text("Try "),
                Node::marked_text("this tool", vec![Mark::link("https://example.com")]),
                Node::marked_text(" now", vec![Mark::bold(), Mark::italic()]),
            ]),
            Node::bullet_list(["one", "two"]),
            Node::image("https://example.com/a.jpg", "A screenshot"),
            Node::blockquote("Choose wisely."),
            Node::table(&["Tool", "Price"], &[vec!["X".to_string(), "$5".to_string()]]),
        ]);

        let json = serde_json::to_string(&doc).unwrap();
        let parsed: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn serialized_shape_matches_renderer_contract() {
        let doc = Document::new(vec![Node::paragraph(vec![Node::marked_text(
            "hi",
            vec![Mark::link("https://x.test")],
        )])]);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["type"], "doc");
        assert_eq!(value["content"][0]["type"], "paragraph");
        assert_eq!(
            value["content"][0]["content"][0]["marks"][0]["attrs"]["href"],
            "https://x.test"
        );
        // Absent fields must not serialize as nulls.
        assert!(value["content"][0]["content"][0]
            .as_object()
            .unwrap()
            .get("attrs")
            .is_none());
    }

    #[test]
    fn word_count_ignores_markup() {
        let doc = Document::new(vec![
            Node::heading(2, "Two words"),
            Node::paragraph(vec![Node::text("three more words here")]),
            Node::image("https://example.com/a.jpg", "alt text does not count"),
        ]);
        assert_eq!(doc.word_count(), 6);
    }

    #[test]
    fn unknown_node_types_survive_round_trip() {
        let raw = r#"{"type":"doc","content":[{"type":"horizontalRule"},{"type":"codeBlock","attrs":{"language":"rust"},"content":[{"type":"text","text":"fn main() {}"}]}]}"#;
        let parsed: Document = serde_json::from_str(raw).unwrap();
        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back, serde_json::from_str::<JsonValue>(raw).unwrap());
    }
}
