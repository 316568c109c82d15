use core::fmt;

use super::{Dom, DomNode, NodeKind};
use crate::{Document as _, NodeKey};

use serde_json::{Map, Value, json};

fn sorted_attrs(node: &DomNode) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = node.attrs.iter().cloned().collect();
    pairs.sort_by(|left, right| left.0.cmp(&right.0));
    pairs
}

fn node_to_json(dom: &Dom, key: NodeKey) -> Value {
    let Some(node) = dom.node(key) else {
        return Value::Null;
    };
    match &node.kind {
        NodeKind::Document => json!({ "type": "document", "children": children_json(dom, key) }),
        NodeKind::Element { tag } => {
            let mut attrs = Map::new();
            for (name, value) in sorted_attrs(node) {
                attrs.insert(name, Value::String(value));
            }
            json!({
                "type": "element",
                "tag": tag,
                "attrs": Value::Object(attrs),
                "children": children_json(dom, key),
            })
        }
        NodeKind::Text { text } => {
            if text.trim().is_empty() {
                Value::Null
            } else {
                json!({ "type": "text", "text": text })
            }
        }
    }
}

fn children_json(dom: &Dom, key: NodeKey) -> Vec<Value> {
    dom.children(key)
        .into_iter()
        .map(|child| node_to_json(dom, child))
        .filter(|value| !value.is_null())
        .collect()
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

fn write_indent(fmt: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        fmt.write_str("  ")?;
    }
    Ok(())
}

fn fmt_node(dom: &Dom, key: NodeKey, fmt: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    let Some(node) = dom.node(key) else {
        return Ok(());
    };
    match &node.kind {
        NodeKind::Document => {
            write_indent(fmt, depth)?;
            writeln!(fmt, "#document")?;
        }
        NodeKind::Element { tag } => {
            write_indent(fmt, depth)?;
            write!(fmt, "<{tag}")?;
            for (name, value) in sorted_attrs(node) {
                write!(fmt, " {name}=\"{}\"", escape_text(&value))?;
            }
            writeln!(fmt, ">")?;
        }
        NodeKind::Text { text } => {
            // Whitespace-only runs are layout noise.
            if text.chars().all(char::is_whitespace) {
                return Ok(());
            }
            write_indent(fmt, depth)?;
            writeln!(fmt, "\"{}\"", escape_text(text))?;
            return Ok(());
        }
    }
    for child in dom.children(key) {
        fmt_node(dom, child, fmt, depth + 1)?;
    }
    if let NodeKind::Element { tag } = &node.kind {
        write_indent(fmt, depth)?;
        writeln!(fmt, "</{tag}>")?;
    }
    Ok(())
}

impl fmt::Debug for Dom {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(fmt, "DOM")?;
        fmt_node(self, NodeKey::ROOT, fmt, 0)
    }
}

impl Dom {
    /// Build a deterministic JSON representation of the document.
    /// Schema:
    /// - Document: { "type":"document", "children":[ ... ] }
    /// - Element: { "type":"element", "tag": "div", "attrs": {..}, "children":[ ... ] }
    /// - Text: { "type":"text", "text":"..." }
    pub fn to_json_value(&self) -> Value {
        node_to_json(self, NodeKey::ROOT)
    }

    /// Same schema as [`Dom::to_json_value`], rooted at `key`.
    pub fn subtree_json(&self, key: NodeKey) -> Value {
        node_to_json(self, key)
    }

    /// Pretty JSON string for snapshots and test comparisons.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json_value())
            .unwrap_or_else(|_| String::from("{}"))
    }
}
