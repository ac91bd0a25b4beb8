//! Markup serialization of document subtrees.

use quick_xml::escape::{escape, partial_escape};

use super::document::{Arena, NodeData};
use super::parse::is_void_element;
use super::NodeId;

pub(super) fn write_children(arena: &Arena, id: NodeId, out: &mut String) {
    if let Some(node) = arena.get(id) {
        for child in &node.children {
            write_node(arena, *child, out);
        }
    }
}

pub(super) fn write_node(arena: &Arena, id: NodeId, out: &mut String) {
    let Some(node) = arena.get(id) else {
        return;
    };

    match &node.data {
        NodeData::Text(text) => out.push_str(&partial_escape(text.as_str())),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Fragment => write_children(arena, id, out),
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value.as_str()));
                out.push('"');
            }
            out.push('>');

            if is_void_element(&element.tag) {
                return;
            }
            write_children(arena, id, out);
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}
