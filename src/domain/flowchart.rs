//! Mermaid flowchart rendering
//!
//! Output is a pure function of the graph: the entry node first, the other
//! nodes sorted by id, then the edges in the order they were added.
//!
//! Mermaid reserves words such as `end`, so command ids are emitted with a
//! `id_` prefix and only appear verbatim inside labels.

use std::fmt::Write;

use super::graph::{Graph, Node};

/// First line of every flowchart
pub const HEADER: &str = "graph TB";

/// Joins the text lines of a label
pub const LINE_BREAK: &str = "<br/>";

/// Renders a graph as a Mermaid flowchart
pub fn render_flowchart(graph: &Graph) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    if let Some(entry) = graph.entry_node() {
        push_node(&mut out, entry);
    }
    for node in graph.nodes().filter(|n| n.id != graph.entry_node_id()) {
        push_node(&mut out, node);
    }

    for edge in graph.edges() {
        if edge.text_lines.is_empty() {
            let _ = writeln!(out, "    {} --> {}", node_key(&edge.from), node_key(&edge.to));
        } else {
            let _ = writeln!(
                out,
                "    {} -->|\"{}\"| {}",
                node_key(&edge.from),
                join_lines(&edge.text_lines),
                node_key(&edge.to)
            );
        }
    }

    out
}

fn push_node(out: &mut String, node: &Node) {
    let label = if node.text_lines.is_empty() {
        escape(&node.id)
    } else {
        join_lines(&node.text_lines)
    };
    let _ = writeln!(out, "    {}[\"{}\"]", node_key(&node.id), label);
}

/// Mermaid node identifier for a command id
fn node_key(id: &str) -> String {
    format!("id_{}", id)
}

fn join_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| escape(line))
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

fn escape(text: &str) -> String {
    text.replace('"', "#quot;")
}
