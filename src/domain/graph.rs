//! Command graph for the flowchart view
//!
//! A [`Graph`] holds one node per command reachable from the lifecycle groups
//! (and the entry command), and one edge per composite/child link.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use thiserror::Error;

use super::command::Command;
use super::composite::{expand_composite, ExpandError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Entry command not found: {0}")]
    UnknownEntry(String),

    #[error("Edge references unknown node: {0}")]
    UnknownNode(String),

    #[error(transparent)]
    Expand(#[from] ExpandError),
}

/// Caller-supplied node labels, keyed by command id
pub type LabelOverrides = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub text_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub text_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graph {
    entry_node_id: String,
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Creates a graph holding only its entry node
    pub fn new(entry_node_id: impl Into<String>, entry_lines: Vec<String>) -> Self {
        let entry_node_id = entry_node_id.into();
        let mut nodes = BTreeMap::new();
        nodes.insert(
            entry_node_id.clone(),
            Node {
                id: entry_node_id.clone(),
                text_lines: entry_lines,
            },
        );
        Self {
            entry_node_id,
            nodes,
            edges: Vec::new(),
        }
    }

    /// Adds a node, replacing the labels of an existing one
    pub fn add_node(&mut self, id: impl Into<String>, text_lines: Vec<String>) {
        let id = id.into();
        self.nodes.insert(id.clone(), Node { id, text_lines });
    }

    /// Adds an edge between two existing nodes
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        text_lines: Vec<String>,
    ) -> Result<(), GraphError> {
        let from = from.into();
        let to = to.into();
        for endpoint in [&from, &to] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::UnknownNode(endpoint.clone()));
            }
        }
        self.edges.push(Edge {
            from,
            to,
            text_lines,
        });
        Ok(())
    }

    pub fn entry_node_id(&self) -> &str {
        &self.entry_node_id
    }

    pub fn entry_node(&self) -> Option<&Node> {
        self.nodes.get(&self.entry_node_id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in ascending id order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Builds the flowchart graph of a command set
///
/// Nodes are the grouped commands, the entry command, and everything their
/// composites reach. Labels default to the command id unless `labels` has an
/// entry for it.
pub fn build_graph(
    commands: &[Command],
    entry_id: &str,
    labels: &LabelOverrides,
) -> Result<Graph, GraphError> {
    if !commands.iter().any(|c| c.id == entry_id) {
        return Err(GraphError::UnknownEntry(entry_id.to_string()));
    }

    let deps = expand_composite(commands)?;

    let roots = commands
        .iter()
        .filter(|c| !c.group.is_none())
        .map(|c| c.id.as_str())
        .chain(std::iter::once(entry_id));
    let reachable = deps.reachable_from(roots);

    let label_for = |id: &str| {
        labels
            .get(id)
            .cloned()
            .unwrap_or_else(|| vec![id.to_string()])
    };

    let mut graph = Graph::new(entry_id, label_for(entry_id));
    for command in commands.iter().filter(|c| reachable.contains(&c.id)) {
        graph.add_node(command.id.clone(), label_for(&command.id));
    }

    for link in deps.links() {
        if !reachable.contains(&link.parent) {
            continue;
        }
        let text = vec![
            format!("#{}", link.position + 1),
            link.mode.as_str().to_string(),
        ];
        graph.add_edge(link.parent, link.child, text)?;
    }

    Ok(graph)
}
