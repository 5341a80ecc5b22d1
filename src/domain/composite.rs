//! Composite command expansion
//!
//! Composite commands reference other commands by id. Expanding them yields a
//! directed graph with one edge per (composite, child) pair. The source data is
//! a list, so nothing stops a document from describing a cycle: the whole
//! command set is validated before a single edge is added.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::command::Command;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    #[error("Composite commands form a cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("Composite command {parent} references unknown command {child}")]
    UnknownChild { parent: String, child: String },

    #[error("Duplicate command id: {0}")]
    DuplicateCommand(String),

    #[error("Command not found: {0}")]
    NotFound(String),
}

/// How a composite runs its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Sequential,
    Parallel,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel => "parallel",
        }
    }
}

/// An edge from a composite to one of its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeLink {
    pub parent: String,
    pub child: String,
    /// Zero-based position among the parent's children
    pub position: usize,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone)]
struct CommandNode {
    id: String,
    /// Set for composites only
    mode: Option<ExecutionMode>,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    position: usize,
    mode: ExecutionMode,
}

/// Graph of composite commands and the commands they run
///
/// Every command of the expanded set is a node; edges point from a composite
/// to its children. Edges are stored in the order expansion produced them.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<CommandNode, Link>,
    node_map: HashMap<String, NodeIndex>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnPath,
    Done,
}

/// Expands every composite of `commands` into a [`DependencyGraph`]
pub fn expand_composite(commands: &[Command]) -> Result<DependencyGraph, ExpandError> {
    let mut by_id: HashMap<&str, &Command> = HashMap::with_capacity(commands.len());
    for command in commands {
        if by_id.insert(command.id.as_str(), command).is_some() {
            return Err(ExpandError::DuplicateCommand(command.id.clone()));
        }
    }

    for command in commands {
        for child in command.children() {
            if !by_id.contains_key(child.as_str()) {
                return Err(ExpandError::UnknownChild {
                    parent: command.id.clone(),
                    child: child.clone(),
                });
            }
        }
    }

    // Validation pass: runs to completion before any edge exists
    let mut marks = HashMap::new();
    let mut path = Vec::new();
    for command in commands.iter().filter(|c| c.is_composite()) {
        find_cycle(&command.id, &by_id, &mut marks, &mut path)?;
    }

    let mut graph = DependencyGraph::new();
    for command in commands {
        graph.add_command(command);
    }

    let mut expanded = HashSet::new();
    for command in commands.iter().filter(|c| c.is_composite()) {
        graph.expand(command, &by_id, &mut expanded);
    }

    debug!(
        commands = graph.len(),
        links = graph.graph.edge_count(),
        "expanded composite commands"
    );
    Ok(graph)
}

fn find_cycle<'a>(
    id: &'a str,
    by_id: &HashMap<&'a str, &'a Command>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Result<(), ExpandError> {
    match marks.get(id) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::OnPath) => {
            let start = path.iter().position(|p| *p == id).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|p| p.to_string()).collect();
            cycle.push(id.to_string());
            return Err(ExpandError::Cycle(cycle));
        }
        None => {}
    }

    marks.insert(id, Mark::OnPath);
    path.push(id);
    if let Some(command) = by_id.get(id) {
        for child in command.children() {
            find_cycle(child, by_id, marks, path)?;
        }
    }
    path.pop();
    marks.insert(id, Mark::Done);
    Ok(())
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    fn add_command(&mut self, command: &Command) {
        let mode = match (command.is_composite(), command.is_parallel()) {
            (false, _) => None,
            (true, true) => Some(ExecutionMode::Parallel),
            (true, false) => Some(ExecutionMode::Sequential),
        };
        let idx = self.graph.add_node(CommandNode {
            id: command.id.clone(),
            mode,
        });
        self.node_map.insert(command.id.clone(), idx);
    }

    /// Adds the edges of `command`, then expands its composite children
    fn expand<'a>(
        &mut self,
        command: &'a Command,
        by_id: &HashMap<&'a str, &'a Command>,
        expanded: &mut HashSet<&'a str>,
    ) {
        if !expanded.insert(command.id.as_str()) {
            return;
        }

        let mode = if command.is_parallel() {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        };
        let parent = self.node_map[&command.id];
        for (position, child) in command.children().iter().enumerate() {
            let child_idx = self.node_map[child];
            self.graph.add_edge(parent, child_idx, Link { position, mode });
        }

        for child in command.children() {
            if let Some(child_cmd) = by_id.get(child.as_str()) {
                if child_cmd.is_composite() {
                    self.expand(child_cmd, by_id, expanded);
                }
            }
        }
    }

    /// All links in expansion order
    pub fn links(&self) -> Vec<CompositeLink> {
        self.graph
            .edge_references()
            .map(|edge| CompositeLink {
                parent: self.graph[edge.source()].id.clone(),
                child: self.graph[edge.target()].id.clone(),
                position: edge.weight().position,
                mode: edge.weight().mode,
            })
            .collect()
    }

    /// Direct children of a command in declared order
    pub fn children(&self, id: &str) -> Vec<String> {
        let Some(&idx) = self.node_map.get(id) else {
            return vec![];
        };

        let mut children: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.weight().position, self.graph[edge.target()].id.clone()))
            .collect();
        children.sort_by_key(|(position, _)| *position);
        children.into_iter().map(|(_, id)| id).collect()
    }

    /// Composites that run the given command
    pub fn parents(&self, id: &str) -> Vec<String> {
        let Some(&idx) = self.node_map.get(id) else {
            return vec![];
        };

        let mut parents: Vec<_> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|p| self.graph[p].id.clone())
            .collect();
        parents.sort();
        parents.dedup();
        parents
    }

    /// Every command reachable from `roots`, roots included
    pub fn reachable_from<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        let mut reachable = BTreeSet::new();
        for root in roots {
            let Some(&start) = self.node_map.get(root) else {
                continue;
            };
            let mut dfs = Dfs::new(&self.graph, start);
            while let Some(idx) = dfs.next(&self.graph) {
                reachable.insert(self.graph[idx].id.clone());
            }
        }
        reachable
    }

    /// Flattens a command into ordered stages of leaf commands
    ///
    /// Stages run one after another; the commands inside one stage run at the
    /// same time. A parallel composite merges its children's stages index by
    /// index, a sequential one concatenates them.
    pub fn execution_stages(&self, id: &str) -> Result<Vec<Vec<String>>, ExpandError> {
        let idx = *self
            .node_map
            .get(id)
            .ok_or_else(|| ExpandError::NotFound(id.to_string()))?;
        Ok(self.stages_of(idx))
    }

    fn stages_of(&self, idx: NodeIndex) -> Vec<Vec<String>> {
        let node = &self.graph[idx];
        let Some(mode) = node.mode else {
            return vec![vec![node.id.clone()]];
        };

        let mut stages: Vec<Vec<String>> = Vec::new();
        for child in self.children(&node.id) {
            let child_stages = self.stages_of(self.node_map[&child]);
            match mode {
                ExecutionMode::Sequential => stages.extend(child_stages),
                ExecutionMode::Parallel => {
                    for (i, stage) in child_stages.into_iter().enumerate() {
                        match stages.get_mut(i) {
                            Some(existing) => existing.extend(stage),
                            None => stages.push(stage),
                        }
                    }
                }
            }
        }
        stages
    }

    /// Number of commands in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}
