//! Domain models for devstate
//!
//! Contains the command engine without any I/O concerns: grouping, moves,
//! composite expansion and flowchart rendering.

mod group;
mod command;
mod mover;
mod composite;
mod graph;
mod flowchart;

pub use group::{GroupKind, GroupParseError};
pub use command::{group_commands, Command, CommandKind, GroupedCommandSet};
pub use mover::{move_command, move_command_with, DestinationPolicy, Move, MoveError};
pub use composite::{expand_composite, CompositeLink, DependencyGraph, ExecutionMode, ExpandError};
pub use graph::{build_graph, Edge, Graph, GraphError, LabelOverrides, Node};
pub use flowchart::{render_flowchart, HEADER, LINE_BREAK};
