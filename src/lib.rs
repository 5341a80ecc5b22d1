//! devstate - edit devfile commands and chart how they run
//!
//! Commands of a devfile are bucketed by lifecycle group (build, run, test,
//! debug, deploy). devstate moves commands between and within groups, keeps
//! the default command of each group, expands composite commands into a
//! dependency graph, and renders that graph as a Mermaid flowchart.

pub mod domain;
pub mod devfile;
pub mod state;
pub mod storage;
pub mod cli;

pub use domain::{Command, CommandKind, GroupKind, GroupedCommandSet};
pub use state::{DevfileContent, DevfileState, StateError};
