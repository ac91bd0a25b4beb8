//! Dependency Graph
//!
//! This module keeps an explicit, bidirectional index of the dependency
//! relationships discovered at bind time.
//!
//! # Overview
//!
//! The graph is bipartite:
//!
//! - Cell nodes are reactive property slots
//! - Subscription nodes are bindings
//! - An edge from cell C to subscription S means S read C while recording
//!
//! Notification does not walk this graph; each cell's dependency set does
//! that. The graph answers the questions the dependency sets cannot:
//! "which cells does this binding depend on?" and "which bindings depend on
//! this cell?", without touching the cells themselves.

mod index;
mod node;

pub use index::DependencyGraph;
pub use node::{GraphKey, GraphNode, NodeKind};
