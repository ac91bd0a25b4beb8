//! Graph Nodes
//!
//! This module defines the node types that live in the dependency graph.

use indexmap::IndexSet;

use crate::reactive::{CellId, SubscriberId};

/// Identity of a node in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphKey {
    Cell(CellId),
    Subscription(SubscriberId),
}

impl GraphKey {
    pub fn kind(&self) -> NodeKind {
        match self {
            GraphKey::Cell(_) => NodeKind::Cell,
            GraphKey::Subscription(_) => NodeKind::Subscription,
        }
    }
}

impl From<CellId> for GraphKey {
    fn from(id: CellId) -> Self {
        GraphKey::Cell(id)
    }
}

impl From<SubscriberId> for GraphKey {
    fn from(id: SubscriberId) -> Self {
        GraphKey::Subscription(id)
    }
}

/// The kind of node in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A reactive cell. Cells have dependents but no dependencies.
    Cell,

    /// A binding's subscription. Subscriptions have dependencies but no
    /// dependents (they produce side effects, not values).
    Subscription,
}

/// A node in the dependency graph.
#[derive(Debug)]
pub struct GraphNode {
    key: GraphKey,

    /// Cells this node reads from. Empty for cells.
    dependencies: IndexSet<GraphKey>,

    /// Subscriptions that read from this node. Empty for subscriptions.
    dependents: IndexSet<GraphKey>,
}

impl GraphNode {
    pub fn new(key: GraphKey) -> Self {
        Self {
            key,
            dependencies: IndexSet::new(),
            dependents: IndexSet::new(),
        }
    }

    pub fn key(&self) -> GraphKey {
        self.key
    }

    pub fn kind(&self) -> NodeKind {
        self.key.kind()
    }

    /// Add a dependency (a node that this node reads from).
    pub fn add_dependency(&mut self, key: GraphKey) -> bool {
        self.dependencies.insert(key)
    }

    /// Add a dependent (a node that reads from this node).
    pub fn add_dependent(&mut self, key: GraphKey) -> bool {
        self.dependents.insert(key)
    }

    /// Get all dependencies, in recording order.
    pub fn dependencies(&self) -> &IndexSet<GraphKey> {
        &self.dependencies
    }

    /// Get all dependents, in registration order.
    pub fn dependents(&self) -> &IndexSet<GraphKey> {
        &self.dependents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_kind_follows_variant() {
        assert_eq!(GraphKey::from(CellId::new()).kind(), NodeKind::Cell);
        assert_eq!(GraphKey::from(SubscriberId::new()).kind(), NodeKind::Subscription);
    }

    #[test]
    fn edges_are_sets() {
        let mut node = GraphNode::new(SubscriberId::new().into());
        let dep1 = GraphKey::from(CellId::new());
        let dep2 = GraphKey::from(CellId::new());

        assert!(node.add_dependency(dep1));
        assert!(node.add_dependency(dep2));
        assert!(!node.add_dependency(dep1));
        assert_eq!(node.dependencies().len(), 2);
        assert!(node.dependents().is_empty());
    }
}
