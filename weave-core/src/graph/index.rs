//! Dependency Index
//!
//! Owns the graph nodes and keeps both edge directions consistent.

use indexmap::IndexMap;

use crate::reactive::{CellId, SubscriberId};

use super::node::{GraphKey, GraphNode};

/// Bidirectional cell/subscription index built from recordings.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// All nodes in the graph, indexed by key, in insertion order.
    nodes: IndexMap<GraphKey, GraphNode>,
}

impl DependencyGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `subscription` read each of `cells`.
    pub fn record(&mut self, subscription: SubscriberId, cells: impl IntoIterator<Item = CellId>) {
        self.node_mut(subscription.into());
        for cell in cells {
            self.add_edge(cell.into(), subscription.into());
        }
    }

    /// Add a dependency edge: `dependent` depends on `dependency`.
    pub fn add_edge(&mut self, dependency: GraphKey, dependent: GraphKey) {
        self.node_mut(dependency).add_dependent(dependent);
        self.node_mut(dependent).add_dependency(dependency);
    }

    pub fn get(&self, key: GraphKey) -> Option<&GraphNode> {
        self.nodes.get(&key)
    }

    /// Cells a subscription depends on.
    pub fn dependencies_of(&self, subscription: SubscriberId) -> Vec<CellId> {
        self.get(subscription.into())
            .map(|node| {
                node.dependencies()
                    .iter()
                    .filter_map(|key| match key {
                        GraphKey::Cell(id) => Some(*id),
                        GraphKey::Subscription(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Subscriptions that depend on a cell.
    pub fn dependents_of(&self, cell: CellId) -> Vec<SubscriberId> {
        self.get(cell.into())
            .map(|node| {
                node.dependents()
                    .iter()
                    .filter_map(|key| match key {
                        GraphKey::Subscription(id) => Some(*id),
                        GraphKey::Cell(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.dependencies().len()).sum()
    }

    fn node_mut(&mut self, key: GraphKey) -> &mut GraphNode {
        self.nodes.entry(key).or_insert_with(|| GraphNode::new(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_links_both_directions() {
        let mut graph = DependencyGraph::new();
        let sub = SubscriberId::new();
        let (a, b) = (CellId::new(), CellId::new());

        graph.record(sub, [a, b]);

        assert_eq!(graph.dependencies_of(sub), vec![a, b]);
        assert_eq!(graph.dependents_of(a), vec![sub]);
        assert_eq!(graph.dependents_of(b), vec![sub]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn shared_cells_collect_every_dependent() {
        let mut graph = DependencyGraph::new();
        let cell = CellId::new();
        let (s1, s2) = (SubscriberId::new(), SubscriberId::new());

        graph.record(s1, [cell]);
        graph.record(s2, [cell, cell]);

        assert_eq!(graph.dependents_of(cell), vec![s1, s2]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn subscription_without_reads_is_still_indexed() {
        let mut graph = DependencyGraph::new();
        let sub = SubscriberId::new();
        graph.record(sub, []);
        assert!(graph.get(sub.into()).is_some());
    }
}
