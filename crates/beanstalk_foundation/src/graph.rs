//! Directed graph over `u32` node ids with bitset adjacency.

use std::collections::HashMap;

use crate::bitset::Bitset;

/// A directed graph. Nodes are dense ids (typically storage row ids).
#[derive(Clone, Debug, Default)]
pub struct Directed {
    nodes: Bitset,
    successors: HashMap<u32, Bitset>,
    predecessors: HashMap<u32, Bitset>,
    roots: Bitset,
}

impl Directed {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, returning true if it was new.
    pub fn add_node(&mut self, node: u32) -> bool {
        self.nodes.set(node)
    }

    /// Connects `origin -> destination`, adding either node if missing.
    ///
    /// Returns true if the edge was new.
    pub fn add_edge(&mut self, origin: u32, destination: u32) -> bool {
        self.add_node(origin);
        self.add_node(destination);
        self.predecessors
            .entry(destination)
            .or_default()
            .set(origin);
        self.successors.entry(origin).or_default().set(destination)
    }

    /// Marks `node` as an exploration root.
    pub fn add_root(&mut self, node: u32) {
        self.add_node(node);
        self.roots.set(node);
    }

    /// Returns true if `node` is in the graph.
    #[must_use]
    pub fn contains(&self, node: u32) -> bool {
        self.nodes.is_set(node)
    }

    /// Returns true if `origin -> destination` exists.
    #[must_use]
    pub fn has_edge(&self, origin: u32, destination: u32) -> bool {
        self.successors
            .get(&origin)
            .is_some_and(|s| s.is_set(destination))
    }

    /// Nodes reachable by one edge from `node`.
    #[must_use]
    pub fn successors(&self, node: u32) -> Bitset {
        self.successors.get(&node).cloned().unwrap_or_default()
    }

    /// Nodes with an edge into `node`.
    #[must_use]
    pub fn predecessors(&self, node: u32) -> Bitset {
        self.predecessors.get(&node).cloned().unwrap_or_default()
    }

    /// All nodes.
    #[must_use]
    pub fn nodes(&self) -> &Bitset {
        &self.nodes
    }

    /// Root nodes.
    #[must_use]
    pub fn roots(&self) -> &Bitset {
        &self.roots
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.successors.values().map(Bitset::len).sum()
    }
}
