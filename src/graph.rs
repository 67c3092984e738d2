//! Undirected graph with optional node and edge weights.
//!
//! Node ids are `0..n` with no gaps. A missing weight (node or edge) reads as
//! [`DEFAULT_WEIGHT`]; the raw `Option` is kept so that the modularity
//! correction pass can tell "explicitly zero" from "absent".
//!
//! The graph is simple: inserting an edge that already exists updates its
//! weight instead of adding a parallel edge.

use crate::error::{Error, Result};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Weight used for nodes and edges that carry no explicit weight.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Undirected weighted graph backed by a petgraph `UnGraph`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: UnGraph<Option<f64>, Option<f64>>,
}

/// A graph induced on a subset of nodes, with the mapping back to the parent ids.
#[derive(Debug, Clone)]
pub struct Subgraph {
    /// The induced graph, nodes renumbered `0..nodes.len()`.
    pub graph: Graph,
    /// `nodes[local] = original id`, ascending.
    pub nodes: Vec<usize>,
}

impl Graph {
    /// Graph with `num_nodes` unweighted nodes and no edges.
    pub fn new(num_nodes: usize) -> Self {
        let mut inner = UnGraph::with_capacity(num_nodes, 0);
        for _ in 0..num_nodes {
            inner.add_node(None);
        }
        Self { inner }
    }

    /// Graph with unit-weight edges (weights left unset).
    pub fn from_edges(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut graph = Self::new(num_nodes);
        for &(u, v) in edges {
            graph.add_edge(u, v)?;
        }
        Ok(graph)
    }

    /// Graph with explicit edge weights.
    pub fn from_weighted_edges(num_nodes: usize, edges: &[(usize, usize, f64)]) -> Result<Self> {
        let mut graph = Self::new(num_nodes);
        for &(u, v, w) in edges {
            graph.add_weighted_edge(u, v, w)?;
        }
        Ok(graph)
    }

    /// Graph from a symmetric edge list such as [`crate::dedup::to_undirected`] produces.
    ///
    /// Each `(u, v)` / `(v, u)` pair collapses into one undirected edge.
    pub fn from_undirected_edges(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        Self::from_edges(num_nodes, edges)
    }

    /// Add an edge without an explicit weight.
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<()> {
        self.insert(u, v, None)
    }

    /// Add an edge with an explicit weight.
    pub fn add_weighted_edge(&mut self, u: usize, v: usize, weight: f64) -> Result<()> {
        self.insert(u, v, Some(weight))
    }

    fn insert(&mut self, u: usize, v: usize, weight: Option<f64>) -> Result<()> {
        self.check_node(u)?;
        self.check_node(v)?;
        self.inner
            .update_edge(NodeIndex::new(u), NodeIndex::new(v), weight);
        Ok(())
    }

    fn check_node(&self, node: usize) -> Result<()> {
        if node >= self.node_count() {
            return Err(Error::NodeOutOfRange {
                node: node as i64,
                num_nodes: self.node_count(),
            });
        }
        Ok(())
    }

    /// Set the weight of a node.
    pub fn set_node_weight(&mut self, node: usize, weight: f64) -> Result<()> {
        self.check_node(node)?;
        if let Some(w) = self.inner.node_weight_mut(NodeIndex::new(node)) {
            *w = Some(weight);
        }
        Ok(())
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Weight of a node, [`DEFAULT_WEIGHT`] when unset or out of range.
    pub fn node_weight(&self, node: usize) -> f64 {
        self.inner
            .node_weight(NodeIndex::new(node))
            .copied()
            .flatten()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    /// Number of incident edges.
    pub fn degree(&self, node: usize) -> usize {
        if node >= self.node_count() {
            return 0;
        }
        self.inner.edges(NodeIndex::new(node)).count()
    }

    /// Neighbors of `node` with the (defaulted) weight of the connecting edge.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let idx = NodeIndex::new(node);
        let edges = (node < self.node_count()).then(|| self.inner.edges(idx));
        edges.into_iter().flatten().map(move |e| {
            let other = if e.source() == idx { e.target() } else { e.source() };
            (other.index(), e.weight().unwrap_or(DEFAULT_WEIGHT))
        })
    }

    /// Every undirected edge once, as `(u, v, weight)` with defaulted weight.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.inner.edge_references().map(|e| {
            (
                e.source().index(),
                e.target().index(),
                e.weight().unwrap_or(DEFAULT_WEIGHT),
            )
        })
    }

    /// Sum of (defaulted) edge weights, each undirected edge counted once.
    pub fn total_edge_weight(&self) -> f64 {
        self.edges().map(|(_, _, w)| w).sum()
    }

    /// Set every edge whose explicit weight is `0.0` to `1.0`.
    ///
    /// Returns the number of edges changed.
    pub fn fill_zero_edge_weights(&mut self) -> usize {
        let mut changed = 0;
        for w in self.inner.edge_weights_mut() {
            if *w == Some(0.0) {
                *w = Some(1.0);
                changed += 1;
            }
        }
        changed
    }

    /// Graph induced on `nodes` (duplicates ignored), renumbered in ascending id order.
    pub fn induced_subgraph(&self, nodes: &[usize]) -> Result<Subgraph> {
        let n = self.node_count();
        let mut members: Vec<usize> = nodes.to_vec();
        members.sort_unstable();
        members.dedup();
        if let Some(&bad) = members.last().filter(|&&last| last >= n) {
            return Err(Error::NodeOutOfRange {
                node: bad as i64,
                num_nodes: n,
            });
        }

        let mut local = vec![usize::MAX; n];
        let mut inner = UnGraph::with_capacity(members.len(), 0);
        for (i, &node) in members.iter().enumerate() {
            local[node] = i;
            inner.add_node(self.inner[NodeIndex::new(node)]);
        }
        for e in self.inner.edge_references() {
            let (a, b) = (local[e.source().index()], local[e.target().index()]);
            if a != usize::MAX && b != usize::MAX {
                inner.add_edge(NodeIndex::new(a), NodeIndex::new(b), *e.weight());
            }
        }

        Ok(Subgraph {
            graph: Graph { inner },
            nodes: members,
        })
    }
}
