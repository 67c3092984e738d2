//! Load balance and edge-cut scoring.
//!
//! `waste` measures how far the partition loads are from perfectly even:
//!
//! ```text
//! balance[p] = load[p] / n
//! waste      = Σ_p (max(balance) - balance[p])
//! ```
//!
//! It is zero exactly when every partition carries the same load, and largest
//! when one partition holds everything.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::population::{check_assignment, partition_population};
use std::collections::HashSet;

/// Result of [`score`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BalanceScore {
    /// Total deviation from an even load.
    pub waste: f64,
    /// `cut_count / edge_count`, 0.0 on a graph without edges.
    pub cut_ratio: f64,
    /// Number of undirected edges whose endpoints are in different partitions.
    pub cut_count: usize,
}

/// Waste and edge cut of a complete assignment.
///
/// With `num_partitions`, loads are node-weight sums per partition (empty
/// partitions included) divided by the node count. Without it, the partition
/// count is `max(assignment) + 1` and loads are plain node counts.
///
/// Every label must be non-negative; an unassigned node is a caller error here.
pub fn score(
    graph: &Graph,
    assignment: &[i64],
    num_partitions: Option<usize>,
) -> Result<BalanceScore> {
    let n = graph.node_count();
    let balance: Vec<f64> = match num_partitions {
        Some(k) => {
            check_assignment(assignment, n, k, false)?;
            let population = partition_population(graph, assignment, k)?;
            population
                .weights()
                .iter()
                .map(|&w| if n > 0 { w / n as f64 } else { w })
                .collect()
        }
        None => {
            let k = inferred_partitions(assignment, n)?;
            let mut counts = vec![0usize; k];
            for &label in assignment {
                counts[label as usize] += 1;
            }
            counts
                .into_iter()
                .map(|c| c as f64 / assignment.len() as f64)
                .collect()
        }
    };

    let max = balance.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let waste = if balance.is_empty() {
        0.0
    } else {
        balance.iter().map(|b| max - b).sum::<f64>()
    };

    let cut_count = graph
        .edges()
        .filter(|&(u, v, _)| assignment[u] != assignment[v])
        .count();
    let cut_ratio = if graph.edge_count() > 0 {
        cut_count as f64 / graph.edge_count() as f64
    } else {
        0.0
    };

    tracing::debug!(waste, cut_ratio, cut_count, "balance score");
    Ok(BalanceScore {
        waste,
        cut_ratio,
        cut_count,
    })
}

fn inferred_partitions(assignment: &[i64], num_nodes: usize) -> Result<usize> {
    if assignment.len() != num_nodes {
        return Err(Error::LengthMismatch {
            expected: num_nodes,
            found: assignment.len(),
        });
    }
    if let Some((index, &label)) = assignment.iter().enumerate().find(|&(_, &l)| l < 0) {
        return Err(Error::LabelOutOfRange {
            index,
            label,
            num_partitions: 0,
        });
    }
    Ok(assignment.iter().max().map_or(0, |&m| m as usize + 1))
}

/// Edge cut plus communication steps.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommunicationMetrics {
    /// Undirected cut edges, each counted once.
    pub edges_cut: usize,
    /// Σ over nodes of the number of distinct foreign partitions among its neighbors.
    pub steps: usize,
    /// Cut edges as `(u, v)`, in the order first met scanning nodes and neighbors ascending.
    pub cut_edges: Vec<(usize, usize)>,
}

/// Count cut edges and the communication steps a partition implies.
///
/// A step is one message from a node to a foreign partition that holds at
/// least one of its neighbors.
pub fn communication_metrics(graph: &Graph, assignment: &[i64]) -> Result<CommunicationMetrics> {
    if assignment.len() != graph.node_count() {
        return Err(Error::LengthMismatch {
            expected: graph.node_count(),
            found: assignment.len(),
        });
    }

    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut metrics = CommunicationMetrics {
        edges_cut: 0,
        steps: 0,
        cut_edges: Vec::new(),
    };

    for node in 0..graph.node_count() {
        let mut neighbors: Vec<usize> = graph.neighbors(node).map(|(v, _)| v).collect();
        neighbors.sort_unstable();

        let mut partitions_seen: HashSet<i64> = HashSet::new();
        for right in neighbors {
            let right_partition = assignment[right];
            if assignment[node] == right_partition {
                continue;
            }
            if seen.insert((node.min(right), node.max(right))) {
                metrics.edges_cut += 1;
                metrics.cut_edges.push((node, right));
            }
            if partitions_seen.insert(right_partition) {
                metrics.steps += 1;
            }
        }
    }

    Ok(metrics)
}
