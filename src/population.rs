//! Partition populations: node counts and weight sums per partition.
//!
//! An assignment is a vector with one label per node. Labels are `0..k`, or
//! [`UNASSIGNED`] for nodes that have not arrived yet in a streaming run.
//! Unassigned nodes contribute to no partition.

use crate::error::{Error, Result};
use crate::graph::Graph;

/// Label of a node that has not been placed in any partition.
pub const UNASSIGNED: i64 = -1;

/// Per-partition `(node_count, weight_sum)`, indexed by partition id.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionPopulation {
    counts: Vec<usize>,
    weights: Vec<f64>,
}

impl PartitionPopulation {
    /// Number of partitions.
    pub fn num_partitions(&self) -> usize {
        self.counts.len()
    }

    /// `(node_count, weight_sum)` of partition `p`; `(0, 0.0)` when out of range.
    pub fn get(&self, p: usize) -> (usize, f64) {
        match (self.counts.get(p), self.weights.get(p)) {
            (Some(&c), Some(&w)) => (c, w),
            _ => (0, 0.0),
        }
    }

    /// Node counts per partition.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Weight sums per partition.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Total number of assigned nodes.
    pub fn total_count(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Iterate `(partition, node_count, weight_sum)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.counts
            .iter()
            .zip(&self.weights)
            .enumerate()
            .map(|(p, (&c, &w))| (p, c, w))
    }
}

/// Count the nodes and sum the node weights of every partition.
///
/// Nodes without an explicit weight contribute 1.0. Empty partitions come back
/// as `(0, 0.0)`.
pub fn partition_population(
    graph: &Graph,
    assignment: &[i64],
    num_partitions: usize,
) -> Result<PartitionPopulation> {
    check_assignment(assignment, graph.node_count(), num_partitions, true)?;

    let mut counts = vec![0usize; num_partitions];
    let mut weights = vec![0.0f64; num_partitions];
    for (node, &label) in assignment.iter().enumerate() {
        if label == UNASSIGNED {
            continue;
        }
        let p = label as usize;
        counts[p] += 1;
        weights[p] += graph.node_weight(node);
    }

    Ok(PartitionPopulation { counts, weights })
}

/// Average of per-partition `scores` weighted by partition node counts.
///
/// Returns 0.0 when no node is assigned, instead of dividing by zero.
pub fn population_weighted_average(scores: &[f64], population: &PartitionPopulation) -> f64 {
    let total = population.total_count();
    if total == 0 {
        return 0.0;
    }
    let weighted: f64 = scores
        .iter()
        .zip(population.counts())
        .map(|(&s, &c)| s * c as f64)
        .sum();
    weighted / total as f64
}

/// Nodes of each partition, ascending.
pub fn partition_members(assignment: &[i64], num_partitions: usize) -> Vec<Vec<usize>> {
    let mut members = vec![Vec::new(); num_partitions];
    for (node, &label) in assignment.iter().enumerate() {
        if label >= 0 && (label as usize) < num_partitions {
            members[label as usize].push(node);
        }
    }
    members
}

/// Validate `num_partitions` and that every label is in range.
///
/// With `allow_unassigned`, [`UNASSIGNED`] is accepted as well.
pub(crate) fn check_assignment(
    assignment: &[i64],
    num_nodes: usize,
    num_partitions: usize,
    allow_unassigned: bool,
) -> Result<()> {
    if num_partitions == 0 {
        return Err(Error::InvalidPartitionCount(num_partitions));
    }
    if assignment.len() != num_nodes {
        return Err(Error::LengthMismatch {
            expected: num_nodes,
            found: assignment.len(),
        });
    }
    let bad = assignment.iter().enumerate().find(|&(_, &label)| {
        let unassigned_ok = allow_unassigned && label == UNASSIGNED;
        !unassigned_ok && (label < 0 || label as u64 >= num_partitions as u64)
    });
    if let Some((index, &label)) = bad {
        return Err(Error::LabelOutOfRange {
            index,
            label,
            num_partitions,
        });
    }
    Ok(())
}
