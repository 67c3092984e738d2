//! Loneliness: a degree-based measure of how embedded nodes are.
//!
//! ```text
//! score(n) = 1 - (1 / (deg(n) + 1))^α
//! ```
//!
//! An isolated node scores 0; the score approaches 1 as the degree grows.

use crate::error::Result;
use crate::graph::Graph;
use crate::population::{partition_members, partition_population, population_weighted_average};

/// Loneliness score of a single node with the given degree.
pub fn node_loneliness(degree: usize, alpha: f64) -> f64 {
    1.0 - (1.0 / (degree as f64 + 1.0)).powf(alpha)
}

/// Mean node loneliness over the graph; 0.0 for a graph without nodes.
pub fn loneliness_score(graph: &Graph, alpha: f64) -> f64 {
    let n = graph.node_count();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = (0..n)
        .map(|node| node_loneliness(graph.degree(node), alpha))
        .sum();
    total / n as f64
}

/// Loneliness computed inside each partition's induced subgraph, averaged with
/// partition node counts as weights.
///
/// Edges leaving a partition do not count towards a node's degree. Returns
/// 0.0 when no node is assigned.
pub fn loneliness_score_wavg(
    graph: &Graph,
    alpha: f64,
    assignment: &[i64],
    num_partitions: usize,
) -> Result<f64> {
    let population = partition_population(graph, assignment, num_partitions)?;
    let scores = partition_members(assignment, num_partitions)
        .iter()
        .map(|nodes| {
            graph
                .induced_subgraph(nodes)
                .map(|sub| loneliness_score(&sub.graph, alpha))
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(population_weighted_average(&scores, &population))
}
