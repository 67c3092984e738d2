//! Modularity of a partition, averaged over partitions.
//!
//! Each partition's score is the modularity of the best community split of its
//! induced subgraph, as found by a [`CommunityDetection`] oracle. Scores are
//! averaged with partition node counts as weights.
//!
//! Degenerate subgraphs never reach the oracle:
//! - total edge weight zero because every weight is explicitly `0.0`: those
//!   weights are set to `1.0` on a working copy and the subgraph is scored;
//! - still zero (no edges, no nodes): the partition scores `1.0`.

use crate::community::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::population::{partition_members, partition_population, population_weighted_average};
use std::collections::BTreeMap;

/// Score given to a partition whose induced subgraph has no edge weight.
pub const DEGENERATE_PARTITION_MODULARITY: f64 = 1.0;

/// Modularity of `communities` (one community id per node) on `graph`.
///
/// Ids are arbitrary labels; they need not be contiguous.
/// Self-loops count once towards internal weight and twice towards degree.
/// Fails with [`Error::EmptyInput`] when the graph has no edge weight, where
/// modularity is undefined.
pub fn modularity(graph: &Graph, communities: &[usize], resolution: f64) -> Result<f64> {
    let n = graph.node_count();
    if communities.len() != n {
        return Err(Error::LengthMismatch {
            expected: n,
            found: communities.len(),
        });
    }
    let m = graph.total_edge_weight();
    if m == 0.0 {
        return Err(Error::EmptyInput);
    }

    // Community ids may be sparse; pack them into 0..c first.
    let mut dense: BTreeMap<usize, usize> = BTreeMap::new();
    for &c in communities {
        let next = dense.len();
        dense.entry(c).or_insert(next);
    }
    let packed: Vec<usize> = communities.iter().map(|c| dense[c]).collect();

    let mut internal = vec![0.0; dense.len()];
    let mut total_degree = vec![0.0; dense.len()];
    for (u, v, w) in graph.edges() {
        total_degree[packed[u]] += w;
        total_degree[packed[v]] += w;
        if packed[u] == packed[v] {
            internal[packed[u]] += w;
        }
    }

    Ok(internal
        .iter()
        .zip(&total_degree)
        .map(|(&inc, &tot)| inc / m - resolution * (tot / (2.0 * m)).powi(2))
        .sum())
}

/// Modularity of the oracle's best partition of `graph`.
pub fn best_partition_modularity<D>(graph: &Graph, oracle: &D) -> Result<f64>
where
    D: CommunityDetection + ?Sized,
{
    let communities = oracle.detect(graph)?;
    modularity(graph, &communities, oracle.resolution())
}

/// Per-partition modularity scores, with the degenerate-subgraph fallbacks applied.
pub fn partition_modularity_scores<D>(
    graph: &Graph,
    assignment: &[i64],
    num_partitions: usize,
    oracle: &D,
) -> Result<Vec<f64>>
where
    D: CommunityDetection + ?Sized,
{
    let members = partition_members(assignment, num_partitions);
    let mut scores = Vec::with_capacity(num_partitions);

    for (p, nodes) in members.iter().enumerate() {
        let mut sub = graph.induced_subgraph(nodes)?.graph;
        if sub.total_edge_weight() == 0.0 {
            let fixed = sub.fill_zero_edge_weights();
            if fixed > 0 {
                tracing::debug!(partition = p, edges = fixed, "zero-weight edges set to 1.0");
            }
        }

        let score = if sub.total_edge_weight() > 0.0 {
            best_partition_modularity(&sub, oracle)?
        } else {
            tracing::debug!(
                partition = p,
                nodes = nodes.len(),
                "no edge weight in partition, using fallback modularity"
            );
            DEGENERATE_PARTITION_MODULARITY
        };
        tracing::trace!(partition = p, modularity = score);
        scores.push(score);
    }

    Ok(scores)
}

/// Node-count weighted average of per-partition best-split modularity.
///
/// Returns 0.0 when no node is assigned. `assignment` may contain
/// [`crate::UNASSIGNED`] entries; those nodes belong to no partition.
pub fn modularity_wavg<D>(
    graph: &Graph,
    assignment: &[i64],
    num_partitions: usize,
    oracle: &D,
) -> Result<f64>
where
    D: CommunityDetection + ?Sized,
{
    let population = partition_population(graph, assignment, num_partitions)?;
    let scores = partition_modularity_scores(graph, assignment, num_partitions, oracle)?;
    let average = population_weighted_average(&scores, &population);
    tracing::debug!(average, "modularity weighted average");
    Ok(average)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::Louvain;

    fn two_triangles(offset: usize) -> Vec<(usize, usize)> {
        [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)]
            .iter()
            .map(|&(u, v)| (u + offset, v + offset))
            .collect()
    }

    #[test]
    fn test_modularity_two_cliques() {
        let g = Graph::from_edges(6, &two_triangles(0)).unwrap();
        // m = 7, in = 3 + 3, tot = 7 + 7
        let q = modularity(&g, &[0, 0, 0, 1, 1, 1], 1.0).unwrap();
        assert!((q - 5.0 / 14.0).abs() < 1e-12);

        let single = modularity(&g, &[0; 6], 1.0).unwrap();
        assert!(single.abs() < 1e-12);
    }

    #[test]
    fn test_modularity_without_edges_is_error() {
        let g = Graph::new(3);
        assert!(matches!(modularity(&g, &[0, 1, 2], 1.0), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_wavg_single_partition_no_edges() {
        let g = Graph::new(5);
        let avg = modularity_wavg(&g, &[0; 5], 1, &Louvain::new()).unwrap();
        assert_eq!(avg, 1.0);
    }

    #[test]
    fn test_wavg_equal_partitions_reduce_to_score() {
        let mut edges = two_triangles(0);
        edges.extend(two_triangles(6));
        let g = Graph::from_edges(12, &edges).unwrap();
        let assignment: Vec<i64> = (0..12).map(|i| if i < 6 { 0 } else { 1 }).collect();

        let scores = partition_modularity_scores(&g, &assignment, 2, &Louvain::new()).unwrap();
        assert!((scores[0] - 5.0 / 14.0).abs() < 1e-12);
        assert!((scores[1] - scores[0]).abs() < 1e-12);

        let avg = modularity_wavg(&g, &assignment, 2, &Louvain::new()).unwrap();
        assert!((avg - scores[0]).abs() < 1e-12);
    }

    #[test]
    fn test_wavg_zero_weight_correction_on_copy() {
        // Triangle whose weights are all explicitly zero.
        let g = Graph::from_weighted_edges(3, &[(0, 1, 0.0), (1, 2, 0.0), (0, 2, 0.0)]).unwrap();
        let avg = modularity_wavg(&g, &[0, 0, 0], 1, &Louvain::new()).unwrap();
        // Corrected triangle is one community: Q = 1 - 1 = 0, not the 1.0 fallback.
        assert!(avg.abs() < 1e-12);
        assert_eq!(g.total_edge_weight(), 0.0);
    }

    #[test]
    fn test_wavg_empty_partition_and_unassigned() {
        let g = Graph::from_edges(6, &two_triangles(0)).unwrap();
        // Partition 1 is empty and scores 1.0 with weight 0.
        let avg = modularity_wavg(&g, &[0, 0, 0, 0, 0, 0], 2, &Louvain::new()).unwrap();
        assert!((avg - 5.0 / 14.0).abs() < 1e-12);

        let none = modularity_wavg(&g, &[-1; 6], 2, &Louvain::new()).unwrap();
        assert_eq!(none, 0.0);
    }

    /// Labels nodes with far-apart community ids.
    struct SparseIds(Vec<usize>);

    impl CommunityDetection for SparseIds {
        fn detect(&self, graph: &Graph) -> Result<Vec<usize>> {
            Ok(self.0.iter().copied().take(graph.node_count()).collect())
        }
    }

    #[test]
    fn test_modularity_accepts_sparse_community_ids() {
        let g = Graph::from_edges(6, &two_triangles(0)).unwrap();
        let q = modularity(&g, &[usize::MAX, usize::MAX, usize::MAX, 7, 7, 7], 1.0).unwrap();
        assert!((q - 5.0 / 14.0).abs() < 1e-12);

        let path = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        let oracle = SparseIds(vec![usize::MAX, usize::MAX, 7, 7]);
        let dense = modularity(&path, &[0, 0, 1, 1], 1.0).unwrap();
        let avg = modularity_wavg(&path, &[0, 0, 0, 0], 1, &oracle).unwrap();
        assert!((avg - dense).abs() < 1e-12);
    }
}
