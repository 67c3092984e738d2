//! Leverage centrality and leverage-ordered node arrival.
//!
//! Leverage compares a node's degree with the degrees of its neighbors
//! (Joyce et al. 2010):
//!
//! ```text
//! l(i) = mean_{j ∈ N(i)} (k_i - k_j) / (k_i + k_j)
//! ```
//!
//! Real scores lie in `[-1, 1]`. Nodes without neighbors have no ratio to
//! average and get [`ISOLATED_LEVERAGE`] instead.

use crate::graph::Graph;
use rand::prelude::*;
use std::collections::HashSet;

/// Score of a node with degree zero.
pub const ISOLATED_LEVERAGE: f64 = -1000.0;

/// Leverage of a single node.
pub fn node_leverage(graph: &Graph, node: usize) -> f64 {
    leverage_with(graph, node, |n| graph.degree(n))
}

fn leverage_with<F>(graph: &Graph, node: usize, degree: F) -> f64
where
    F: Fn(usize) -> usize,
{
    let ki = degree(node) as f64;
    let mut total = 0.0;
    let mut count = 0usize;
    for (neighbor, _) in graph.neighbors(node) {
        let kj = degree(neighbor) as f64;
        total += (ki - kj) / (ki + kj);
        count += 1;
    }
    if count == 0 {
        return ISOLATED_LEVERAGE;
    }
    total / count as f64
}

/// Every node with its leverage, highest first.
///
/// Degrees are computed once up front, so ranking is linear in the edge count.
/// The sort is stable over ascending node ids, so equal scores keep id order.
pub fn leverage_centrality(graph: &Graph) -> Vec<(usize, f64)> {
    let degrees: Vec<usize> = (0..graph.node_count()).map(|n| graph.degree(n)).collect();
    let mut ranked: Vec<(usize, f64)> = (0..graph.node_count())
        .map(|node| (node, leverage_with(graph, node, |n| degrees[n])))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// The nodes of `batch`, in the order they appear in `ranked`.
///
/// Isolated nodes (score [`ISOLATED_LEVERAGE`]) carry no ordering signal; they
/// are moved to the end in a random order drawn from `rng`. Batch nodes that
/// are missing from `ranked` are dropped.
pub fn reorder_by_leverage<R>(ranked: &[(usize, f64)], batch: &[usize], rng: &mut R) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    let members: HashSet<usize> = batch.iter().copied().collect();
    let mut ordered = Vec::with_capacity(members.len());
    let mut outliers = Vec::new();

    for &(node, score) in ranked {
        if !members.contains(&node) {
            continue;
        }
        if score == ISOLATED_LEVERAGE {
            outliers.push(node);
        } else {
            ordered.push(node);
        }
    }

    outliers.shuffle(rng);
    tracing::trace!(
        ranked = ordered.len(),
        outliers = outliers.len(),
        "reordered batch by leverage"
    );
    ordered.extend(outliers);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star_plus_isolated() -> Graph {
        // 0 is the hub of leaves 1..=3; 4 and 5 are isolated.
        Graph::from_edges(6, &[(0, 1), (0, 2), (0, 3)]).unwrap()
    }

    #[test]
    fn test_regular_graph_scores_zero() {
        let cycle = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]).unwrap();
        for (_, score) in leverage_centrality(&cycle) {
            assert_eq!(score, 0.0);
        }
    }

    #[test]
    fn test_star_ranking() {
        let ranked = leverage_centrality(&star_plus_isolated());
        assert_eq!(ranked[0], (0, 0.5));
        assert_eq!(&ranked[1..4], &[(1, -0.5), (2, -0.5), (3, -0.5)]);
        assert_eq!(&ranked[4..], &[(4, ISOLATED_LEVERAGE), (5, ISOLATED_LEVERAGE)]);
    }

    #[test]
    fn test_reorder_puts_isolated_last() {
        let ranked = leverage_centrality(&star_plus_isolated());
        let mut rng = StdRng::seed_from_u64(3);
        let order = reorder_by_leverage(&ranked, &[5, 3, 4, 0], &mut rng);

        assert_eq!(&order[..2], &[0, 3]);
        let mut tail = order[2..].to_vec();
        tail.sort_unstable();
        assert_eq!(tail, vec![4, 5]);
    }

    #[test]
    fn test_reorder_prefix_is_deterministic() {
        let ranked = leverage_centrality(&star_plus_isolated());
        let batch = [0, 1, 2, 3, 4, 5];
        let a = reorder_by_leverage(&ranked, &batch, &mut StdRng::seed_from_u64(1));
        let b = reorder_by_leverage(&ranked, &batch, &mut StdRng::seed_from_u64(99));
        assert_eq!(&a[..4], &b[..4]);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn test_large_star_ranks_hub_first() {
        let leaves = 20_000;
        let edges: Vec<(usize, usize)> = (1..=leaves).map(|leaf| (0, leaf)).collect();
        let g = Graph::from_edges(leaves + 1, &edges).unwrap();

        let ranked = leverage_centrality(&g);
        let expected_hub = (leaves as f64 - 1.0) / (leaves as f64 + 1.0);
        assert_eq!(ranked[0].0, 0);
        assert!((ranked[0].1 - expected_hub).abs() < 1e-12);
        assert!((ranked[leaves].1 + expected_hub).abs() < 1e-12);
        assert_eq!(node_leverage(&g, 0), ranked[0].1);
    }
}
