//! Louvain algorithm for community detection.
//!
//! Fast modularity optimization through local node moves and graph aggregation.
//!
//! ## The Algorithm (Blondel et al. 2008)
//!
//! 1. **Phase 1 (Local Moving)**: Start with each node in its own community.
//!    Repeatedly move nodes to the neighboring community with the highest
//!    modularity gain until no improvement.
//!
//! 2. **Phase 2 (Aggregation)**: Build a meta-graph where communities become
//!    single nodes. Edge weights are sums of edges between communities.
//!    Self-loops represent internal community edges.
//!
//! 3. **Iterate**: Repeat phases 1-2 on the meta-graph until modularity
//!    stops improving.
//!
//! Neighbor communities are visited in ascending id order, so the result is
//! deterministic for a given graph.
//!
//! ## References
//!
//! Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! Journal of Statistical Mechanics: Theory and Experiment, P10008.

use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::Graph;
use std::collections::{BTreeMap, HashMap};

/// Louvain community detection algorithm.
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Resolution parameter (gamma).
    resolution: f64,
    /// Maximum iterations per level.
    max_iter: usize,
    /// Maximum levels of aggregation.
    max_levels: usize,
    /// Minimum modularity improvement to continue.
    min_modularity_gain: f64,
}

impl Louvain {
    /// Create a new Louvain detector with default settings.
    pub fn new() -> Self {
        Self {
            resolution: 1.0,
            max_iter: 100,
            max_levels: 10,
            min_modularity_gain: 1e-7,
        }
    }

    /// Set resolution parameter.
    ///
    /// Higher values produce smaller communities.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set maximum iterations per level.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set maximum aggregation levels.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    /// Modularity of a partition of an aggregated graph.
    fn modularity_weighted(
        &self,
        n: usize,
        edges: &[(usize, usize, f64)],
        self_loops: &[f64],
        communities: &[usize],
    ) -> f64 {
        let m: f64 = edges.iter().map(|(_, _, w)| w).sum::<f64>() + self_loops.iter().sum::<f64>();
        if m == 0.0 {
            return 0.0;
        }

        let degrees = weighted_degrees(n, edges, self_loops);

        let mut q = 0.0;
        for &(i, j, w) in edges {
            if communities[i] == communities[j] {
                let expected = degrees[i] * degrees[j] / (2.0 * m);
                q += w - self.resolution * expected;
            }
        }
        for (i, &sl) in self_loops.iter().enumerate() {
            if sl > 0.0 {
                let expected = degrees[i] * degrees[i] / (2.0 * m);
                q += sl - self.resolution * expected / 2.0;
            }
        }

        q / m
    }

    /// Phase 1: Local moving on weighted graph.
    /// Returns (communities, improved).
    fn local_moving(
        &self,
        n: usize,
        edges: &[(usize, usize, f64)],
        self_loops: &[f64],
    ) -> (Vec<usize>, bool) {
        let mut adj: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        for &(i, j, w) in edges {
            *adj[i].entry(j).or_insert(0.0) += w;
            *adj[j].entry(i).or_insert(0.0) += w;
        }

        let m: f64 = edges.iter().map(|(_, _, w)| w).sum::<f64>() + self_loops.iter().sum::<f64>();
        if m == 0.0 {
            return ((0..n).collect(), false);
        }

        let degrees = weighted_degrees(n, edges, self_loops);
        let mut communities: Vec<usize> = (0..n).collect();
        let mut community_degrees = degrees.clone();
        let mut any_improved = false;

        for _iter in 0..self.max_iter {
            let mut improved = false;

            for node in 0..n {
                let current_community = communities[node];
                let ki = degrees[node];

                // Temporarily remove node from community
                community_degrees[current_community] -= ki;

                let mut community_weights: BTreeMap<usize, f64> = BTreeMap::new();
                for (&neighbor, &w) in &adj[node] {
                    *community_weights.entry(communities[neighbor]).or_insert(0.0) += w;
                }

                let mut best_community = current_community;
                let mut best_gain = 0.0;
                for (&target_comm, &ki_in) in &community_weights {
                    let sigma_tot = community_degrees[target_comm];
                    let gain = ki_in / m - self.resolution * sigma_tot * ki / (2.0 * m * m);
                    if gain > best_gain {
                        best_gain = gain;
                        best_community = target_comm;
                    }
                }

                community_degrees[best_community] += ki;
                if best_community != current_community {
                    communities[node] = best_community;
                    improved = true;
                    any_improved = true;
                }
            }

            if !improved {
                break;
            }
        }

        (communities, any_improved)
    }

    /// Phase 2: Aggregate graph based on communities.
    /// Returns (new_edges, new_self_loops, node_to_original_mapping).
    fn aggregate(
        &self,
        edges: &[(usize, usize, f64)],
        self_loops: &[f64],
        communities: &[usize],
    ) -> (Vec<(usize, usize, f64)>, Vec<f64>, Vec<Vec<usize>>) {
        let mut unique_comms: Vec<usize> = communities.to_vec();
        unique_comms.sort_unstable();
        unique_comms.dedup();
        let n_new = unique_comms.len();

        let comm_to_new: HashMap<usize, usize> = unique_comms
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();

        let mut new_to_old: Vec<Vec<usize>> = vec![Vec::new(); n_new];
        for (node, &comm) in communities.iter().enumerate() {
            new_to_old[comm_to_new[&comm]].push(node);
        }

        let mut new_edge_weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        let mut new_self_loops = vec![0.0; n_new];
        for (i, &sl) in self_loops.iter().enumerate() {
            new_self_loops[comm_to_new[&communities[i]]] += sl;
        }
        for &(i, j, w) in edges {
            let ci = comm_to_new[&communities[i]];
            let cj = comm_to_new[&communities[j]];
            if ci == cj {
                new_self_loops[ci] += w;
            } else {
                let key = if ci < cj { (ci, cj) } else { (cj, ci) };
                *new_edge_weights.entry(key).or_insert(0.0) += w;
            }
        }

        let new_edges: Vec<(usize, usize, f64)> = new_edge_weights
            .into_iter()
            .map(|((i, j), w)| (i, j, w))
            .collect();

        (new_edges, new_self_loops, new_to_old)
    }

    /// Expand partition from aggregated level to original nodes.
    fn expand_partition(partition: &[usize], node_mapping: &[Vec<usize>]) -> Vec<usize> {
        let max_node = node_mapping.iter().flatten().copied().max().unwrap_or(0);
        let mut result = vec![0; max_node + 1];

        for (agg_node, original_nodes) in node_mapping.iter().enumerate() {
            let comm = partition[agg_node];
            for &orig in original_nodes {
                result[orig] = comm;
            }
        }
        result
    }
}

fn weighted_degrees(n: usize, edges: &[(usize, usize, f64)], self_loops: &[f64]) -> Vec<f64> {
    let mut degrees = vec![0.0; n];
    for &(i, j, w) in edges {
        degrees[i] += w;
        degrees[j] += w;
    }
    for (i, &sl) in self_loops.iter().enumerate() {
        degrees[i] += 2.0 * sl; // self-loops counted twice for degree
    }
    degrees
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for Louvain {
    fn detect(&self, graph: &Graph) -> Result<Vec<usize>> {
        let n = graph.node_count();
        if n == 0 {
            return Err(Error::EmptyInput);
        }

        let mut edges: Vec<(usize, usize, f64)> = Vec::new();
        let mut self_loops = vec![0.0; n];
        for (i, j, w) in graph.edges() {
            if i == j {
                self_loops[i] += w;
            } else {
                edges.push((i.min(j), i.max(j), w));
            }
        }

        let mut current_n = n;
        let mut current_edges = edges;
        let mut current_self_loops = self_loops;
        let mut mapping_stack: Vec<Vec<Vec<usize>>> = Vec::new();
        let mut prev_modularity = f64::NEG_INFINITY;

        for level in 0..self.max_levels {
            let (partition, improved) =
                self.local_moving(current_n, &current_edges, &current_self_loops);
            if !improved {
                break;
            }

            let mod_now = self.modularity_weighted(
                current_n,
                &current_edges,
                &current_self_loops,
                &partition,
            );
            tracing::trace!(level, modularity = mod_now, "louvain level");
            if mod_now - prev_modularity < self.min_modularity_gain {
                break;
            }
            prev_modularity = mod_now;

            let (new_edges, new_self_loops, node_mapping) =
                self.aggregate(&current_edges, &current_self_loops, &partition);

            // If no aggregation happened (each node is its own community), stop
            if node_mapping.len() == current_n {
                break;
            }

            current_n = node_mapping.len();
            mapping_stack.push(node_mapping);
            current_edges = new_edges;
            current_self_loops = new_self_loops;
        }

        let mut result: Vec<usize> = (0..current_n).collect();
        while let Some(mapping) = mapping_stack.pop() {
            result = Self::expand_partition(&result, &mapping);
        }
        result.resize(n, 0);

        // Renumber to consecutive integers
        let mut unique: Vec<usize> = result.to_vec();
        unique.sort_unstable();
        unique.dedup();

        Ok(result
            .iter()
            .map(|c| unique.binary_search(c).unwrap_or(0))
            .collect())
    }

    fn resolution(&self) -> f64 {
        self.resolution
    }
}
