//! Canonical undirected edge sets from directed edge streams.
//!
//! Each directed edge `(u, v)` is packed into one integer `u << B | v` with
//! `B = ceil(log2(n + 1))` bits per endpoint, together with its reverse
//! `v << B | u`. Sorting and deduplicating the packed words yields every edge
//! in both directions exactly once, ordered by `(left, right)`.
//!
//! Packing needs `2 * B <= 63`, which holds for `n` up to roughly `2^31`.

use crate::error::{Error, Result};
use rand::prelude::*;

/// Largest number of bits the two packed endpoints may use together.
const PACKING_WORD_BITS: u32 = 63;

/// Builds undirected edge lists, optionally relabelling nodes at random first.
#[derive(Debug, Clone, Default)]
pub struct EdgeDedup {
    /// Apply a uniform random permutation of node ids before deduplicating.
    shuffle: bool,
    /// Seed for the permutation; thread RNG when absent.
    seed: Option<u64>,
}

impl EdgeDedup {
    /// Deduplicator that keeps node ids as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the random relabelling.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Fix the permutation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Undirected edges of `num_nodes` nodes, both directions present once each.
    ///
    /// Fails if an id is negative or `>= num_nodes`, or if `num_nodes` is too
    /// large to pack.
    pub fn to_undirected<I>(&self, edges: I, num_nodes: usize) -> Result<Vec<(usize, usize)>>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let bits = packing_bits(num_nodes);
        if 2 * bits > PACKING_WORD_BITS {
            return Err(Error::PackingOverflow { num_nodes, bits });
        }

        let permutation = self.shuffle.then(|| self.permutation(num_nodes));
        let relabel = |id: u64| match &permutation {
            Some(p) => p[id as usize],
            None => id,
        };

        let mut packed: Vec<u64> = Vec::new();
        for (left, right) in edges {
            let left = relabel(checked_id(left, num_nodes)?);
            let right = relabel(checked_id(right, num_nodes)?);
            packed.push(left << bits | right);
            packed.push(right << bits | left);
        }
        packed.sort_unstable();
        packed.dedup();

        let mask = (1u64 << bits) - 1;
        let undirected: Vec<(usize, usize)> = packed
            .into_iter()
            .map(|word| ((word >> bits) as usize, (word & mask) as usize))
            .collect();

        tracing::debug!(
            num_nodes,
            bits,
            shuffled = self.shuffle,
            rows = undirected.len(),
            "built undirected edge list"
        );
        Ok(undirected)
    }

    fn permutation(&self, num_nodes: usize) -> Vec<u64> {
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        let mut perm: Vec<u64> = (0..num_nodes as u64).collect();
        perm.shuffle(&mut rng);
        perm
    }
}

/// Undirected edges without relabelling (or with a thread-RNG shuffle).
pub fn to_undirected<I>(edges: I, num_nodes: usize, shuffle: bool) -> Result<Vec<(usize, usize)>>
where
    I: IntoIterator<Item = (i64, i64)>,
{
    EdgeDedup::new()
        .with_shuffle(shuffle)
        .to_undirected(edges, num_nodes)
}

/// Bits per endpoint: `ceil(log2(num_nodes + 1))`.
pub fn packing_bits(num_nodes: usize) -> u32 {
    usize::BITS - num_nodes.leading_zeros()
}

fn checked_id(id: i64, num_nodes: usize) -> Result<u64> {
    if id < 0 || id as u64 >= num_nodes as u64 {
        return Err(Error::NodeOutOfRange {
            node: id,
            num_nodes,
        });
    }
    Ok(id as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_packing_bits() {
        assert_eq!(packing_bits(0), 0);
        assert_eq!(packing_bits(1), 1);
        assert_eq!(packing_bits(7), 3);
        assert_eq!(packing_bits(8), 4);
        assert_eq!(packing_bits(11), 4);
    }

    #[test]
    fn test_to_undirected_example() {
        let out = to_undirected([(0, 1), (1, 2), (2, 10)], 11, false).unwrap();
        assert_eq!(out, vec![(0, 1), (1, 0), (1, 2), (2, 1), (2, 10), (10, 2)]);
    }

    #[test]
    fn test_reverse_duplicates_collapse() {
        let out = to_undirected([(3, 1), (1, 3), (3, 1)], 4, false).unwrap();
        assert_eq!(out, vec![(1, 3), (3, 1)]);
    }

    #[test]
    fn test_out_of_range_ids() {
        assert!(matches!(
            to_undirected([(0, 4)], 4, false),
            Err(Error::NodeOutOfRange { node: 4, num_nodes: 4 })
        ));
        assert!(matches!(
            to_undirected([(-1, 0)], 4, false),
            Err(Error::NodeOutOfRange { node: -1, .. })
        ));
    }

    #[test]
    fn test_packing_overflow() {
        let n = 1usize << 40;
        assert!(matches!(
            to_undirected([(0, 1)], n, false),
            Err(Error::PackingOverflow { .. })
        ));
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let edges = [(0, 1), (1, 2), (2, 3), (3, 4)];
        let dedup = EdgeDedup::new().with_shuffle(true).with_seed(7);
        let a = dedup.to_undirected(edges, 5).unwrap();
        let b = dedup.to_undirected(edges, 5).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        // Degree sequence survives relabelling.
        let mut degrees = [0usize; 5];
        for &(u, _) in &a {
            degrees[u] += 1;
        }
        let mut sorted = degrees.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 1, 2, 2, 2]);
    }

    proptest! {
        #[test]
        fn undirected_output_is_symmetric_and_unique(
            raw in proptest::collection::vec((0i64..30, 0i64..30), 0..60),
            shuffle in any::<bool>(),
        ) {
            let out = EdgeDedup::new()
                .with_shuffle(shuffle)
                .with_seed(1)
                .to_undirected(raw.iter().copied(), 30)
                .unwrap();

            prop_assert!(out.len() <= 2 * raw.len());
            prop_assert!(out.windows(2).all(|w| w[0] < w[1]));
            let set: std::collections::HashSet<_> = out.iter().copied().collect();
            for &(u, v) in &out {
                prop_assert!(set.contains(&(v, u)));
            }

            let again = to_undirected(
                out.iter().map(|&(u, v)| (u as i64, v as i64)),
                30,
                false,
            )
            .unwrap();
            prop_assert_eq!(again, out);
        }
    }
}
