//! Community detection oracles.
//!
//! The modularity and community-quality metrics need "the best partition" of
//! each induced subgraph. That search is delegated to a [`CommunityDetection`]
//! implementation; [`Louvain`] is the built-in one.
//!
//! ## Modularity
//!
//! ```text
//! Q = Σ_c [ in_c / m - γ (tot_c / 2m)² ]
//! ```
//!
//! Where:
//! - m = total edge weight
//! - in_c = weight of edges inside community c
//! - tot_c = sum of weighted degrees of nodes in c
//! - γ = resolution parameter
//!
//! ## References
//!
//! - Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! - Newman & Girvan (2004). "Finding and evaluating community structure in networks."

mod louvain;
mod traits;

pub use louvain::Louvain;
pub use traits::CommunityDetection;

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Community id -> ascending member node ids.
pub type CommunityMapping = BTreeMap<usize, Vec<usize>>;

/// Group `labels[i]` (the community of local node `i`) into a [`CommunityMapping`]
/// over the original ids `node_ids[i]`.
pub fn community_mapping(labels: &[usize], node_ids: &[usize]) -> Result<CommunityMapping> {
    if labels.len() != node_ids.len() {
        return Err(Error::LengthMismatch {
            expected: node_ids.len(),
            found: labels.len(),
        });
    }
    let mut mapping = CommunityMapping::new();
    for (&community, &node) in labels.iter().zip(node_ids) {
        mapping.entry(community).or_default().push(node);
    }
    for members in mapping.values_mut() {
        members.sort_unstable();
    }
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_community_mapping_sorted() {
        let mapping = community_mapping(&[1, 0, 1, 0], &[9, 4, 2, 7]).unwrap();
        assert_eq!(mapping[&0], vec![4, 7]);
        assert_eq!(mapping[&1], vec![2, 9]);
    }

    #[test]
    fn test_community_mapping_length_mismatch() {
        assert!(community_mapping(&[0, 1], &[0]).is_err());
    }
}
