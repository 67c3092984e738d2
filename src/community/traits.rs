//! Community detection traits.

use super::{community_mapping, CommunityMapping};
use crate::error::Result;
use crate::graph::{Graph, Subgraph};

/// A best-partition oracle: finds communities that (approximately) maximize modularity.
pub trait CommunityDetection {
    /// Detect communities in a graph.
    ///
    /// Returns a mapping from node index to community ID.
    fn detect(&self, graph: &Graph) -> Result<Vec<usize>>;

    /// Detect communities in an induced subgraph and report them in parent node ids.
    fn detect_mapping(&self, subgraph: &Subgraph) -> Result<CommunityMapping> {
        let labels = self.detect(&subgraph.graph)?;
        community_mapping(&labels, &subgraph.nodes)
    }

    /// Get the resolution parameter (if applicable).
    fn resolution(&self) -> f64 {
        1.0
    }
}
