//! "Rather be somewhere else" (RBSE): nodes whose neighbors pull harder towards
//! another partition than towards their own.
//!
//! For an assigned node, each partition's pull is the total weight of edges to
//! neighbors assigned there. The node would rather be somewhere else when some
//! other partition's pull is strictly greater than its own partition's pull;
//! a tie keeps it where it is.

use crate::error::Result;
use crate::graph::Graph;
use crate::population::{check_assignment, UNASSIGNED};

/// Per-node RBSE flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RbseFlag {
    /// Node has not been assigned; excluded from the ratio.
    Unassigned,
    /// Own partition pulls at least as hard as any other.
    Content,
    /// Another partition pulls strictly harder.
    RatherBeElsewhere,
}

impl RbseFlag {
    /// Numeric form: `-1`, `0` or `1`.
    pub fn as_i8(self) -> i8 {
        match self {
            RbseFlag::Unassigned => -1,
            RbseFlag::Content => 0,
            RbseFlag::RatherBeElsewhere => 1,
        }
    }
}

/// RBSE flag for every node.
pub fn rbse_flags(graph: &Graph, assignment: &[i64], num_partitions: usize) -> Result<Vec<RbseFlag>> {
    check_assignment(assignment, graph.node_count(), num_partitions, true)?;

    let mut pull = vec![0.0f64; num_partitions];
    let flags = assignment
        .iter()
        .enumerate()
        .map(|(node, &label)| {
            if label == UNASSIGNED {
                return RbseFlag::Unassigned;
            }

            pull.fill(0.0);
            for (neighbor, w) in graph.neighbors(node) {
                let neighbor_label = assignment[neighbor];
                if neighbor_label != UNASSIGNED {
                    pull[neighbor_label as usize] += w;
                }
            }

            let own = label as usize;
            let current = pull[own];
            let elsewhere = pull
                .iter()
                .enumerate()
                .any(|(p, &score)| p != own && score > current);
            if elsewhere {
                RbseFlag::RatherBeElsewhere
            } else {
                RbseFlag::Content
            }
        })
        .collect();

    Ok(flags)
}

/// Fraction of assigned nodes flagged [`RbseFlag::RatherBeElsewhere`]; 0.0 when none is assigned.
pub fn rbse_ratio(flags: &[RbseFlag]) -> f64 {
    let mut rbse = 0usize;
    let mut total = 0usize;
    for flag in flags {
        match flag {
            RbseFlag::Unassigned => continue,
            RbseFlag::RatherBeElsewhere => rbse += 1,
            RbseFlag::Content => {}
        }
        total += 1;
    }
    if total == 0 {
        0.0
    } else {
        rbse as f64 / total as f64
    }
}

/// [`rbse_flags`] aggregated with [`rbse_ratio`].
pub fn rather_be_somewhere_else(
    graph: &Graph,
    assignment: &[i64],
    num_partitions: usize,
) -> Result<f64> {
    let flags = rbse_flags(graph, assignment, num_partitions)?;
    let ratio = rbse_ratio(&flags);
    tracing::debug!(ratio, "rather-be-somewhere-else ratio");
    Ok(ratio)
}
