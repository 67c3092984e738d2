//! # partscore
//!
//! Quality metrics for graph partitions, including partial assignments
//! produced while nodes stream in.
//!
//! An assignment is a slice with one label per node: `0..k`, or
//! [`UNASSIGNED`] for a node that has not arrived yet.
//!
//! - [`balance`]: load waste, edge cut and communication steps.
//! - [`modularity`]: per-partition best-split modularity, averaged by population.
//! - [`loneliness`], [`leverage`], [`rbse`]: node-level structure scores.
//! - [`alignment`]: weighted F1 against a reference after optimal relabelling.
//! - [`quality`], [`permanence`]: community quality and network permanence from external tools.
//! - [`dedup`] and [`io`]: raw directed edge streams into undirected graphs.
//! - [`report`]: all of the above in one [`PartitionReport`].
//!
//! ```
//! use partscore::{evaluate, Graph, MetricsConfig};
//!
//! let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
//! let config = MetricsConfig::default();
//! let report = evaluate(&graph, &[0, 0, 1, 1], 2, &config, &config.louvain()).unwrap();
//!
//! let balance = report.balance.unwrap();
//! assert_eq!(balance.waste, 0.0);
//! assert_eq!(balance.cut_count, 1);
//! ```

pub mod alignment;
pub mod balance;
pub mod community;
pub mod config;
pub mod dedup;
/// Error types used across `partscore`.
pub mod error;
pub mod graph;
pub mod io;
pub mod leverage;
pub mod loneliness;
pub mod modularity;
pub mod permanence;
pub mod population;
pub mod quality;
pub mod rbse;
pub mod regression;
pub mod report;

pub use error::{Error, Result};

pub use alignment::{fscores, linear_sum_assignment, weighted_f1, AlignedFScores};
pub use balance::{communication_metrics, BalanceScore, CommunicationMetrics};
pub use community::{CommunityDetection, CommunityMapping, Louvain};
pub use config::MetricsConfig;
pub use dedup::{to_undirected, EdgeDedup};
pub use graph::{Graph, Subgraph};
pub use io::{read_edge_list, EdgeList};
pub use leverage::{leverage_centrality, reorder_by_leverage};
pub use loneliness::{loneliness_score, loneliness_score_wavg};
pub use modularity::modularity_wavg;
pub use permanence::{max_perm_wavg, MaxPermCommand, PermanenceTool};
pub use population::{partition_population, PartitionPopulation, UNASSIGNED};
pub use quality::{community_quality_wavg, ComQualityCommand, QualityMetrics, QualityTool};
pub use rbse::{rather_be_somewhere_else, RbseFlag};
pub use regression::{predict_arrivals, RegressionModel};
pub use report::{evaluate, PartitionReport};
