//! Every partition metric in one call.

use crate::balance::{self, BalanceScore};
use crate::community::CommunityDetection;
use crate::config::MetricsConfig;
use crate::error::Result;
use crate::graph::Graph;
use crate::loneliness::{loneliness_score, loneliness_score_wavg};
use crate::modularity::modularity_wavg;
use crate::population::{check_assignment, partition_population, PartitionPopulation, UNASSIGNED};
use crate::rbse::rather_be_somewhere_else;

/// Scores of one assignment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionReport {
    /// Waste and cut; `None` while some node is still unassigned.
    pub balance: Option<BalanceScore>,
    /// Node-count weighted modularity of each partition's best split.
    pub modularity: f64,
    /// Loneliness of the whole graph.
    pub loneliness: f64,
    /// Node-count weighted loneliness inside partitions.
    pub loneliness_wavg: f64,
    /// Fraction of assigned nodes that would rather be in another partition.
    pub rbse: f64,
    /// Node count and weight of every partition.
    pub population: PartitionPopulation,
}

/// Evaluate `assignment` (possibly partial) against `graph`.
pub fn evaluate<D>(
    graph: &Graph,
    assignment: &[i64],
    num_partitions: usize,
    config: &MetricsConfig,
    oracle: &D,
) -> Result<PartitionReport>
where
    D: CommunityDetection + ?Sized,
{
    config.validate()?;
    check_assignment(assignment, graph.node_count(), num_partitions, true)?;

    let complete = !assignment.contains(&UNASSIGNED);
    let balance = if complete {
        Some(balance::score(graph, assignment, Some(num_partitions))?)
    } else {
        None
    };

    let report = PartitionReport {
        balance,
        modularity: modularity_wavg(graph, assignment, num_partitions, oracle)?,
        loneliness: loneliness_score(graph, config.loneliness_alpha),
        loneliness_wavg: loneliness_score_wavg(
            graph,
            config.loneliness_alpha,
            assignment,
            num_partitions,
        )?,
        rbse: rather_be_somewhere_else(graph, assignment, num_partitions)?,
        population: partition_population(graph, assignment, num_partitions)?,
    };

    tracing::debug!(
        num_partitions,
        complete,
        modularity = report.modularity,
        rbse = report.rbse,
        "evaluated assignment"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn path4() -> Graph {
        Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap()
    }

    #[test]
    fn test_evaluate_complete_assignment() {
        let g = path4();
        let config = MetricsConfig::default();
        let report = evaluate(&g, &[0, 0, 1, 1], 2, &config, &config.louvain()).unwrap();

        let balance = report.balance.unwrap();
        assert_eq!(balance.waste, 0.0);
        assert_eq!(balance.cut_count, 1);
        assert!((balance.cut_ratio - 1.0 / 3.0).abs() < 1e-12);
        assert!((report.loneliness_wavg - 0.5).abs() < 1e-12);
        assert_eq!(report.rbse, 0.0);
        assert_eq!(report.population.counts(), &[2, 2]);
    }

    #[test]
    fn test_evaluate_partial_assignment_has_no_balance() {
        let g = path4();
        let config = MetricsConfig::default();
        let report = evaluate(&g, &[0, -1, 1, -1], 2, &config, &config.louvain()).unwrap();
        assert!(report.balance.is_none());
        assert_eq!(report.population.total_count(), 2);
        // Each partition is a single node without edges.
        assert_eq!(report.modularity, 1.0);
    }

    #[test]
    fn test_evaluate_rejects_invalid_config() {
        let g = path4();
        let config = MetricsConfig::new().with_loneliness_alpha(-1.0);
        assert!(matches!(
            evaluate(&g, &[0, 0, 1, 1], 2, &config, &config.louvain()),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_report_serializes_field_names() {
        let g = path4();
        let config = MetricsConfig::default();
        let report = evaluate(&g, &[0, 0, -1, -1], 2, &config, &config.louvain()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["balance"].is_null());
        assert_eq!(json["rbse"], serde_json::json!(0.0));
        assert_eq!(json["population"]["counts"], serde_json::json!([2, 0]));
    }
}
