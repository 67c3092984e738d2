//! Community quality of each partition, scored by an external tool.
//!
//! For every partition the induced subgraph is split into communities by a
//! [`CommunityDetection`] oracle, and a [`QualityTool`] scores that split.
//! The tool reports modularity `Q`, modularity density `Qds` and
//! `conductance`; [`community_quality_wavg`] averages the three with
//! partition node counts as weights.
//!
//! [`ComQualityCommand`] runs a command-line tool that reads a weighted edge
//! file and a community file and prints `name = value` pairs.

use crate::community::{CommunityDetection, CommunityMapping};
use crate::error::{Error, Result};
use crate::graph::{Graph, Subgraph};
use crate::population::{check_assignment, partition_members};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Named scores reported by a quality tool.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualityMetrics {
    values: BTreeMap<String, f64>,
}

impl QualityMetrics {
    /// Empty set of scores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a score.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Score by name, if reported.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Score by name; a missing score is a collaborator error.
    pub fn require(&self, name: &str) -> Result<f64> {
        self.get(name)
            .ok_or_else(|| Error::Collaborator(format!("quality tool did not report `{name}`")))
    }

    /// Modularity.
    pub fn q(&self) -> Result<f64> {
        self.require("Q")
    }

    /// Modularity density.
    pub fn qds(&self) -> Result<f64> {
        self.require("Qds")
    }

    /// Conductance.
    pub fn conductance(&self) -> Result<f64> {
        self.require("conductance")
    }

    /// All scores, by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

/// Scores a community split of a (sub)graph.
pub trait QualityTool {
    /// Quality of `communities` on `subgraph`. Community members are parent ids,
    /// as in [`Subgraph::nodes`].
    fn compute_quality(&self, subgraph: &Subgraph, communities: &CommunityMapping) -> Result<QualityMetrics>;
}

/// Parse `name = value` pairs from a quality tool's output.
///
/// Only lines containing ` = ` are considered. Each such line may carry
/// several comma separated pairs; later pairs overwrite earlier ones.
pub fn parse_quality_log(text: &str) -> Result<QualityMetrics> {
    let mut metrics = QualityMetrics::new();
    for line in text.lines().filter(|l| l.contains(" = ")) {
        for piece in line.split(',') {
            let Some((name, value)) = piece.split_once(" = ") else {
                continue;
            };
            let value: f64 = value.trim().parse().map_err(|_| {
                Error::Collaborator(format!("unparsable quality value in `{}`", piece.trim()))
            })?;
            metrics.insert(name.trim(), value);
        }
    }
    Ok(metrics)
}

/// Write `u v w` for every adjacency entry of `subgraph` (each edge in both
/// directions), in parent ids. Weights are truncated to integers.
pub fn write_network<W: Write>(out: &mut W, subgraph: &Subgraph) -> Result<()> {
    for (local, &node) in subgraph.nodes.iter().enumerate() {
        for (neighbor, weight) in subgraph.graph.neighbors(local) {
            let weight = if weight.is_finite() { weight.trunc() as i64 } else { 1 };
            writeln!(out, "{} {} {}", node, subgraph.nodes[neighbor], weight)?;
        }
    }
    Ok(())
}

/// Write one line per community (ascending community id) with its members space separated.
pub fn write_communities<W: Write>(out: &mut W, communities: &CommunityMapping) -> Result<()> {
    for members in communities.values() {
        let mut sorted = members.clone();
        sorted.sort_unstable();
        let line = sorted
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// [`QualityTool`] backed by an external program.
///
/// The program is invoked as `program [args...] -weighted <network> <communities>`
/// with both files in a fresh temporary directory. Standard output and
/// standard error go to the same log, which is parsed with
/// [`parse_quality_log`].
#[derive(Debug, Clone)]
pub struct ComQualityCommand {
    program: PathBuf,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl ComQualityCommand {
    /// Tool at `program`, run in the current directory without extra arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Arguments placed before `-weighted`, e.g. the class name for a JVM tool.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Directory to run the program in.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn run(&self, network: &Path, communities: &Path, log_path: &Path) -> Result<String> {
        let log = File::create(log_path)?;
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("-weighted")
            .arg(network)
            .arg(communities)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log));
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let status = command.status()?;

        let mut text = String::new();
        File::open(log_path)?.read_to_string(&mut text)?;

        if !status.success() {
            tracing::warn!(program = %self.program.display(), %status, "quality tool failed");
            return Err(Error::Collaborator(text.replace('\n', "")));
        }
        Ok(text)
    }
}

impl QualityTool for ComQualityCommand {
    fn compute_quality(&self, subgraph: &Subgraph, communities: &CommunityMapping) -> Result<QualityMetrics> {
        let dir = tempfile::tempdir()?;
        let network_path = dir.path().join("network.txt");
        let community_path = dir.path().join("community.txt");
        let log_path = dir.path().join("quality.log");

        {
            let mut out = BufWriter::new(File::create(&network_path)?);
            write_network(&mut out, subgraph)?;
            out.flush()?;
        }
        {
            let mut out = BufWriter::new(File::create(&community_path)?);
            write_communities(&mut out, communities)?;
            out.flush()?;
        }

        let text = self.run(&network_path, &community_path, &log_path)?;
        parse_quality_log(&text)
    }
}

/// `[Q, Qds, conductance]` averaged over partitions with node counts as weights.
///
/// Empty partitions are skipped. Returns `[0.0; 3]` when no node is assigned.
pub fn community_quality_wavg<D, T>(
    graph: &Graph,
    assignment: &[i64],
    num_partitions: usize,
    detector: &D,
    tool: &T,
) -> Result<[f64; 3]>
where
    D: CommunityDetection + ?Sized,
    T: QualityTool + ?Sized,
{
    check_assignment(assignment, graph.node_count(), num_partitions, true)?;

    let mut totals = [0.0f64; 3];
    let mut total_nodes = 0usize;

    for (p, nodes) in partition_members(assignment, num_partitions).iter().enumerate() {
        if nodes.is_empty() {
            continue;
        }
        let sub = graph.induced_subgraph(nodes)?;
        let communities = detector.detect_mapping(&sub)?;
        let metrics = tool.compute_quality(&sub, &communities)?;

        let n = nodes.len() as f64;
        let scores = [metrics.q()?, metrics.qds()?, metrics.conductance()?];
        for (total, score) in totals.iter_mut().zip(scores) {
            *total += score * n;
        }
        total_nodes += nodes.len();
        tracing::trace!(
            partition = p,
            communities = communities.len(),
            q = scores[0],
            qds = scores[1],
            conductance = scores[2]
        );
    }

    if total_nodes == 0 {
        return Ok([0.0; 3]);
    }
    Ok(totals.map(|t| t / total_nodes as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::Louvain;
    use std::cell::RefCell;

    /// Reports the number of communities and nodes it was shown.
    #[derive(Default)]
    struct Counting {
        seen: RefCell<Vec<Vec<usize>>>,
    }

    impl QualityTool for Counting {
        fn compute_quality(&self, subgraph: &Subgraph, communities: &CommunityMapping) -> Result<QualityMetrics> {
            self.seen.borrow_mut().push(subgraph.nodes.clone());
            let mut m = QualityMetrics::new();
            m.insert("Q", communities.len() as f64);
            m.insert("Qds", subgraph.nodes.len() as f64);
            m.insert("conductance", 0.5);
            Ok(m)
        }
    }

    #[test]
    fn test_parse_quality_log() {
        let log = "loading network\nQ = 0.41, Qds = 0.2\nconductance = 0.125, NMI = 1\n";
        let m = parse_quality_log(log).unwrap();
        assert_eq!(m.q().unwrap(), 0.41);
        assert_eq!(m.qds().unwrap(), 0.2);
        assert_eq!(m.conductance().unwrap(), 0.125);
        assert_eq!(m.get("NMI"), Some(1.0));
    }

    #[test]
    fn test_parse_quality_log_errors() {
        assert!(matches!(
            parse_quality_log("Q = oops"),
            Err(Error::Collaborator(_))
        ));
        let m = parse_quality_log("nothing useful").unwrap();
        assert!(m.q().is_err());
    }

    #[test]
    fn test_write_network_and_communities() {
        let g = Graph::from_weighted_edges(4, &[(1, 3, 2.7), (3, 2, 1.0)]).unwrap();
        let sub = g.induced_subgraph(&[1, 3]).unwrap();

        let mut network = Vec::new();
        write_network(&mut network, &sub).unwrap();
        assert_eq!(String::from_utf8(network).unwrap(), "1 3 2\n3 1 2\n");

        let mut mapping = CommunityMapping::new();
        mapping.insert(4, vec![9, 2]);
        mapping.insert(0, vec![3]);
        let mut communities = Vec::new();
        write_communities(&mut communities, &mapping).unwrap();
        assert_eq!(String::from_utf8(communities).unwrap(), "3\n2 9\n");
    }

    #[test]
    fn test_wavg_weights_by_partition_size() {
        // Partition 0: triangle 0-1-2, partition 1: single node 3, partition 2 empty.
        let g = Graph::from_edges(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]).unwrap();
        let tool = Counting::default();
        let [q, qds, conductance] =
            community_quality_wavg(&g, &[0, 0, 0, 1], 3, &Louvain::new(), &tool).unwrap();

        // Q: one community each; Qds: (3*3 + 1*1) / 4
        assert!((q - 1.0).abs() < 1e-12);
        assert!((qds - 2.5).abs() < 1e-12);
        assert!((conductance - 0.5).abs() < 1e-12);
        assert_eq!(*tool.seen.borrow(), vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn test_wavg_nothing_assigned() {
        let g = Graph::from_edges(2, &[(0, 1)]).unwrap();
        let tool = Counting::default();
        let scores = community_quality_wavg(&g, &[-1, -1], 2, &Louvain::new(), &tool).unwrap();
        assert_eq!(scores, [0.0; 3]);
        assert!(tool.seen.borrow().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_runs_program() {
        let script = r#"test "$1" = -weighted || exit 3
test -s "$2" || exit 4
echo "Q = 0.3, Qds = 0.1"
echo "conductance = 0.7" 1>&2"#;
        let tool = ComQualityCommand::new("sh").with_args(["-c", script, "quality"]);

        let g = Graph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let sub = g.induced_subgraph(&[0, 1, 2]).unwrap();
        let mapping = Louvain::new().detect_mapping(&sub).unwrap();

        let m = tool.compute_quality(&sub, &mapping).unwrap();
        assert_eq!(m.q().unwrap(), 0.3);
        assert_eq!(m.qds().unwrap(), 0.1);
        assert_eq!(m.conductance().unwrap(), 0.7);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_carries_log() {
        let tool = ComQualityCommand::new("sh").with_args(["-c", "echo bad\necho input; exit 1", "quality"]);
        let g = Graph::from_edges(2, &[(0, 1)]).unwrap();
        let sub = g.induced_subgraph(&[0, 1]).unwrap();
        let mapping = Louvain::new().detect_mapping(&sub).unwrap();

        match tool.compute_quality(&sub, &mapping) {
            Err(Error::Collaborator(log)) => assert_eq!(log, "badinput"),
            other => panic!("expected collaborator error, got {other:?}"),
        }
    }
}
