//! Network permanence of each partition, from an external MaxPerm-style tool.
//!
//! The tool reads a tab separated edge list on standard input (`n m` header,
//! then one `u v` line per edge with nodes numbered `0..n`) and writes its
//! report to `output.txt` in its working directory. The report line
//! containing `Network Permanence` carries the score as its fourth token.

use crate::error::{Error, Result};
use crate::graph::{Graph, Subgraph};
use crate::population::{check_assignment, partition_members};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Scores the permanence of a (sub)graph.
pub trait PermanenceTool {
    fn network_permanence(&self, subgraph: &Subgraph) -> Result<f64>;
}

/// Write the `n\tm` header and every edge once as `u\tv` (`u <= v`, ascending).
///
/// Node ids are the subgraph's local ids, which follow ascending parent ids.
pub fn write_permanence_input<W: Write>(out: &mut W, graph: &Graph) -> Result<()> {
    let mut edges: Vec<(usize, usize)> = graph.edges().map(|(u, v, _)| (u.min(v), u.max(v))).collect();
    edges.sort_unstable();
    writeln!(out, "{}\t{}", graph.node_count(), edges.len())?;
    for (u, v) in edges {
        writeln!(out, "{u}\t{v}")?;
    }
    Ok(())
}

/// Permanence value from the tool's report.
pub fn parse_permanence_output(text: &str) -> Result<f64> {
    let line = text
        .lines()
        .find(|l| l.contains("Network Permanence"))
        .ok_or_else(|| Error::Collaborator("no `Network Permanence` line in output".to_string()))?;
    let token = line.split_whitespace().nth(3).ok_or_else(|| {
        Error::Collaborator(format!("malformed permanence line `{}`", line.trim()))
    })?;
    token
        .parse()
        .map_err(|_| Error::Collaborator(format!("unparsable permanence value `{token}`")))
}

/// [`PermanenceTool`] backed by an external program run in a scratch directory.
#[derive(Debug, Clone)]
pub struct MaxPermCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl MaxPermCommand {
    /// Tool at `program`, run without extra arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments passed to the program.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl PermanenceTool for MaxPermCommand {
    fn network_permanence(&self, subgraph: &Subgraph) -> Result<f64> {
        let dir = tempfile::tempdir()?;
        let edges_path = dir.path().join("edges-maxperm.txt");
        let log_path = dir.path().join("maxperm.log");

        {
            let mut out = BufWriter::new(File::create(&edges_path)?);
            write_permanence_input(&mut out, &subgraph.graph)?;
            out.flush()?;
        }

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(dir.path())
            .stdin(Stdio::from(File::open(&edges_path)?))
            .stdout(Stdio::null())
            .stderr(Stdio::from(File::create(&log_path)?))
            .status()?;

        if !status.success() {
            let log = fs::read_to_string(&log_path).unwrap_or_default();
            tracing::warn!(program = %self.program.display(), %status, "permanence tool failed");
            return Err(Error::Collaborator(log.replace('\n', "")));
        }

        let report = fs::read_to_string(dir.path().join("output.txt"))?;
        parse_permanence_output(&report)
    }
}

/// Permanence averaged over partitions with node counts as weights.
///
/// Empty partitions are skipped. Returns 0.0 when no node is assigned.
pub fn max_perm_wavg<T>(graph: &Graph, assignment: &[i64], num_partitions: usize, tool: &T) -> Result<f64>
where
    T: PermanenceTool + ?Sized,
{
    check_assignment(assignment, graph.node_count(), num_partitions, true)?;

    let mut score = 0.0;
    let mut total = 0usize;
    for (p, nodes) in partition_members(assignment, num_partitions).iter().enumerate() {
        if nodes.is_empty() {
            continue;
        }
        let sub = graph.induced_subgraph(nodes)?;
        let permanence = tool.network_permanence(&sub)?;
        tracing::trace!(partition = p, permanence);
        score += permanence * nodes.len() as f64;
        total += nodes.len();
    }

    if total == 0 {
        return Ok(0.0);
    }
    Ok(score / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Permanence equal to the subgraph's edge count.
    struct EdgeCount;

    impl PermanenceTool for EdgeCount {
        fn network_permanence(&self, subgraph: &Subgraph) -> Result<f64> {
            Ok(subgraph.graph.edge_count() as f64)
        }
    }

    #[test]
    fn test_write_permanence_input_renumbers() {
        let g = Graph::from_edges(6, &[(5, 2), (2, 4), (4, 5), (0, 1)]).unwrap();
        let sub = g.induced_subgraph(&[2, 4, 5]).unwrap();
        let mut out = Vec::new();
        write_permanence_input(&mut out, &sub.graph).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3\t3\n0\t1\n0\t2\n1\t2\n");
    }

    #[test]
    fn test_parse_permanence_output() {
        let report = "Nodes: 3\nNetwork Permanence = 0.375\n";
        assert_eq!(parse_permanence_output(report).unwrap(), 0.375);
        assert!(matches!(
            parse_permanence_output("nothing here"),
            Err(Error::Collaborator(_))
        ));
        assert!(parse_permanence_output("Network Permanence = n/a").is_err());
    }

    #[test]
    fn test_wavg_weights_by_partition_size() {
        // Partition 0: triangle (3 edges), partition 1: path of 2 nodes, partition 2 empty.
        let g = Graph::from_edges(5, &[(0, 1), (1, 2), (0, 2), (3, 4), (2, 3)]).unwrap();
        let avg = max_perm_wavg(&g, &[0, 0, 0, 1, 1], 3, &EdgeCount).unwrap();
        assert!((avg - (3.0 * 3.0 + 2.0 * 1.0) / 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_wavg_nothing_assigned() {
        let g = Graph::from_edges(2, &[(0, 1)]).unwrap();
        assert_eq!(max_perm_wavg(&g, &[-1, -1], 2, &EdgeCount).unwrap(), 0.0);
        assert!(max_perm_wavg(&g, &[0, 2], 2, &EdgeCount).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_reads_stdin_and_output_file() {
        let script = r#"read n m
test "$n" = 3 || exit 3
test "$m" = 2 || exit 4
echo "Network Permanence = 0.5" > output.txt"#;
        let tool = MaxPermCommand::new("sh").with_args(["-c", script]);
        let g = Graph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let sub = g.induced_subgraph(&[0, 1, 2]).unwrap();
        assert_eq!(tool.network_permanence(&sub).unwrap(), 0.5);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_carries_stderr() {
        let tool = MaxPermCommand::new("sh").with_args(["-c", "echo broken 1>&2; exit 2"]);
        let g = Graph::from_edges(2, &[(0, 1)]).unwrap();
        let sub = g.induced_subgraph(&[0, 1]).unwrap();
        match tool.network_permanence(&sub) {
            Err(Error::Collaborator(log)) => assert_eq!(log, "broken"),
            other => panic!("expected collaborator error, got {other:?}"),
        }
    }
}
