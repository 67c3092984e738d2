//! Reading raw directed edge streams.
//!
//! One `u v` pair per line, whitespace separated. Lines starting with `#` and
//! blank lines are skipped. Compressed inputs are handled by wrapping the
//! reader (e.g. in a gzip decoder) before calling [`read_edge_list`].

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A directed edge stream plus the node count implied by its largest id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeList {
    /// Edges in file order.
    pub edges: Vec<(i64, i64)>,
    /// `max id + 1`, or 0 when there are no edges.
    pub num_nodes: usize,
}

impl EdgeList {
    /// Number of directed edges read.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}

/// Parse a directed edge list from any buffered reader.
pub fn read_edge_list<R: BufRead>(reader: R) -> Result<EdgeList> {
    let mut edges = Vec::new();
    let mut max_id: Option<i64> = None;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = trimmed.split_whitespace();
        let (Some(left), Some(right), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(Error::Parse {
                line: i + 1,
                message: format!("expected two node ids, got '{trimmed}'"),
            });
        };
        let left = parse_id(left, i + 1)?;
        let right = parse_id(right, i + 1)?;

        max_id = Some(max_id.unwrap_or(0).max(left).max(right));
        edges.push((left, right));
    }

    let num_nodes = max_id.map_or(0, |m| m as usize + 1);
    tracing::debug!(edges = edges.len(), num_nodes, "read edge list");
    Ok(EdgeList { edges, num_nodes })
}

/// Open and parse an uncompressed edge-list file.
pub fn read_edge_list_file(path: &Path) -> Result<EdgeList> {
    let file = File::open(path)?;
    read_edge_list(BufReader::new(file))
}

fn parse_id(token: &str, line: usize) -> Result<i64> {
    let id: i64 = token.parse().map_err(|_| Error::Parse {
        line,
        message: format!("'{token}' is not an integer node id"),
    })?;
    if id < 0 {
        return Err(Error::Parse {
            line,
            message: format!("negative node id {id}"),
        });
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_read_skips_comments_and_blanks() {
        let text = "# SNAP header\n# Nodes: 11\n0\t1\n\n1 2\n2   10\n";
        let list = read_edge_list(Cursor::new(text)).unwrap();
        assert_eq!(list.edges, vec![(0, 1), (1, 2), (2, 10)]);
        assert_eq!(list.num_edges(), 3);
        assert_eq!(list.num_nodes, 11);
    }

    #[test]
    fn test_read_empty() {
        let list = read_edge_list(Cursor::new("# nothing\n")).unwrap();
        assert!(list.edges.is_empty());
        assert_eq!(list.num_nodes, 0);
    }

    #[test]
    fn test_read_rejects_bad_lines() {
        let err = read_edge_list(Cursor::new("0 1\n3\n")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));

        let err = read_edge_list(Cursor::new("0 x\n")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));

        let err = read_edge_list(Cursor::new("0 -4\n")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_read_file() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("edges.txt");
        let mut f = File::create(&path)?;
        writeln!(f, "# comment")?;
        writeln!(f, "3 4")?;
        drop(f);

        let list = read_edge_list_file(&path).unwrap();
        assert_eq!(list.edges, vec![(3, 4)]);
        assert_eq!(list.num_nodes, 5);
        Ok(())
    }
}
