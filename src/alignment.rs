//! Label alignment between a reference labeling and an observed partition.
//!
//! Partitioners number their parts arbitrarily, so a partition that matches
//! the reference perfectly can still score near zero on raw label agreement.
//! [`fscores`] reports both the raw weighted F1 and the F1 after relabelling
//! the observed partition with the label swaps an optimal assignment picks.
//!
//! # Relabelling
//!
//! 1. Cost matrix: `cost[i][j] = 1 - F1(reference, observed with i <-> j swapped)`.
//! 2. Optimal assignment on `cost` gives a row -> column permutation.
//! 3. Rows are visited in order; each non-identity pair `(row, col)` swaps
//!    labels `row` and `col` in the observed vector, unless the smaller of the
//!    two has already been used as the key of an earlier swap.
//!
//! Step 3 does not compose the permutation's cycles exactly; it is kept as is
//! because downstream results depend on it.

use crate::error::{Error, Result};
use crate::population::UNASSIGNED;
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Support-weighted F1 over every label seen in either vector.
///
/// Per label, F1 is `2 tp / (predicted + actual)`, or 0 when there is no true
/// positive. Labels are weighted by their count in `truth`; labels that only
/// occur in `pred` therefore weigh nothing but still cost precision elsewhere.
/// Returns 0.0 for empty input; vectors of different lengths are an error.
pub fn weighted_f1(truth: &[i64], pred: &[i64]) -> Result<f64> {
    if truth.len() != pred.len() {
        return Err(Error::LengthMismatch {
            expected: truth.len(),
            found: pred.len(),
        });
    }
    Ok(support_weighted_f1(truth, pred))
}

/// [`weighted_f1`] for vectors already known to have equal lengths.
fn support_weighted_f1(truth: &[i64], pred: &[i64]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }

    // label -> (true positives, predicted count, actual count)
    let mut table: BTreeMap<i64, (usize, usize, usize)> = BTreeMap::new();
    for (&t, &p) in truth.iter().zip(pred) {
        table.entry(t).or_default().2 += 1;
        table.entry(p).or_default().1 += 1;
        if t == p {
            table.entry(t).or_default().0 += 1;
        }
    }

    let weighted: f64 = table
        .values()
        .map(|&(tp, predicted, actual)| {
            let f1 = if tp == 0 {
                0.0
            } else {
                2.0 * tp as f64 / (predicted + actual) as f64
            };
            actual as f64 * f1
        })
        .sum();

    weighted / truth.len() as f64
}

/// Copy of `labels` with every `a` replaced by `b` and every `b` by `a`.
pub fn swap_labels(labels: &[i64], a: i64, b: i64) -> Vec<i64> {
    labels
        .iter()
        .map(|&l| {
            if l == a {
                b
            } else if l == b {
                a
            } else {
                l
            }
        })
        .collect()
}

/// Minimum-cost assignment of rows to columns.
///
/// Shortest augmenting path method (Crouse 2016). Accepts rectangular
/// matrices and returns `(row, col)` pairs sorted by row; with more rows than
/// columns only `cols` rows are matched.
///
/// Ties between optimal assignments are broken deterministically: each
/// search scans free columns from the highest index down and, among columns
/// at equal reduced cost, prefers one that is still unassigned. A constant
/// matrix therefore yields the identity.
pub fn linear_sum_assignment(cost: &[Vec<f64>]) -> Result<Vec<(usize, usize)>> {
    let rows = cost.len();
    let cols = cost.first().map_or(0, Vec::len);
    if let Some(row) = cost.iter().find(|row| row.len() != cols) {
        return Err(Error::LengthMismatch {
            expected: cols,
            found: row.len(),
        });
    }
    if cost.iter().flatten().any(|c| !c.is_finite()) {
        return Err(Error::InvalidParameter {
            name: "cost",
            message: "cost matrix entries must be finite",
        });
    }
    if rows == 0 || cols == 0 {
        return Ok(Vec::new());
    }

    if rows <= cols {
        let flat: Vec<f64> = cost.iter().flatten().copied().collect();
        let col4row = shortest_augmenting_paths(rows, cols, &flat);
        Ok(col4row.into_iter().enumerate().collect())
    } else {
        let mut flat = vec![0.0; rows * cols];
        for (i, row) in cost.iter().enumerate() {
            for (j, &c) in row.iter().enumerate() {
                flat[j * rows + i] = c;
            }
        }
        let col4row = shortest_augmenting_paths(cols, rows, &flat);
        let mut pairs: Vec<(usize, usize)> = col4row
            .into_iter()
            .enumerate()
            .map(|(col, row)| (row, col))
            .collect();
        pairs.sort_unstable();
        Ok(pairs)
    }
}

/// Column matched to each row of a row-major `nr x nc` matrix, `nr <= nc`.
fn shortest_augmenting_paths(nr: usize, nc: usize, cost: &[f64]) -> Vec<usize> {
    const FREE: usize = usize::MAX;

    let mut u = vec![0.0f64; nr];
    let mut v = vec![0.0f64; nc];
    let mut shortest = vec![f64::INFINITY; nc];
    let mut path = vec![FREE; nc];
    let mut col4row = vec![FREE; nr];
    let mut row4col = vec![FREE; nc];
    let mut scanned_rows = vec![false; nr];
    let mut scanned_cols = vec![false; nc];
    let mut remaining = vec![0usize; nc];

    for cur_row in 0..nr {
        for (it, slot) in remaining.iter_mut().enumerate() {
            *slot = nc - it - 1;
        }
        let mut num_remaining = nc;
        scanned_rows.fill(false);
        scanned_cols.fill(false);
        shortest.fill(f64::INFINITY);

        let mut min_val = 0.0f64;
        let mut i = cur_row;
        let sink = loop {
            let mut index = 0usize;
            let mut lowest = f64::INFINITY;
            scanned_rows[i] = true;

            for (it, &j) in remaining[..num_remaining].iter().enumerate() {
                let r = min_val + cost[i * nc + j] - u[i] - v[j];
                if r < shortest[j] {
                    path[j] = i;
                    shortest[j] = r;
                }
                if shortest[j] < lowest || (shortest[j] == lowest && row4col[j] == FREE) {
                    lowest = shortest[j];
                    index = it;
                }
            }

            min_val = lowest;
            let j = remaining[index];
            scanned_cols[j] = true;
            num_remaining -= 1;
            remaining[index] = remaining[num_remaining];

            if row4col[j] == FREE {
                break j;
            }
            i = row4col[j];
        };

        u[cur_row] += min_val;
        for r in 0..nr {
            if scanned_rows[r] && r != cur_row {
                u[r] += min_val - shortest[col4row[r]];
            }
        }
        for c in 0..nc {
            if scanned_cols[c] {
                v[c] -= min_val - shortest[c];
            }
        }

        let mut j = sink;
        loop {
            let r = path[j];
            row4col[j] = r;
            std::mem::swap(&mut col4row[r], &mut j);
            if r == cur_row {
                break;
            }
        }
    }

    col4row
}

/// Result of [`fscores`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignedFScores {
    /// Weighted F1 with labels taken at face value.
    pub baseline: f64,
    /// Weighted F1 after applying `swaps` to the observed labels.
    pub relabelled: f64,
    /// Label swaps applied, in order.
    pub swaps: Vec<(i64, i64)>,
}

/// Cost matrix `1 - F1(reference, observed with i <-> j)` for labels `0..k`.
pub fn relabel_cost_matrix(
    reference: &[i64],
    observed: &[i64],
    num_partitions: usize,
) -> Result<Vec<Vec<f64>>> {
    if reference.len() != observed.len() {
        return Err(Error::LengthMismatch {
            expected: reference.len(),
            found: observed.len(),
        });
    }
    let row = |i: usize| -> Vec<f64> {
        (0..num_partitions)
            .map(|j| 1.0 - support_weighted_f1(reference, &swap_labels(observed, i as i64, j as i64)))
            .collect()
    };

    #[cfg(feature = "parallel")]
    {
        Ok((0..num_partitions).into_par_iter().map(row).collect())
    }

    #[cfg(not(feature = "parallel"))]
    {
        Ok((0..num_partitions).map(row).collect())
    }
}

/// Weighted F1 of `observed` against `reference`, before and after label alignment.
///
/// Positions where `observed` is [`UNASSIGNED`] are dropped from both vectors
/// first. Observed labels must lie in `0..num_partitions`; reference labels
/// may be any integers.
pub fn fscores(reference: &[i64], observed: &[i64], num_partitions: usize) -> Result<AlignedFScores> {
    if num_partitions == 0 {
        return Err(Error::InvalidPartitionCount(num_partitions));
    }
    if reference.len() != observed.len() {
        return Err(Error::LengthMismatch {
            expected: reference.len(),
            found: observed.len(),
        });
    }

    let mut truth = Vec::with_capacity(observed.len());
    let mut batch = Vec::with_capacity(observed.len());
    for (index, (&r, &o)) in reference.iter().zip(observed).enumerate() {
        if o == UNASSIGNED {
            continue;
        }
        if o < 0 || o as u64 >= num_partitions as u64 {
            return Err(Error::LabelOutOfRange {
                index,
                label: o,
                num_partitions,
            });
        }
        truth.push(r);
        batch.push(o);
    }

    let baseline = support_weighted_f1(&truth, &batch);

    let cost = relabel_cost_matrix(&truth, &batch, num_partitions)?;
    let assignment = linear_sum_assignment(&cost)?;

    // smaller label of each applied swap -> larger label
    let mut relabel_done: BTreeMap<usize, usize> = BTreeMap::new();
    let mut swaps = Vec::new();
    for (row, col) in assignment {
        if row == col {
            continue;
        }
        let (low, high) = (row.min(col), row.max(col));
        if relabel_done.contains_key(&low) {
            continue;
        }
        relabel_done.insert(low, high);
        batch = swap_labels(&batch, row as i64, col as i64);
        swaps.push((row as i64, col as i64));
    }

    let relabelled = support_weighted_f1(&truth, &batch);
    tracing::debug!(baseline, relabelled, swaps = swaps.len(), "aligned f-scores");

    Ok(AlignedFScores {
        baseline,
        relabelled,
        swaps,
    })
}
