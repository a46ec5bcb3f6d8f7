use std::ops::{Add, Sub};

use crate::models::{FamilyGraph, MatchCandidate, PersonId};

/// Fixed-point scale for scores; costs are integers so ties are exact.
pub const SCORE_SCALE: i64 = 1_000_000;

pub fn quantize(score: f64) -> i64 {
    (score.clamp(0.0, 1.0) * SCORE_SCALE as f64).round() as i64
}

/// Scored pairs, one row per scoreable census row, one column per candidate
/// (in candidate-id order).
#[derive(Debug, Clone, Default)]
pub struct ScoreMatrix {
    pub cells: Vec<Vec<MatchCandidate>>,
}

impl ScoreMatrix {
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn get(&self, row: usize, col: usize) -> &MatchCandidate {
        &self.cells[row][col]
    }

    /// Every pair of one census row.
    pub fn row(&self, row: usize) -> &[MatchCandidate] {
        self.cells.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn quantized(&self) -> Vec<Vec<i64>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| quantize(c.composite)).collect())
            .collect()
    }

    /// Highest-scoring pair of a row (lowest id on ties).
    pub fn best_in_row(&self, row: usize) -> Option<&MatchCandidate> {
        self.cells.get(row)?.iter().fold(None, |best: Option<&MatchCandidate>, c| match best {
            Some(b) if quantize(b.composite) >= quantize(c.composite) => Some(b),
            _ => Some(c),
        })
    }
}

/// Values the Hungarian solver can minimise: an ordered group with a
/// sentinel larger than any reachable total.
pub trait AssignmentCost: Copy + Ord + Add<Output = Self> + Sub<Output = Self> {
    const ZERO: Self;
    const INF: Self;
}

impl AssignmentCost for i64 {
    const ZERO: i64 = 0;
    const INF: i64 = i64::MAX / 4;
}

/// Cost of one pair, compared field by field in declaration order:
/// score lost, a pair under the threshold, a weaker score on an earlier
/// row, no family support, then candidate rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RankedCost {
    lost: i64,
    rejected: i64,
    spread: i64,
    unsupported: i64,
    rank: i64,
}

impl Add for RankedCost {
    type Output = Self;

    fn add(self, o: Self) -> Self {
        Self {
            lost: self.lost + o.lost,
            rejected: self.rejected + o.rejected,
            spread: self.spread + o.spread,
            unsupported: self.unsupported + o.unsupported,
            rank: self.rank + o.rank,
        }
    }
}

impl Sub for RankedCost {
    type Output = Self;

    fn sub(self, o: Self) -> Self {
        Self {
            lost: self.lost - o.lost,
            rejected: self.rejected - o.rejected,
            spread: self.spread - o.spread,
            unsupported: self.unsupported - o.unsupported,
            rank: self.rank - o.rank,
        }
    }
}

impl AssignmentCost for RankedCost {
    const ZERO: Self = Self { lost: 0, rejected: 0, spread: 0, unsupported: 0, rank: 0 };
    const INF: Self = Self { lost: i64::MAX / 4, rejected: 0, spread: 0, unsupported: 0, rank: 0 };
}

/// Minimum-cost perfect matching on a square matrix (Kuhn–Munkres with
/// potentials, O(n³)). Returns the column assigned to every row.
pub fn hungarian<C: AssignmentCost>(cost: &[Vec<C>]) -> Vec<usize> {
    let n = cost.len();
    if n == 0 {
        return Vec::new();
    }
    let m = cost[0].len();
    debug_assert!(n <= m, "more rows than columns");

    let mut u = vec![C::ZERO; n + 1];
    let mut v = vec![C::ZERO; m + 1];
    // p[j]: row (1-based) holding column j; 0 = free.
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![C::INF; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = C::INF;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] = u[p[j]] + delta;
                    v[j] = v[j] - delta;
                } else {
                    minv[j] = minv[j] - delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Augment along the alternating path.
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=m {
        if p[j] != 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}

/// Square the problem, solve it, and map padding columns back to `None`.
fn solve_padded<C: AssignmentCost>(
    rows: usize,
    cols: usize,
    cell: impl Fn(usize, usize) -> C,
) -> Vec<Option<usize>> {
    if rows == 0 || cols == 0 {
        return vec![None; rows];
    }
    let size = rows.max(cols);
    let cost: Vec<Vec<C>> = (0..size).map(|r| (0..size).map(|c| cell(r, c)).collect()).collect();

    hungarian(&cost)
        .into_iter()
        .take(rows)
        .map(|c| (c < cols).then_some(c))
        .collect()
}

/// Global assignment between census rows and candidates.
pub struct OptimalAssigner<'a> {
    graph: &'a FamilyGraph,
}

impl<'a> OptimalAssigner<'a> {
    pub fn new(graph: &'a FamilyGraph) -> Self {
        Self { graph }
    }

    /// Maximum-total-score partial injection over quantized scores. Rows
    /// left on a padding column get `None`.
    pub fn solve(scores: &[Vec<i64>]) -> Vec<Option<usize>> {
        let cols = scores.first().map_or(0, Vec::len);
        // Padding costs the same as a zero score, so no real pair is
        // favoured or penalised by it.
        solve_padded(scores.len(), cols, |r, c| {
            SCORE_SCALE - scores.get(r).and_then(|row| row.get(c)).copied().unwrap_or(0)
        })
    }

    /// Optimal assignment with ties settled inside the solver, then pairs
    /// under `threshold` dropped. Columns must be in candidate-id order.
    ///
    /// Among assignments with the same total score the solver prefers, in
    /// order: more pairs at or above the threshold, stronger pairs on
    /// earlier rows, candidates with a recorded edge to another accepted
    /// match, lower candidate ids on earlier rows.
    pub fn assign(&self, matrix: &ScoreMatrix, ids: &[PersonId], threshold: f64) -> Vec<Option<usize>> {
        let q = matrix.quantized();
        let accept = quantize(threshold);

        let plain = Self::solve_ranked(&q, accept, |_, _| false);
        let mut assignment = if self.graph.is_empty() {
            plain
        } else {
            let supported = Self::solve_ranked(&q, accept, |row, col| {
                self.supported(row, col, &q, ids, accept, &plain)
            });
            if supported != plain {
                tracing::debug!(?plain, ?supported, "family support settled a tie");
            }
            supported
        };

        for (row, slot) in assignment.iter_mut().enumerate() {
            if let Some(col) = *slot {
                if matrix.get(row, col).composite < threshold {
                    *slot = None;
                }
            }
        }
        assignment
    }

    fn solve_ranked(
        q: &[Vec<i64>],
        accept: i64,
        supported: impl Fn(usize, usize) -> bool,
    ) -> Vec<Option<usize>> {
        let rows = q.len();
        let cols = q.first().map_or(0, Vec::len);
        let size = rows.max(cols);

        solve_padded(rows, cols, |r, c| {
            // Earlier rows weigh more.
            let weight = (size - r) as i64;
            match q.get(r).and_then(|row| row.get(c)) {
                Some(&score) => RankedCost {
                    lost: SCORE_SCALE - score,
                    rejected: i64::from(score < accept),
                    spread: (SCORE_SCALE - score) * weight,
                    unsupported: i64::from(!supported(r, c)),
                    rank: c as i64 * weight,
                },
                None => RankedCost {
                    lost: SCORE_SCALE,
                    rejected: 1,
                    spread: SCORE_SCALE * weight,
                    unsupported: 1,
                    rank: 0,
                },
            }
        })
    }

    /// Does `col` have a recorded edge to a candidate accepted for another row?
    fn supported(
        &self,
        row: usize,
        col: usize,
        q: &[Vec<i64>],
        ids: &[PersonId],
        accept: i64,
        assignment: &[Option<usize>],
    ) -> bool {
        assignment.iter().enumerate().any(|(other, slot)| match slot {
            Some(d) if other != row && *d != col => {
                q[other][*d] >= accept && self.graph.connected(ids[col], ids[*d])
            }
            _ => false,
        })
    }
}
