//! Precomputed neighbor-search order and radius bounds
//!
//! For the cell builder to stop scanning blocks early, it needs to know the
//! minimum distance any point in a not-yet-visited block could have from the
//! generator. This module precomputes that bound once per block geometry:
//! a fixed traversal order over the 7×7 block neighborhood (the worklist),
//! and, for a 4×4 subdivision of the home block, the minimum squared
//! distance from each subregion to every tail of the worklist plus the shell
//! of blocks beyond it.
//!
//! The table depends only on the block extent, never on point positions, so
//! one immutable instance is shared across regenerations (and diagrams) with
//! the same block geometry.

use glam::DVec2;

/// Chebyshev radius of the worklist neighborhood (7×7 blocks)
pub(crate) const WORKLIST_RADIUS: i32 = 3;

/// Per-axis subdivisions of a block for the radius table
pub(crate) const SUBGRID: usize = 4;

const WORKLIST_LEN: usize = (2 * WORKLIST_RADIUS as usize + 1) * (2 * WORKLIST_RADIUS as usize + 1);

/// Immutable per-block-geometry search data
///
/// `min_dist_sq(sub, pos)` is a true lower bound on the squared distance from
/// anywhere in subregion `sub` of the home block to any point located in
/// `worklist()[pos..]` or in any block outside the worklist neighborhood.
#[derive(Debug)]
pub struct SearchTable {
    block_w: f64,
    block_h: f64,
    /// Block offsets in visitation order, nearest-first
    worklist: Vec<(i32, i32)>,
    /// `(SUBGRID² ) × (WORKLIST_LEN + 1)` bounds, subregion-major; the extra
    /// trailing column holds the shell-only bound used after the worklist is
    /// exhausted
    min_dist: Vec<f64>,
}

impl SearchTable {
    /// Build the table for the given block extent
    pub fn new(block_w: f64, block_h: f64) -> Self {
        let worklist = build_worklist(block_w, block_h);

        let sub_w = block_w / SUBGRID as f64;
        let sub_h = block_h / SUBGRID as f64;
        let mut min_dist = vec![0.0; SUBGRID * SUBGRID * (WORKLIST_LEN + 1)];

        for sj in 0..SUBGRID {
            for si in 0..SUBGRID {
                let xlo = si as f64 * sub_w;
                let xhi = xlo + sub_w;
                let ylo = sj as f64 * sub_h;
                let yhi = ylo + sub_h;

                // Minimum distance to the shell just outside the worklist;
                // every block farther out is at least this far away
                let shell = WORKLIST_RADIUS + 1;
                let mut minr = f64::INFINITY;
                for tj in -shell..=shell {
                    for ti in -shell..=shell {
                        if ti.abs().max(tj.abs()) == shell {
                            let d = block_min_dist_sq(
                                xlo, xhi, ylo, yhi, ti, tj, block_w, block_h,
                            );
                            if d < minr {
                                minr = d;
                            }
                        }
                    }
                }

                // Walk the worklist backward, re-admitting one block per step
                let base = (si + sj * SUBGRID) * (WORKLIST_LEN + 1);
                min_dist[base + WORKLIST_LEN] = minr;
                for q in (0..WORKLIST_LEN).rev() {
                    let (ti, tj) = worklist[q];
                    let d = block_min_dist_sq(xlo, xhi, ylo, yhi, ti, tj, block_w, block_h);
                    if d < minr {
                        minr = d;
                    }
                    min_dist[base + q] = minr;
                }
            }
        }

        Self {
            block_w,
            block_h,
            worklist,
            min_dist,
        }
    }

    /// Block offsets in visitation order
    #[inline]
    pub fn worklist(&self) -> &[(i32, i32)] {
        &self.worklist
    }

    /// Lower bound on squared distance from subregion `sub` to all blocks at
    /// worklist positions `>= pos` plus everything outside the worklist
    ///
    /// `pos` may equal `worklist().len()`, selecting the shell-only bound.
    #[inline]
    pub fn min_dist_sq(&self, sub: usize, pos: usize) -> f64 {
        self.min_dist[sub * (WORKLIST_LEN + 1) + pos]
    }

    /// Subregion index for a position relative to the block origin
    #[inline]
    pub fn subregion_of(&self, rel: DVec2) -> usize {
        let si =
            ((rel.x / (self.block_w / SUBGRID as f64)) as usize).min(SUBGRID - 1);
        let sj =
            ((rel.y / (self.block_h / SUBGRID as f64)) as usize).min(SUBGRID - 1);
        si + sj * SUBGRID
    }

    /// Whether this table was built for the given block extent
    #[inline]
    pub fn matches(&self, block_w: f64, block_h: f64) -> bool {
        (self.block_w - block_w).abs() < 1e-12 * self.block_w.max(1.0)
            && (self.block_h - block_h).abs() < 1e-12 * self.block_h.max(1.0)
    }
}

/// Offsets of the 7×7 neighborhood ordered by minimum block-to-block distance
///
/// Ties break on ring radius, then row-major, so the order is fully
/// deterministic for any block aspect ratio.
fn build_worklist(block_w: f64, block_h: f64) -> Vec<(i32, i32)> {
    let mut offsets: Vec<(i32, i32, f64)> = Vec::with_capacity(WORKLIST_LEN);
    for tj in -WORKLIST_RADIUS..=WORKLIST_RADIUS {
        for ti in -WORKLIST_RADIUS..=WORKLIST_RADIUS {
            let dx = (ti.abs() - 1).max(0) as f64 * block_w;
            let dy = (tj.abs() - 1).max(0) as f64 * block_h;
            offsets.push((ti, tj, dx * dx + dy * dy));
        }
    }
    offsets.sort_by(|a, b| {
        a.2.total_cmp(&b.2)
            .then_with(|| (a.0.abs().max(a.1.abs())).cmp(&(b.0.abs().max(b.1.abs()))))
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.0.cmp(&b.0))
    });
    offsets.into_iter().map(|(ti, tj, _)| (ti, tj)).collect()
}

/// Minimum squared distance from the subregion `[xlo,xhi]×[ylo,yhi]` of the
/// home block to the block offset `(ti, tj)` blocks away
///
/// Per axis, offset `t`: 0 when `t == 0`, `(size·t − hi)²` when `t > 0`,
/// `(lo − size·(1+t))²` when `t < 0`; the two axes add.
fn block_min_dist_sq(
    xlo: f64,
    xhi: f64,
    ylo: f64,
    yhi: f64,
    ti: i32,
    tj: i32,
    block_w: f64,
    block_h: f64,
) -> f64 {
    let dx = if ti > 0 {
        block_w * ti as f64 - xhi
    } else if ti < 0 {
        xlo - block_w * (1 + ti) as f64
    } else {
        0.0
    };
    let dy = if tj > 0 {
        block_h * tj as f64 - yhi
    } else if tj < 0 {
        ylo - block_h * (1 + tj) as f64
    } else {
        0.0
    };
    dx * dx + dy * dy
}
