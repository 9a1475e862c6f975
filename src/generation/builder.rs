//! Cell construction by incremental half-plane clipping
//!
//! For one generator, the builder starts from the domain rectangle and clips
//! it against the perpendicular bisector of every sufficiently close
//! neighbor. Neighbors are visited in the precomputed worklist order; once
//! the radius table proves no unvisited block can hold a point within twice
//! the cell's current bounding radius, the scan stops.

use glam::DVec2;

use crate::cell::Cell;
use crate::error::{Result, VoronoiError};
use crate::geometry::Rect;

use super::grid::BlockGrid;
use super::search::{SearchTable, WORKLIST_RADIUS};

/// Squared distance under which two generators count as coincident
const DUPLICATE_EPS_SQ: f64 = 1e-18;

/// Signed-distance tolerance for vertex classification during clipping
const CLIP_EPS: f64 = 1e-9;

/// Reusable buffers so per-cell clipping does not allocate
#[derive(Debug, Default, Clone)]
pub(crate) struct ClipScratch {
    verts: Vec<DVec2>,
    dists: Vec<f64>,
}

/// Build the clipped Voronoi cell of `points[id]`
///
/// Returns `DegenerateCell` when the polygon is clipped away entirely (a
/// generator outside the domain, or coincident generators) so the caller can
/// drop the cell and move on.
pub(crate) fn build_cell(
    id: usize,
    points: &[DVec2],
    grid: &BlockGrid,
    table: &SearchTable,
    bounds: Rect,
    scratch: &mut ClipScratch,
) -> Result<Cell> {
    let p = points[id];
    let mut verts: Vec<DVec2> = bounds.corners().to_vec();
    let mut max_r2 = verts
        .iter()
        .map(|v| v.distance_squared(p))
        .fold(0.0, f64::max);

    let home = grid.block_of(p);
    let rel = grid.position_in_block(p, home);
    let sub = table.subregion_of(rel);
    let worklist = table.worklist();

    // Worklist scan: the bound at position `pos` covers every block from
    // `pos` onward plus everything outside the worklist, so exceeding it
    // finishes the cell outright.
    let mut proven = false;
    for (pos, &(di, dj)) in worklist.iter().enumerate() {
        if table.min_dist_sq(sub, pos) > 4.0 * max_r2 {
            proven = true;
            break;
        }
        let Some((bi, bj)) = grid.offset_block(home, di, dj) else {
            continue;
        };
        clip_against_block(id, p, points, grid.points_in(bi, bj), &mut verts, &mut max_r2, scratch)?;
    }

    // Worklist exhausted without a proof: sweep the rings beyond it with
    // bounds computed from the generator's exact position.
    if !proven && table.min_dist_sq(sub, worklist.len()) <= 4.0 * max_r2 {
        let (bw, bh) = grid.block_size();
        for r in (WORKLIST_RADIUS + 1)..=grid.max_ring(home) {
            if ring_min_dist_sq(rel, r, bw, bh) > 4.0 * max_r2 {
                break;
            }
            for (bi, bj) in grid.ring_blocks(home, r) {
                let di = bi as i32 - home.0 as i32;
                let dj = bj as i32 - home.1 as i32;
                if block_dist_sq(rel, di, dj, bw, bh) > 4.0 * max_r2 {
                    continue;
                }
                clip_against_block(
                    id,
                    p,
                    points,
                    grid.points_in(bi, bj),
                    &mut verts,
                    &mut max_r2,
                    scratch,
                )?;
            }
        }
    }

    if verts.len() < 3 {
        return Err(VoronoiError::DegenerateCell(id));
    }
    Ok(Cell::new(id, p, verts))
}

/// Clip the polygon against the bisector of every candidate in one block
fn clip_against_block(
    id: usize,
    p: DVec2,
    points: &[DVec2],
    candidates: &[usize],
    verts: &mut Vec<DVec2>,
    max_r2: &mut f64,
    scratch: &mut ClipScratch,
) -> Result<()> {
    for &q_idx in candidates {
        if q_idx == id {
            continue;
        }
        let q = points[q_idx];
        let normal = q - p;
        let d2 = normal.length_squared();
        if d2 < DUPLICATE_EPS_SQ {
            return Err(VoronoiError::DegenerateCell(id));
        }
        // A bisector can only cut the polygon when its owner lies within
        // twice the current bounding radius
        if d2 > 4.0 * *max_r2 {
            continue;
        }
        let midpoint = p + normal * 0.5;
        let (changed, new_r2) = clip_half_plane(verts, midpoint, normal, p, scratch);
        if changed {
            if verts.is_empty() {
                return Err(VoronoiError::DegenerateCell(id));
            }
            *max_r2 = new_r2;
        }
    }
    Ok(())
}

/// Clip the polygon to the half-plane `(v - origin) · normal <= 0`
///
/// Walks the edge cycle, keeps inside vertices and emits an interpolated
/// vertex wherever an edge crosses the boundary. Returns whether the polygon
/// changed and, if it did, the new maximum squared vertex distance from
/// `generator`. An emptied polygon leaves `verts` cleared.
fn clip_half_plane(
    verts: &mut Vec<DVec2>,
    origin: DVec2,
    normal: DVec2,
    generator: DVec2,
    scratch: &mut ClipScratch,
) -> (bool, f64) {
    let n = verts.len();
    if n < 3 {
        return (false, 0.0);
    }

    scratch.dists.clear();
    scratch.dists.reserve(n);

    let mut all_inside = true;
    let mut all_outside = true;
    for v in verts.iter() {
        let d = (*v - origin).dot(normal);
        scratch.dists.push(d);
        if d > CLIP_EPS {
            all_inside = false;
        } else if d < -CLIP_EPS {
            all_outside = false;
        }
    }

    if all_inside {
        return (false, 0.0);
    }
    if all_outside {
        verts.clear();
        return (true, 0.0);
    }

    scratch.verts.clear();
    let mut new_r2 = 0.0f64;
    let mut push = |v: DVec2, new_r2: &mut f64| {
        let d2 = v.distance_squared(generator);
        if d2 > *new_r2 {
            *new_r2 = d2;
        }
        scratch.verts.push(v);
    };

    for i in 0..n {
        let j = (i + 1) % n;
        let d_i = scratch.dists[i];
        let d_j = scratch.dists[j];

        if d_i <= CLIP_EPS {
            push(verts[i], &mut new_r2);
            if d_j > CLIP_EPS {
                // Leaving the half-plane: emit the crossing
                let t = d_i / (d_i - d_j);
                push(verts[i] + (verts[j] - verts[i]) * t, &mut new_r2);
            }
        } else if d_j <= CLIP_EPS {
            // Entering the half-plane: emit the crossing
            let t = d_i / (d_i - d_j);
            push(verts[i] + (verts[j] - verts[i]) * t, &mut new_r2);
        }
    }

    std::mem::swap(verts, &mut scratch.verts);
    (true, new_r2)
}

/// Minimum distance from a point in the home block to any block at
/// Chebyshev ring `r`, achieved by one of the four axis neighbors
fn ring_min_dist_sq(rel: DVec2, r: i32, bw: f64, bh: f64) -> f64 {
    let r = r as f64;
    let d = (r * bw - rel.x)
        .min(rel.x + (r - 1.0) * bw)
        .min(r * bh - rel.y)
        .min(rel.y + (r - 1.0) * bh);
    d * d
}

/// Minimum squared distance from a point in the home block to the block
/// `(di, dj)` offsets away
fn block_dist_sq(rel: DVec2, di: i32, dj: i32, bw: f64, bh: f64) -> f64 {
    let dx = if di > 0 {
        di as f64 * bw - rel.x
    } else if di < 0 {
        rel.x - (di + 1) as f64 * bw
    } else {
        0.0
    };
    let dy = if dj > 0 {
        dj as f64 * bh - rel.y
    } else if dj < 0 {
        rel.y - (dj + 1) as f64 * bh
    } else {
        0.0
    };
    dx * dx + dy * dy
}
