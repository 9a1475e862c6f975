//! Uniform block grid over the domain rectangle
//!
//! Partitions the bounded domain into `nx` × `ny` rectangular blocks, each
//! owning the indices of the generator points inside it. The grid is rebuilt
//! wholesale whenever the point set changes; no incremental updates are
//! needed because points only move between full regenerations.

use glam::DVec2;

use crate::geometry::Rect;

/// Spatial index of generator points, one bin per rectangular block
#[derive(Debug, Clone)]
pub struct BlockGrid {
    /// Blocks along the x axis
    nx: usize,
    /// Blocks along the y axis
    ny: usize,
    /// Block extent
    block_w: f64,
    block_h: f64,
    /// Domain origin
    origin: DVec2,
    /// Point indices per block, row-major (`i + j * nx`)
    bins: Vec<Vec<usize>>,
}

impl BlockGrid {
    /// Choose grid dimensions for `count` points at the given target occupancy
    ///
    /// Blocks are apportioned so that `nx * ny ≈ count / points_per_block`
    /// while keeping blocks roughly square in the domain's aspect ratio.
    pub fn dimensions_for(bounds: Rect, count: usize, points_per_block: f64) -> (usize, usize) {
        let blocks = (count as f64 / points_per_block).max(1.0);
        let aspect = bounds.width / bounds.height;
        let nx = (blocks * aspect).sqrt().round().max(1.0) as usize;
        let ny = (blocks / aspect).sqrt().round().max(1.0) as usize;
        (nx, ny)
    }

    /// Create an empty grid with the given dimensions
    pub fn new(bounds: Rect, nx: usize, ny: usize) -> Self {
        Self {
            nx,
            ny,
            block_w: bounds.width / nx as f64,
            block_h: bounds.height / ny as f64,
            origin: DVec2::new(bounds.x, bounds.y),
            bins: vec![Vec::new(); nx * ny],
        }
    }

    /// Grid dimensions `(nx, ny)`
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Block extent `(width, height)`
    #[inline]
    pub fn block_size(&self) -> (f64, f64) {
        (self.block_w, self.block_h)
    }

    /// Block coordinates of the given point
    ///
    /// Points on (or marginally past) the domain edge clamp into the nearest
    /// edge block.
    #[inline]
    pub fn block_of(&self, p: DVec2) -> (usize, usize) {
        let i = (((p.x - self.origin.x) / self.block_w).max(0.0) as usize).min(self.nx - 1);
        let j = (((p.y - self.origin.y) / self.block_h).max(0.0) as usize).min(self.ny - 1);
        (i, j)
    }

    /// Position of a point relative to its block's origin
    #[inline]
    pub fn position_in_block(&self, p: DVec2, block: (usize, usize)) -> DVec2 {
        DVec2::new(
            (p.x - self.origin.x - block.0 as f64 * self.block_w).clamp(0.0, self.block_w),
            (p.y - self.origin.y - block.1 as f64 * self.block_h).clamp(0.0, self.block_h),
        )
    }

    /// Indices of the points currently inside block `(i, j)`
    #[inline]
    pub fn points_in(&self, i: usize, j: usize) -> &[usize] {
        &self.bins[i + j * self.nx]
    }

    /// Apply a signed offset to a block, `None` when it leaves the grid
    #[inline]
    pub fn offset_block(&self, block: (usize, usize), di: i32, dj: i32) -> Option<(usize, usize)> {
        let i = block.0 as i64 + di as i64;
        let j = block.1 as i64 + dj as i64;
        if i >= 0 && i < self.nx as i64 && j >= 0 && j < self.ny as i64 {
            Some((i as usize, j as usize))
        } else {
            None
        }
    }

    /// Rebuild every bin from the given point set (O(n))
    pub fn rebuild(&mut self, points: &[DVec2]) {
        for bin in &mut self.bins {
            bin.clear();
        }
        for (idx, &p) in points.iter().enumerate() {
            let (i, j) = self.block_of(p);
            self.bins[i + j * self.nx].push(idx);
        }
    }

    /// In-grid blocks at exactly Chebyshev distance `r` from `center`
    ///
    /// `r == 0` yields the center block itself. Blocks outside the grid are
    /// omitted. Iteration order is deterministic: bottom row, top row, then
    /// the left/right columns bottom-to-top.
    pub fn ring_blocks(
        &self,
        center: (usize, usize),
        r: i32,
    ) -> impl Iterator<Item = (usize, usize)> + '_ {
        let offsets = ring_offsets(r);
        offsets.filter_map(move |(di, dj)| self.offset_block(center, di, dj))
    }

    /// Visit blocks in rings of increasing Chebyshev distance from `center`
    ///
    /// The callback receives each in-grid block; returning `false` stops the
    /// walk. The walk ends on its own once every ring that intersects the
    /// grid has been visited.
    pub fn visit_spiral<F>(&self, center: (usize, usize), mut f: F)
    where
        F: FnMut((usize, usize)) -> bool,
    {
        let max_r = self.max_ring(center);
        for r in 0..=max_r {
            for block in self.ring_blocks(center, r) {
                if !f(block) {
                    return;
                }
            }
        }
    }

    /// Largest ring radius around `center` that still touches the grid
    #[inline]
    pub fn max_ring(&self, center: (usize, usize)) -> i32 {
        let rx = center.0.max(self.nx - 1 - center.0);
        let ry = center.1.max(self.ny - 1 - center.1);
        rx.max(ry) as i32
    }
}

/// Offsets at exactly Chebyshev distance `r`, deterministic order
fn ring_offsets(r: i32) -> Box<dyn Iterator<Item = (i32, i32)>> {
    if r == 0 {
        return Box::new(std::iter::once((0, 0)));
    }
    let bottom = (-r..=r).map(move |di| (di, -r));
    let top = (-r..=r).map(move |di| (di, r));
    let left = (-r + 1..r).map(move |dj| (-r, dj));
    let right = (-r + 1..r).map(move |dj| (r, dj));
    Box::new(bottom.chain(top).chain(left).chain(right))
}
