//! Seeded generator-point layouts
//!
//! Produces the point sets the diagram is built from. Both layouts are
//! deterministic for a given seed, driven by a `ChaCha8Rng`.

use glam::DVec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::geometry::Rect;

/// Generate `count` points uniformly distributed over the rectangle
///
/// # Example
///
/// ```
/// use voronoi_canvas::{generation::generate_uniform_points, Rect};
///
/// let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
/// let points = generate_uniform_points(50, 42, bounds);
/// assert_eq!(points.len(), 50);
/// assert!(points.iter().all(|&p| bounds.contains(p)));
/// ```
pub fn generate_uniform_points(count: usize, seed: u32, bounds: Rect) -> Vec<DVec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);

    (0..count)
        .map(|_| {
            DVec2::new(
                rng.gen_range(bounds.x..bounds.right()),
                rng.gen_range(bounds.y..bounds.top()),
            )
        })
        .collect()
}

/// Generate a jittered hexagonal lattice ("beehive") over the rectangle
///
/// Lattice sites are cell-centered on a `cols` × `rows` grid, with odd rows
/// shifted by half a column so the packing is hexagonal. Each site is
/// displaced by an independent uniform offset from `variance.0..variance.1`
/// on each axis. The lattice runs one ring beyond the rectangle so cells on
/// the border still see neighbors on all sides, but any site that ends up
/// outside the rectangle is discarded: the diagram requires all generators
/// inside its domain. Pass pre-inflated bounds when overhang is wanted.
pub fn generate_beehive_points(
    cols: usize,
    rows: usize,
    variance: (f64, f64),
    seed: u32,
    bounds: Rect,
) -> Vec<DVec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);

    let col_w = bounds.width / cols as f64;
    let row_h = bounds.height / rows as f64;
    let (lo, hi) = variance;

    let mut points = Vec::with_capacity((cols + 2) * (rows + 2));
    for j in -1..=(rows as i64) {
        for i in -1..=(cols as i64) {
            let mut p = DVec2::new(
                bounds.x + (i as f64 + 0.5) * col_w,
                bounds.y + (j as f64 + 0.5) * row_h,
            );
            if j.rem_euclid(2) == 1 {
                p.x += col_w * 0.5;
            }
            // Draw jitter unconditionally to keep the stream position
            // independent of which sites survive the bounds filter
            let jitter = DVec2::new(sample(&mut rng, lo, hi), sample(&mut rng, lo, hi));
            p += jitter;

            if bounds.contains(p) {
                points.push(p);
            }
        }
    }
    points
}

fn sample(rng: &mut ChaCha8Rng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}
