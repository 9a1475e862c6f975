//! Diagram: construction, relaxation and queries
//!
//! Owns the generator points, the block grid, the shared search table and
//! the resulting cells. Construction is single-threaded and synchronous;
//! `generate()` and `relax()` block for time proportional to the point count
//! times the average number of blocks visited per cell.

use std::sync::Arc;
use std::time::Instant;

use glam::DVec2;

use crate::cell::Cell;
use crate::config::DiagramConfig;
use crate::error::{Result, VoronoiError};
use crate::generation::{build_cell, generate_points, BlockGrid, ClipScratch, SearchTable};
use crate::geometry::Rect;

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// A bounded planar Voronoi diagram
///
/// # Example
///
/// ```
/// use voronoi_canvas::{Diagram, DiagramConfigBuilder, Rect};
///
/// let config = DiagramConfigBuilder::new(Rect::new(0.0, 0.0, 100.0, 100.0))
///     .seed(42)
///     .point_count(32)
///     .relaxation_steps(2)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let diagram = Diagram::generate_from(config).unwrap();
/// assert!(diagram.cell_count() > 0);
///
/// // Cells partition the domain
/// let total: f64 = diagram.cells().map(|c| c.area()).sum();
/// assert!((total - 10_000.0).abs() < 1e-6);
/// ```
#[derive(Clone)]
pub struct Diagram {
    bounds: Rect,
    points: Vec<DVec2>,
    points_per_block: f64,
    grid: BlockGrid,
    search: Arc<SearchTable>,
    /// One slot per generator; `None` marks a dropped degenerate cell
    cells: Vec<Option<Cell>>,
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl Diagram {
    /// Generate a diagram from a configuration
    ///
    /// Generates the configured point layout, builds every cell, then runs
    /// the configured number of relaxation passes.
    pub fn generate_from(config: DiagramConfig) -> Result<Self> {
        let points = generate_points(&config)?;
        let mut diagram = Self::from_points(config.bounds, points, config.points_per_block)?;
        diagram.generate()?;
        for _ in 0..config.relaxation_steps {
            diagram.relax()?;
        }
        Ok(diagram)
    }

    /// Create a diagram from an explicit point set
    ///
    /// No cells exist until [`generate`](Self::generate) is called.
    ///
    /// # Errors
    ///
    /// - `InvalidDomain` if the rectangle has non-positive extent or any
    ///   point lies outside it
    /// - `InvalidConfig` if the point set is empty or the occupancy is not
    ///   positive
    pub fn from_points(bounds: Rect, points: Vec<DVec2>, points_per_block: f64) -> Result<Self> {
        if !(bounds.width > 0.0) || !(bounds.height > 0.0) {
            return Err(VoronoiError::InvalidDomain(format!(
                "rectangle must have positive extent (got {}x{})",
                bounds.width, bounds.height
            )));
        }
        if !(points_per_block > 0.0) {
            return Err(VoronoiError::InvalidConfig(format!(
                "points per block must be positive (got {})",
                points_per_block
            )));
        }
        if points.is_empty() {
            return Err(VoronoiError::InvalidConfig(
                "point set must not be empty".to_string(),
            ));
        }
        validate_points(&bounds, &points)?;

        let (nx, ny) = BlockGrid::dimensions_for(bounds, points.len(), points_per_block);
        let grid = BlockGrid::new(bounds, nx, ny);
        let (bw, bh) = grid.block_size();

        #[cfg(feature = "spatial-index")]
        let spatial_index = SpatialIndex::new(&points);

        Ok(Self {
            bounds,
            points,
            points_per_block,
            grid,
            search: Arc::new(SearchTable::new(bw, bh)),
            cells: Vec::new(),
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    /// Build (or rebuild) every cell from the current point set
    ///
    /// Rebuilds the block grid, reuses the search table when the block
    /// geometry is unchanged, and constructs cells in input-point order.
    /// Degenerate cells are dropped and logged; they never abort the run.
    /// Idempotent for a fixed point set.
    pub fn generate(&mut self) -> Result<()> {
        if self.points.is_empty() {
            return Err(VoronoiError::InvalidConfig(
                "cannot generate a diagram from zero points".to_string(),
            ));
        }
        let start = Instant::now();

        let (nx, ny) =
            BlockGrid::dimensions_for(self.bounds, self.points.len(), self.points_per_block);
        if self.grid.dims() != (nx, ny) {
            self.grid = BlockGrid::new(self.bounds, nx, ny);
        }
        let (bw, bh) = self.grid.block_size();
        if !self.search.matches(bw, bh) {
            self.search = Arc::new(SearchTable::new(bw, bh));
        }
        self.grid.rebuild(&self.points);

        let mut scratch = ClipScratch::default();
        let mut dropped = 0usize;
        self.cells = (0..self.points.len())
            .map(|id| {
                match build_cell(
                    id,
                    &self.points,
                    &self.grid,
                    &self.search,
                    self.bounds,
                    &mut scratch,
                ) {
                    Ok(cell) => Some(cell),
                    Err(VoronoiError::DegenerateCell(id)) => {
                        eprintln!("[Diagram] cell {} degenerate, dropped", id);
                        dropped += 1;
                        None
                    }
                    Err(_) => None,
                }
            })
            .collect();

        #[cfg(feature = "spatial-index")]
        {
            self.spatial_index = SpatialIndex::new(&self.points);
        }

        eprintln!(
            "[Diagram] generate: {} cells ({} dropped) in {:?}",
            self.cells.len() - dropped,
            dropped,
            start.elapsed()
        );
        Ok(())
    }

    /// One Lloyd relaxation pass
    ///
    /// Replaces every generator with its cell's area-weighted centroid
    /// (generators whose cell was dropped keep their position) and calls
    /// [`generate`](Self::generate) again. Repeated passes make cell sizes
    /// progressively more uniform; callers choose a fixed iteration budget,
    /// no convergence check is performed.
    pub fn relax(&mut self) -> Result<()> {
        if !self.cells.is_empty() {
            self.points = self
                .cells
                .iter()
                .zip(&self.points)
                .map(|(cell, &point)| match cell {
                    Some(cell) => cell.centroid(),
                    None => point,
                })
                .collect();
        }
        self.generate()
    }

    /// Discard cells and points
    ///
    /// The block geometry and the search table are retained, so a following
    /// [`set_points`](Self::set_points) + [`generate`](Self::generate) with
    /// a similar point count reuses them.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.points.clear();
    }

    /// Replace the point set without regenerating
    ///
    /// Existing cells are discarded; call [`generate`](Self::generate) to
    /// rebuild. This is the entry point for per-frame "perturb the points
    /// slightly and rebuild" animation driven by
    /// [`shape::drift`](crate::shape::drift).
    pub fn set_points(&mut self, points: Vec<DVec2>) -> Result<()> {
        if points.is_empty() {
            return Err(VoronoiError::InvalidConfig(
                "point set must not be empty".to_string(),
            ));
        }
        validate_points(&self.bounds, &points)?;
        self.points = points;
        self.cells.clear();
        #[cfg(feature = "spatial-index")]
        {
            self.spatial_index = SpatialIndex::new(&self.points);
        }
        Ok(())
    }

    /// The domain rectangle
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current generator points, in input order
    #[inline]
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    /// Number of generator points
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Iterate over the built (non-degenerate) cells in generator order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    /// Cell of generator `id`, `None` if out of range or degenerate
    #[inline]
    pub fn cell(&self, id: usize) -> Option<&Cell> {
        self.cells.get(id).and_then(|slot| slot.as_ref())
    }

    /// Number of built (non-degenerate) cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.iter().flatten().count()
    }

    /// Generator index of the cell containing a position
    ///
    /// The nearest generator's cell is, by definition of the diagram, the
    /// cell containing the queried position, so this is an exact containment
    /// query in O(log n). Requires the `spatial-index` feature.
    #[cfg(feature = "spatial-index")]
    pub fn find_cell_at(&self, position: DVec2) -> usize {
        self.spatial_index.find_nearest(position)
    }
}

fn validate_points(bounds: &Rect, points: &[DVec2]) -> Result<()> {
    for (i, p) in points.iter().enumerate() {
        if !bounds.contains(*p) {
            return Err(VoronoiError::InvalidDomain(format!(
                "point {} at ({}, {}) lies outside the domain rectangle",
                i, p.x, p.y
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiagramConfigBuilder;

    fn quadrant_points() -> Vec<DVec2> {
        vec![
            DVec2::new(10.0, 10.0),
            DVec2::new(90.0, 10.0),
            DVec2::new(10.0, 90.0),
            DVec2::new(90.0, 90.0),
        ]
    }

    fn bounds_100() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    fn has_vertex(cell: &Cell, x: f64, y: f64) -> bool {
        cell.vertices()
            .iter()
            .any(|v| (v.x - x).abs() < 1e-9 && (v.y - y).abs() < 1e-9)
    }

    #[test]
    fn test_four_quadrants() {
        let mut diagram = Diagram::from_points(bounds_100(), quadrant_points(), 1.0).unwrap();
        diagram.generate().unwrap();

        assert_eq!(diagram.cell_count(), 4);
        for cell in diagram.cells() {
            assert_eq!(cell.vertex_count(), 4);
            assert!((cell.area() - 2500.0).abs() < 1e-6);
        }

        let first = diagram.cell(0).unwrap();
        assert!(has_vertex(first, 0.0, 0.0));
        assert!(has_vertex(first, 50.0, 0.0));
        assert!(has_vertex(first, 50.0, 50.0));
        assert!(has_vertex(first, 0.0, 50.0));

        let last = diagram.cell(3).unwrap();
        assert!(has_vertex(last, 50.0, 50.0));
        assert!(has_vertex(last, 100.0, 100.0));
    }

    #[test]
    fn test_quadrant_relaxation_preserves_area() {
        let mut diagram = Diagram::from_points(bounds_100(), quadrant_points(), 1.0).unwrap();
        diagram.generate().unwrap();
        diagram.relax().unwrap();

        // Generators move to the quadrant centroids
        let p0 = diagram.points()[0];
        assert!((p0.x - 25.0).abs() < 1e-6);
        assert!((p0.y - 25.0).abs() < 1e-6);

        let total: f64 = diagram.cells().map(|c| c.area()).sum();
        assert!(
            (total - 10_000.0).abs() < 1e-6,
            "relaxation changed covered area: {}",
            total
        );
    }

    #[test]
    fn test_coincident_points_both_dropped() {
        let points = vec![DVec2::new(50.0, 50.0), DVec2::new(50.0, 50.0)];
        let mut diagram = Diagram::from_points(bounds_100(), points, 1.0).unwrap();
        diagram.generate().unwrap();

        assert_eq!(diagram.cell_count(), 0);
        assert!(diagram.cell(0).is_none());
        assert!(diagram.cell(1).is_none());
        assert_eq!(diagram.cells().count(), 0);
    }

    #[test]
    fn test_duplicates_do_not_abort_others() {
        let mut points = quadrant_points();
        points.push(DVec2::new(30.0, 60.0));
        points.push(DVec2::new(30.0, 60.0));

        let mut diagram = Diagram::from_points(bounds_100(), points, 1.0).unwrap();
        diagram.generate().unwrap();

        assert_eq!(diagram.point_count(), 6);
        assert_eq!(diagram.cell_count(), 4);
        assert!(diagram.cell(4).is_none());
        assert!(diagram.cell(5).is_none());
    }

    #[test]
    fn test_partition_property() {
        let config = DiagramConfigBuilder::new(bounds_100())
            .seed(9)
            .point_count(64)
            .build()
            .unwrap();
        let diagram = Diagram::generate_from(config).unwrap();
        assert_eq!(diagram.cell_count(), 64);

        // Union covers the rectangle
        let total: f64 = diagram.cells().map(|c| c.area()).sum();
        assert!((total - 10_000.0).abs() < 1e-6, "area sum was {}", total);

        // Dense sampling: every sample falls in its nearest generator's cell
        for gy in 0..20 {
            for gx in 0..20 {
                let sample = DVec2::new(2.5 + gx as f64 * 5.0, 2.5 + gy as f64 * 5.0);
                let nearest = diagram
                    .points()
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| {
                        a.distance_squared(sample).total_cmp(&b.distance_squared(sample))
                    })
                    .map(|(i, _)| i)
                    .unwrap();
                let cell = diagram.cell(nearest).unwrap();
                assert!(
                    cell.contains(sample),
                    "sample {:?} missing from nearest cell {}",
                    sample,
                    nearest
                );
            }
        }
    }

    #[test]
    fn test_nearest_generator_property() {
        let config = DiagramConfigBuilder::new(bounds_100())
            .seed(17)
            .point_count(48)
            .build()
            .unwrap();
        let diagram = Diagram::generate_from(config).unwrap();

        for cell in diagram.cells() {
            let inside = cell.centroid();
            let own = inside.distance_squared(cell.generator);
            for (i, p) in diagram.points().iter().enumerate() {
                if i == cell.id {
                    continue;
                }
                assert!(
                    own <= inside.distance_squared(*p) + 1e-9,
                    "centroid of cell {} closer to generator {}",
                    cell.id,
                    i
                );
            }
        }
    }

    #[test]
    fn test_relaxation_reduces_area_variance() {
        let mut improved = 0;
        for seed in [3u32, 11, 29] {
            let config = DiagramConfigBuilder::new(bounds_100())
                .seed(seed)
                .point_count(80)
                .build()
                .unwrap();
            let mut diagram = Diagram::generate_from(config).unwrap();

            let variance = |d: &Diagram| {
                let areas: Vec<f64> = d.cells().map(|c| c.area()).collect();
                let mean = areas.iter().sum::<f64>() / areas.len() as f64;
                areas.iter().map(|a| (a - mean) * (a - mean)).sum::<f64>() / areas.len() as f64
            };

            let before = variance(&diagram);
            diagram.relax().unwrap();
            if variance(&diagram) <= before {
                improved += 1;
            }
        }
        // Statistical property: holds on average, demand a majority of seeds
        assert!(improved >= 2, "relaxation reduced variance on {}/3 seeds", improved);
    }

    #[test]
    fn test_generate_is_idempotent() {
        let mut diagram = Diagram::from_points(bounds_100(), quadrant_points(), 1.0).unwrap();
        diagram.generate().unwrap();
        let first: Vec<Vec<DVec2>> =
            diagram.cells().map(|c| c.vertices().to_vec()).collect();

        diagram.generate().unwrap();
        let second: Vec<Vec<DVec2>> =
            diagram.cells().map(|c| c.vertices().to_vec()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_determinism_across_runs() {
        let config = DiagramConfigBuilder::new(bounds_100())
            .seed(1234)
            .point_count(40)
            .relaxation_steps(3)
            .unwrap()
            .build()
            .unwrap();

        let a = Diagram::generate_from(config).unwrap();
        let b = Diagram::generate_from(config).unwrap();

        assert_eq!(a.points(), b.points());
        assert_eq!(a.cell_count(), b.cell_count());
        for (ca, cb) in a.cells().zip(b.cells()) {
            assert_eq!(ca.id, cb.id);
            assert_eq!(ca.vertices(), cb.vertices());
        }
    }

    #[test]
    fn test_construction_rejects_bad_input() {
        assert!(Diagram::from_points(
            Rect::new(0.0, 0.0, 0.0, 100.0),
            quadrant_points(),
            1.0
        )
        .is_err());
        assert!(Diagram::from_points(bounds_100(), vec![], 1.0).is_err());
        assert!(Diagram::from_points(bounds_100(), quadrant_points(), 0.0).is_err());
        // A point outside the domain is rejected up front
        assert!(Diagram::from_points(
            bounds_100(),
            vec![DVec2::new(50.0, 50.0), DVec2::new(150.0, 50.0)],
            1.0
        )
        .is_err());
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut diagram = Diagram::from_points(bounds_100(), quadrant_points(), 1.0).unwrap();
        diagram.generate().unwrap();
        let table_before = Arc::clone(&diagram.search);

        diagram.clear();
        assert_eq!(diagram.cell_count(), 0);
        assert_eq!(diagram.point_count(), 0);
        assert!(diagram.generate().is_err());

        // Same point count: block geometry (and thus the table) is reused
        let mut fresh = quadrant_points();
        fresh[0] = DVec2::new(20.0, 15.0);
        diagram.set_points(fresh).unwrap();
        diagram.generate().unwrap();
        assert_eq!(diagram.cell_count(), 4);
        assert!(Arc::ptr_eq(&table_before, &diagram.search));
    }

    #[test]
    fn test_set_points_validates() {
        let mut diagram = Diagram::from_points(bounds_100(), quadrant_points(), 1.0).unwrap();
        assert!(diagram.set_points(vec![]).is_err());
        assert!(diagram
            .set_points(vec![DVec2::new(-10.0, 50.0)])
            .is_err());
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_find_cell_at() {
        let mut diagram = Diagram::from_points(bounds_100(), quadrant_points(), 1.0).unwrap();
        diagram.generate().unwrap();

        assert_eq!(diagram.find_cell_at(DVec2::new(5.0, 5.0)), 0);
        assert_eq!(diagram.find_cell_at(DVec2::new(95.0, 5.0)), 1);
        assert_eq!(diagram.find_cell_at(DVec2::new(5.0, 95.0)), 2);
        assert_eq!(diagram.find_cell_at(DVec2::new(95.0, 95.0)), 3);

        // Agreement with exact polygon containment
        let sample = DVec2::new(33.0, 71.0);
        let id = diagram.find_cell_at(sample);
        assert!(diagram.cell(id).unwrap().contains(sample));
    }

    #[test]
    fn test_perturb_and_regenerate() {
        use crate::shape::{drift, DriftOptions};

        let config = DiagramConfigBuilder::new(bounds_100())
            .seed(8)
            .point_count(30)
            .build()
            .unwrap();
        let mut diagram = Diagram::generate_from(config).unwrap();
        let bounds = diagram.bounds();

        // Per-frame flow: drift the generators, clamp back into the domain,
        // rebuild the diagram from the perturbed layout
        let perturbed: Vec<DVec2> = diagram
            .points()
            .iter()
            .map(|&p| {
                let d = drift(p, 7, &DriftOptions::GENERATORS);
                DVec2::new(
                    d.x.clamp(bounds.x, bounds.right()),
                    d.y.clamp(bounds.y, bounds.top()),
                )
            })
            .collect();

        diagram.set_points(perturbed).unwrap();
        assert_eq!(diagram.cell_count(), 0, "set_points discards cells");
        diagram.generate().unwrap();
        assert_eq!(diagram.cell_count(), 30);

        let total: f64 = diagram.cells().map(|c| c.area()).sum();
        assert!((total - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_beehive_diagram() {
        let config = DiagramConfigBuilder::new(Rect::new(-50.0, -50.0, 200.0, 200.0))
            .seed(5)
            .beehive(10, 10, (0.0, 4.0))
            .unwrap()
            .relaxation_steps(1)
            .unwrap()
            .build()
            .unwrap();
        let diagram = Diagram::generate_from(config).unwrap();
        assert!(diagram.cell_count() > 50);

        let total: f64 = diagram.cells().map(|c| c.area()).sum();
        assert!((total - 40_000.0).abs() < 1e-6);
    }
}
