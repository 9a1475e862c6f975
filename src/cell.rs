//! Voronoi cell structure
//!
//! A cell pairs one generator point with the convex polygon of everything
//! closer to it than to any other generator, clipped to the domain
//! rectangle.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{polygon_area, polygon_centroid, polygon_contains, polygon_perimeter};

/// A single Voronoi cell
///
/// Cells are produced by [`Diagram::generate`](crate::Diagram::generate) and
/// never mutated afterwards; relaxation and perturbation rebuild them from
/// scratch.
///
/// # Invariants
///
/// - `vertices` are in counter-clockwise order
/// - the polygon is convex, simple, and lies inside the domain rectangle
/// - non-degenerate cells of one diagram partition the rectangle (up to
///   floating-point tolerance along shared edges)
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Cell {
    /// Index of the generator in the diagram's point list
    ///
    /// Stable across relaxation: the cell built from point `i` always carries
    /// id `i`, so cross-cell relationships can be kept as plain indices.
    pub id: usize,

    /// The generator point this cell belongs to
    pub generator: DVec2,

    /// Boundary polygon, counter-clockwise
    vertices: Vec<DVec2>,
}

impl Cell {
    /// Create a cell (called by the builder, not by user code)
    pub(crate) fn new(id: usize, generator: DVec2, vertices: Vec<DVec2>) -> Self {
        Self {
            id,
            generator,
            vertices,
        }
    }

    /// Boundary polygon vertices, counter-clockwise
    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// Number of polygon vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Polygon area
    #[inline]
    pub fn area(&self) -> f64 {
        polygon_area(&self.vertices)
    }

    /// Area-weighted polygon centroid
    ///
    /// This is the point the generator moves to under Lloyd relaxation.
    #[inline]
    pub fn centroid(&self) -> DVec2 {
        polygon_centroid(&self.vertices)
    }

    /// Total boundary length
    #[inline]
    pub fn perimeter(&self) -> f64 {
        polygon_perimeter(&self.vertices)
    }

    /// Exact containment test against the cell polygon
    ///
    /// Useful for callers matching detected motion regions to cells.
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        polygon_contains(&self.vertices, p)
    }

    /// Squared distance from the generator to its farthest vertex
    pub fn max_radius_sq(&self) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.distance_squared(self.generator))
            .fold(0.0, f64::max)
    }
}
