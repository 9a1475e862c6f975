//! Diagram configuration and builder
//!
//! This module provides configuration types for deterministic diagram
//! generation: the bounded domain, the point distribution to seed it with,
//! and the relaxation/indexing knobs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};
use crate::geometry::Rect;

/// How generator points are laid out inside the domain rectangle
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointDistribution {
    /// Independent uniform samples over the rectangle
    Uniform {
        /// Number of generator points
        count: usize,
    },
    /// Jittered hexagonal lattice ("beehive")
    ///
    /// A `cols` × `rows` grid of lattice sites, odd rows offset by half a
    /// column so neighbors pack hexagonally, each site displaced by a uniform
    /// random offset drawn from `variance.0..variance.1` on each axis. The
    /// lattice extends one ring beyond the rectangle so border cells are not
    /// starved of neighbors; sites landing outside the rectangle are dropped.
    Beehive {
        /// Lattice columns inside the rectangle
        cols: usize,
        /// Lattice rows inside the rectangle
        rows: usize,
        /// Per-axis jitter range (low, high)
        variance: (f64, f64),
    },
}

impl PointDistribution {
    /// Upper bound on the number of points this distribution can produce
    pub fn max_count(&self) -> usize {
        match *self {
            PointDistribution::Uniform { count } => count,
            PointDistribution::Beehive { cols, rows, .. } => (cols + 2) * (rows + 2),
        }
    }
}

/// Configuration for deterministic diagram generation
///
/// The same configuration always produces the identical diagram: point
/// layout, cell geometry and shape output are pure functions of these
/// fields.
///
/// # Example
///
/// ```
/// use voronoi_canvas::{DiagramConfigBuilder, Rect};
///
/// let config = DiagramConfigBuilder::new(Rect::new(-50.0, -50.0, 1380.0, 820.0))
///     .seed(42)
///     .point_count(255)
///     .relaxation_steps(10)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.seed, 42);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramConfig {
    /// Bounded domain; all points and cell polygons live inside it
    pub bounds: Rect,

    /// Point layout to generate
    pub distribution: PointDistribution,

    /// Random seed for deterministic point generation
    pub seed: u32,

    /// Number of Lloyd relaxation passes applied after construction
    ///
    /// - 0: raw Voronoi cells (irregular)
    /// - 5-10: progressively more uniform cell sizes
    ///
    /// No convergence check is performed; the full budget always runs.
    pub relaxation_steps: usize,

    /// Target average number of points per grid block
    ///
    /// Controls the spatial index resolution. The default of 1.0 gives one
    /// block per point on average, which keeps the neighbor search close to
    /// O(1) amortized for uniform layouts.
    pub points_per_block: f64,
}

/// Builder for creating [`DiagramConfig`] with validation
///
/// Setters that can reject their argument return `Result` so invalid values
/// surface at configuration time rather than mid-generation.
///
/// # Example
///
/// ```
/// use voronoi_canvas::{DiagramConfigBuilder, Rect};
///
/// let config = DiagramConfigBuilder::new(Rect::new(0.0, 0.0, 100.0, 100.0))
///     .seed(7)
///     .beehive(16, 9, (0.0, 3.0))
///     .unwrap()
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DiagramConfigBuilder {
    bounds: Rect,
    distribution: PointDistribution,
    seed: Option<u32>,
    relaxation_steps: usize,
    points_per_block: f64,
}

impl DiagramConfigBuilder {
    /// Create a new builder for the given domain rectangle
    ///
    /// Defaults:
    /// - distribution: 256 uniform points
    /// - seed: random (from `rand::random`)
    /// - relaxation_steps: 0
    /// - points_per_block: 1.0
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            distribution: PointDistribution::Uniform { count: 256 },
            seed: None,
            relaxation_steps: 0,
            points_per_block: 1.0,
        }
    }

    /// Set the random seed for point generation
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a uniform random distribution with the given point count
    pub fn point_count(mut self, count: usize) -> Self {
        self.distribution = PointDistribution::Uniform { count };
        self
    }

    /// Use a jittered hexagonal lattice
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `cols` or `rows` is zero, or if the jitter
    /// range is reversed (`variance.0 > variance.1`).
    pub fn beehive(mut self, cols: usize, rows: usize, variance: (f64, f64)) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "beehive lattice must be non-empty (got {}x{})",
                cols, rows
            )));
        }
        if variance.0 > variance.1 {
            return Err(VoronoiError::InvalidConfig(format!(
                "beehive variance range is reversed ({} > {})",
                variance.0, variance.1
            )));
        }
        self.distribution = PointDistribution::Beehive {
            cols,
            rows,
            variance,
        };
        Ok(self)
    }

    /// Set the number of Lloyd relaxation passes
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if steps > 64 (excessive and impractical).
    pub fn relaxation_steps(mut self, steps: usize) -> Result<Self> {
        if steps > 64 {
            return Err(VoronoiError::InvalidConfig(format!(
                "relaxation steps must be <= 64 (got {})",
                steps
            )));
        }
        self.relaxation_steps = steps;
        Ok(self)
    }

    /// Set the target average block occupancy of the spatial index
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the occupancy is not strictly positive.
    pub fn points_per_block(mut self, occupancy: f64) -> Result<Self> {
        if !(occupancy > 0.0) {
            return Err(VoronoiError::InvalidConfig(format!(
                "points per block must be positive (got {})",
                occupancy
            )));
        }
        self.points_per_block = occupancy;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDomain` if the rectangle has non-positive width or
    /// height, and `InvalidConfig` if the distribution yields zero points.
    pub fn build(self) -> Result<DiagramConfig> {
        if !(self.bounds.width > 0.0) || !(self.bounds.height > 0.0) {
            return Err(VoronoiError::InvalidDomain(format!(
                "rectangle must have positive extent (got {}x{})",
                self.bounds.width, self.bounds.height
            )));
        }
        if self.distribution.max_count() == 0 {
            return Err(VoronoiError::InvalidConfig(
                "distribution produces no points".to_string(),
            ));
        }

        Ok(DiagramConfig {
            bounds: self.bounds,
            distribution: self.distribution,
            seed: self.seed.unwrap_or_else(rand::random),
            relaxation_steps: self.relaxation_steps,
            points_per_block: self.points_per_block,
        })
    }
}
