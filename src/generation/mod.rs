//! Diagram construction pipeline
//!
//! Seeded point layouts, the block grid spatial index, the precomputed
//! search-order/radius table, and the per-cell clipping builder. The
//! [`Diagram`](crate::Diagram) drives these; they are exposed for callers
//! that want to feed custom point sets or inspect the index.

mod builder;
mod grid;
mod points;
mod search;

pub use grid::BlockGrid;
pub use points::{generate_beehive_points, generate_uniform_points};
pub use search::SearchTable;

pub(crate) use builder::{build_cell, ClipScratch};

use glam::DVec2;

use crate::config::{DiagramConfig, PointDistribution};
use crate::error::{Result, VoronoiError};

/// Generate the point set described by a configuration
///
/// Deterministic for a given config. Fails with `InvalidConfig` when the
/// distribution produces no points (a beehive whose jitter pushes every
/// site out of the rectangle can do this).
pub fn generate_points(config: &DiagramConfig) -> Result<Vec<DVec2>> {
    let points = match config.distribution {
        PointDistribution::Uniform { count } => {
            generate_uniform_points(count, config.seed, config.bounds)
        }
        PointDistribution::Beehive {
            cols,
            rows,
            variance,
        } => generate_beehive_points(cols, rows, variance, config.seed, config.bounds),
    };

    if points.is_empty() {
        return Err(VoronoiError::InvalidConfig(
            "point generation produced no points".to_string(),
        ));
    }
    Ok(points)
}
