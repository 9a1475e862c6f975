//! Bounded planar Voronoi diagrams for animated rendering
//!
//! `voronoi_canvas` computes the Voronoi diagram of a point set inside a
//! bounding rectangle, relaxes it toward a centroidal (Lloyd) layout, and
//! post-processes each cell into a simplified, smoothed shape suitable for
//! per-frame animation. Construction uses a block grid plus a precomputed
//! minimum-distance table so each cell finds its bounding half-planes by
//! visiting only the necessary neighboring points.
//!
//! ## Quick Start
//!
//! ```rust
//! use voronoi_canvas::*;
//!
//! // Inflate the viewport so border cells are not visually truncated
//! let bounds = Rect::new(0.0, 0.0, 1280.0, 720.0).inflated(50.0);
//!
//! let config = DiagramConfigBuilder::new(bounds)
//!     .seed(42)
//!     .point_count(255)
//!     .relaxation_steps(10)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let diagram = Diagram::generate_from(config).unwrap();
//! let shapes = shape::generate_shapes(&diagram, &shape::ShapeOptions::default());
//!
//! // Each frame: drift the shapes without rebuilding the diagram
//! let frame = 120;
//! let drifted = shape::drift_shapes(
//!     &shapes,
//!     frame,
//!     &shape::DriftOptions::CENTERS,
//!     &shape::DriftOptions::VERTICES,
//!     &shape::ShapeOptions::default(),
//! );
//! assert_eq!(drifted.len(), shapes.len());
//! ```
//!
//! ## Features
//!
//! - `spatial-index` (default): O(log n) position-to-cell lookups via a
//!   KD-tree over the generators
//! - `serde`: serialization support for configuration and geometry types

// Modules
pub mod cell;
pub mod config;
pub mod diagram;
pub mod error;
pub mod generation;
pub mod geometry;
pub mod shape;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use cell::Cell;
pub use config::{DiagramConfig, DiagramConfigBuilder, PointDistribution};
pub use diagram::Diagram;
pub use error::{Result, VoronoiError};
pub use geometry::Rect;
pub use shape::{AnimatedShape, DriftOptions, ShapeOptions, SmoothCurve};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
