//! Error types for diagram construction and shape generation

use std::fmt;

/// Errors that can occur while building a diagram or querying it
#[derive(Debug, Clone)]
pub enum VoronoiError {
    /// Bounding rectangle is unusable (non-positive extent, points outside it)
    InvalidDomain(String),
    /// Configuration validation failed
    InvalidConfig(String),
    /// A generator's cell collapsed to nothing during clipping
    ///
    /// Carries the generator index. Raised by the cell builder when every
    /// vertex is clipped away or when two generators coincide; `generate()`
    /// recovers by dropping the cell, so callers normally never see this.
    DegenerateCell(usize),
}

impl fmt::Display for VoronoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoronoiError::InvalidDomain(msg) => write!(f, "invalid domain: {}", msg),
            VoronoiError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            VoronoiError::DegenerateCell(id) => write!(f, "degenerate cell for generator {}", id),
        }
    }
}

impl std::error::Error for VoronoiError {}

/// Result type alias for diagram operations
pub type Result<T> = std::result::Result<T, VoronoiError>;
