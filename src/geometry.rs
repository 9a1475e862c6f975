//! Planar primitives shared across the crate
//!
//! Provides the bounded domain rectangle and the handful of polygon
//! measurements (area, centroid, perimeter, containment) used by cells,
//! relaxation and shape post-processing.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding rectangle defining the diagram's domain
///
/// Every generator point lies inside the rectangle and every cell polygon is
/// clipped to it. Callers rendering to a viewport typically inflate the
/// visible area first (see [`Rect::inflated`]) so border cells are not
/// visually truncated.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum x coordinate
    pub x: f64,
    /// Minimum y coordinate
    pub y: f64,
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its origin and extent
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Maximum x coordinate
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Maximum y coordinate
    #[inline]
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Rectangle area
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Center point
    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Check whether a point lies inside the rectangle (edges inclusive)
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.top()
    }

    /// Grow the rectangle by `margin` on every side
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_canvas::Rect;
    ///
    /// let viewport = Rect::new(0.0, 0.0, 1280.0, 720.0);
    /// let domain = viewport.inflated(50.0);
    /// assert_eq!(domain.x, -50.0);
    /// assert_eq!(domain.width, 1380.0);
    /// ```
    pub fn inflated(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// The four corners in counter-clockwise order, starting bottom-left
    pub fn corners(&self) -> [DVec2; 4] {
        [
            DVec2::new(self.x, self.y),
            DVec2::new(self.right(), self.y),
            DVec2::new(self.right(), self.top()),
            DVec2::new(self.x, self.top()),
        ]
    }
}

/// Unsigned area of a simple polygon (shoelace formula)
pub fn polygon_area(vertices: &[DVec2]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    (area * 0.5).abs()
}

/// Area-weighted centroid of a simple polygon
///
/// Uses the signed-area-weighted formula, valid for any simple polygon.
/// Falls back to the vertex average when the polygon is (numerically)
/// area-less, so slivers still yield a usable point.
pub fn polygon_centroid(vertices: &[DVec2]) -> DVec2 {
    let n = vertices.len();
    if n == 0 {
        return DVec2::ZERO;
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut area = 0.0;

    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        area += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }

    if area.abs() < 1e-12 {
        let sum: DVec2 = vertices.iter().copied().sum();
        return sum / n as f64;
    }

    let factor = 1.0 / (3.0 * area);
    DVec2::new(cx * factor, cy * factor)
}

/// Total edge length of a closed polygon
pub fn polygon_perimeter(vertices: &[DVec2]) -> f64 {
    let n = vertices.len();
    if n < 2 {
        return 0.0;
    }

    let mut length = 0.0;
    for i in 0..n {
        length += vertices[i].distance(vertices[(i + 1) % n]);
    }
    length
}

/// Point-in-polygon test via the crossing-number rule
///
/// Works for any simple polygon regardless of winding. Points exactly on an
/// edge may land on either side; callers needing edge tolerance should test
/// a slightly perturbed point.
pub fn polygon_contains(vertices: &[DVec2], p: DVec2) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[j];
        if (a.y < p.y && b.y >= p.y) || (b.y < p.y && a.y >= p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if x_cross < p.x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
