//! Shape post-processing for animated rendering
//!
//! Turns raw cell polygons into renderable shapes: near-degenerate short
//! edges are removed with a perimeter-relative threshold, a closed cubic
//! curve is fitted through the surviving vertices, and the result is shrunk
//! toward its center for visual separation. A cheap sin/cos "drift" rebuilds
//! shapes from perturbed vertices every frame without recomputing the
//! diagram.

use glam::DVec2;

use crate::diagram::Diagram;
use crate::geometry::polygon_perimeter;

/// Tuning knobs for shape generation
#[derive(Debug, Clone, Copy)]
pub struct ShapeOptions {
    /// An edge survives simplification when its length exceeds
    /// `perimeter / simplify_divisor`
    pub simplify_divisor: f64,
    /// Additive slack on the simplification threshold
    ///
    /// Zero keeps the strict greater-than comparison; a small negative value
    /// also keeps edges that sit exactly on the threshold.
    pub simplify_epsilon: f64,
    /// Control-handle length as a fraction of the chord to the next vertex
    pub smoothing: f64,
    /// Uniform scale toward the shape center applied after curve fitting
    pub shrink: f64,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            simplify_divisor: 20.0,
            simplify_epsilon: 0.0,
            smoothing: 0.3,
            shrink: 0.75,
        }
    }
}

/// Speed and amplitude of the per-frame drift motion
#[derive(Debug, Clone, Copy)]
pub struct DriftOptions {
    /// Phase advance per frame
    pub speed: f64,
    /// Displacement amplitude per axis
    pub amplitude: f64,
}

impl DriftOptions {
    /// Drift applied to shape corner vertices
    pub const VERTICES: Self = Self {
        speed: 0.2,
        amplitude: 7.0,
    };
    /// Slower drift applied to shape centers
    pub const CENTERS: Self = Self {
        speed: 0.05,
        amplitude: 7.0,
    };
    /// Gentle drift for perturbing generator points between regenerations
    pub const GENERATORS: Self = Self {
        speed: 0.1,
        amplitude: 3.0,
    };
}

impl Default for DriftOptions {
    fn default() -> Self {
        Self::VERTICES
    }
}

/// One cubic segment of a closed curve
///
/// The segment runs from the previous segment's endpoint (or the curve
/// start) to `to`, bending toward the two control handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSegment {
    /// First control handle, anchored near the segment's start
    pub control_a: DVec2,
    /// Second control handle, anchored near the segment's end
    pub control_b: DVec2,
    /// Segment endpoint
    pub to: DVec2,
}

/// Closed cubic curve through a vertex cycle
///
/// Built by [`fit_curve`]: each vertex gets control handles from
/// forward/backward tangent estimates scaled by the chord length, which
/// looks C¹-continuous without a global spline solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothCurve {
    /// First on-curve point; the last segment returns here
    pub start: DVec2,
    /// One segment per vertex of the fitted cycle
    pub segments: Vec<CurveSegment>,
}

impl SmoothCurve {
    /// Number of cubic segments
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// On-curve start point of segment `i`
    #[inline]
    fn segment_start(&self, i: usize) -> DVec2 {
        if i == 0 {
            self.start
        } else {
            self.segments[i - 1].to
        }
    }

    /// Evaluate segment `i` at parameter `t` in `[0, 1]`
    pub fn eval(&self, i: usize, t: f64) -> DVec2 {
        let p0 = self.segment_start(i);
        let seg = &self.segments[i];
        let u = 1.0 - t;
        p0 * (u * u * u)
            + seg.control_a * (3.0 * u * u * t)
            + seg.control_b * (3.0 * u * t * t)
            + seg.to * (t * t * t)
    }

    /// Uniformly scale the curve toward `center`
    ///
    /// `factor` 1.0 is the identity; 0.75 is the default rendering shrink.
    /// The center itself is a fixed point of the transform.
    pub fn scaled_toward(&self, center: DVec2, factor: f64) -> SmoothCurve {
        let scale = |p: DVec2| scale_toward(p, center, factor);
        SmoothCurve {
            start: scale(self.start),
            segments: self
                .segments
                .iter()
                .map(|seg| CurveSegment {
                    control_a: scale(seg.control_a),
                    control_b: scale(seg.control_b),
                    to: scale(seg.to),
                })
                .collect(),
        }
    }
}

/// A rendering-facing shape derived from one cell
///
/// Rebuilt wholesale whenever shapes are regenerated or drifted, never
/// mutated incrementally (except for the externally driven visibility flag).
#[derive(Debug, Clone)]
pub struct AnimatedShape {
    /// Shape center (the cell's generator point)
    pub center: DVec2,
    /// Simplified corner points, unscaled
    pub points: Vec<DVec2>,
    /// Fitted curve, shrunk toward the center
    pub curve: SmoothCurve,
    /// Whether the shape should currently be drawn
    ///
    /// Set by external collaborators (e.g. motion detection); `true` on
    /// creation.
    pub visible: bool,
}

/// Scale a point toward `center` by `factor`
#[inline]
pub fn scale_toward(p: DVec2, center: DVec2, factor: f64) -> DVec2 {
    p * factor + center * (1.0 - factor)
}

/// Displace a point with the deterministic per-frame drift
///
/// The offset depends only on the point's own coordinates and the frame
/// counter, so drifting is reproducible and needs no state. When drifted
/// generators are fed back into
/// [`Diagram::set_points`](crate::Diagram::set_points), clamp them to the
/// domain rectangle first; the diagram rejects points outside it.
pub fn drift(p: DVec2, frame: u64, opts: &DriftOptions) -> DVec2 {
    let phase = frame as f64 * opts.speed;
    DVec2::new(
        p.x + (p.y + phase).sin() * opts.amplitude,
        p.y + (p.x + phase).cos() * opts.amplitude,
    )
}

/// Remove vertices whose outgoing edge is short relative to the perimeter
///
/// A vertex survives when the edge to its successor is longer than
/// `perimeter / divisor + epsilon`. Returns `None` when fewer than 3
/// vertices survive; such a cell is degenerate and produces no shape.
pub fn simplify_polygon(vertices: &[DVec2], opts: &ShapeOptions) -> Option<Vec<DVec2>> {
    let n = vertices.len();
    if n < 3 {
        return None;
    }

    let threshold = polygon_perimeter(vertices) / opts.simplify_divisor + opts.simplify_epsilon;
    let kept: Vec<DVec2> = (0..n)
        .filter(|&i| vertices[i].distance(vertices[(i + 1) % n]) > threshold)
        .map(|i| vertices[i])
        .collect();

    if kept.len() < 3 {
        None
    } else {
        Some(kept)
    }
}

/// Fit a closed cubic curve through every vertex of a cycle
///
/// For vertex `i` the outgoing segment's handles come from local tangent
/// estimates: `point - normalize(prev - next) * chord * smoothing` and
/// `next + normalize(point - next_next) * chord * smoothing`.
pub fn fit_curve(points: &[DVec2], smoothing: f64) -> SmoothCurve {
    let n = points.len();
    let mut segments = Vec::with_capacity(n);

    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let point = points[i];
        let next = points[(i + 1) % n];
        let next_next = points[(i + 2) % n];

        let chord = point.distance(next);
        let tangent_a = (prev - next).normalize_or_zero();
        let tangent_b = (point - next_next).normalize_or_zero();

        segments.push(CurveSegment {
            control_a: point - tangent_a * chord * smoothing,
            control_b: next + tangent_b * chord * smoothing,
            to: next,
        });
    }

    SmoothCurve {
        start: points[0],
        segments,
    }
}

/// Build one shape from a cell polygon and its center
///
/// Returns `None` when simplification leaves fewer than 3 vertices.
pub fn generate_shape(
    vertices: &[DVec2],
    center: DVec2,
    opts: &ShapeOptions,
) -> Option<AnimatedShape> {
    let points = simplify_polygon(vertices, opts)?;
    let curve = fit_curve(&points, opts.smoothing).scaled_toward(center, opts.shrink);
    Some(AnimatedShape {
        center,
        points,
        curve,
        visible: true,
    })
}

/// Build shapes for every non-degenerate cell of a diagram
///
/// Cells whose simplification collapses are skipped, so the output can be
/// shorter than the cell count.
pub fn generate_shapes(diagram: &Diagram, opts: &ShapeOptions) -> Vec<AnimatedShape> {
    diagram
        .cells()
        .filter_map(|cell| generate_shape(cell.vertices(), cell.generator, opts))
        .collect()
}

/// Rebuild shapes with their corner points and centers drifted to `frame`
///
/// The diagram is not touched: this is the lightweight cosmetic animation
/// layered on the last computed cell set. Visibility flags carry over.
pub fn drift_shapes(
    shapes: &[AnimatedShape],
    frame: u64,
    center_opts: &DriftOptions,
    vertex_opts: &DriftOptions,
    opts: &ShapeOptions,
) -> Vec<AnimatedShape> {
    shapes
        .iter()
        .map(|shape| {
            let center = drift(shape.center, frame, center_opts);
            let points: Vec<DVec2> = shape
                .points
                .iter()
                .map(|&p| drift(p, frame, vertex_opts))
                .collect();
            let curve = fit_curve(&points, opts.smoothing).scaled_toward(center, opts.shrink);
            AnimatedShape {
                center,
                points,
                curve,
                visible: shape.visible,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiagramConfigBuilder;
    use crate::geometry::Rect;

    fn square() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ]
    }

    /// Regular n-gon of radius 1 around the origin
    fn regular_ngon(n: usize) -> Vec<DVec2> {
        (0..n)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / n as f64;
                DVec2::new(a.cos(), a.sin())
            })
            .collect()
    }

    #[test]
    fn test_simplify_keeps_long_edges() {
        let kept = simplify_polygon(&square(), &ShapeOptions::default()).unwrap();
        assert_eq!(kept, square());
    }

    #[test]
    fn test_simplify_drops_short_edge() {
        // A sliver vertex right before a corner: its outgoing edge is far
        // below perimeter/20
        let mut verts = square();
        verts.insert(1, DVec2::new(9.9, 0.0));
        let kept = simplify_polygon(&verts, &ShapeOptions::default()).unwrap();
        assert_eq!(kept.len(), 4);
        assert!(!kept.contains(&DVec2::new(9.9, 0.0)));
    }

    #[test]
    fn test_simplify_threshold_is_strict() {
        // With divisor 4, every edge of a unit square sits exactly at the
        // threshold, so the strict comparison drops them all
        let strict = ShapeOptions {
            simplify_divisor: 4.0,
            ..Default::default()
        };
        let unit = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ];
        assert!(simplify_polygon(&unit, &strict).is_none());

        // A hair of negative slack keeps every edge instead
        let loose = ShapeOptions {
            simplify_epsilon: -1e-9,
            ..strict
        };
        let kept = simplify_polygon(&unit, &loose).unwrap();
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn test_simplify_degenerate_input() {
        let two = vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0)];
        assert!(simplify_polygon(&two, &ShapeOptions::default()).is_none());
    }

    #[test]
    fn test_simplify_idempotent() {
        let mut verts = square();
        verts.insert(3, DVec2::new(10.0, 9.95));
        verts.push(DVec2::new(0.05, 10.0));

        let opts = ShapeOptions::default();
        let once = simplify_polygon(&verts, &opts).unwrap();
        let twice = simplify_polygon(&once, &opts).unwrap();
        assert_eq!(once, twice, "re-simplification must remove nothing");
    }

    #[test]
    fn test_fit_curve_passes_through_vertices() {
        let points = square();
        let curve = fit_curve(&points, 0.3);

        assert_eq!(curve.segment_count(), 4);
        assert_eq!(curve.start, points[0]);
        for (i, seg) in curve.segments.iter().enumerate() {
            assert_eq!(seg.to, points[(i + 1) % 4]);
            // Endpoints of the cubic are exact
            let from = curve.eval(i, 0.0);
            assert!(from.distance(points[i]) < 1e-12);
            let to = curve.eval(i, 1.0);
            assert!(to.distance(points[(i + 1) % 4]) < 1e-12);
        }
        // The last segment closes the cycle
        assert_eq!(curve.segments[3].to, curve.start);
    }

    #[test]
    fn test_fit_curve_handles_scale_with_smoothing() {
        let points = square();
        let tight = fit_curve(&points, 0.0);
        for (i, seg) in tight.segments.iter().enumerate() {
            // Zero smoothing collapses the handles onto the endpoints
            assert!(seg.control_a.distance(points[i]) < 1e-12);
            assert!(seg.control_b.distance(seg.to) < 1e-12);
        }
    }

    #[test]
    fn test_scaled_toward() {
        let center = DVec2::new(5.0, 5.0);
        let curve = fit_curve(&square(), 0.3);
        let shrunk = curve.scaled_toward(center, 0.75);

        // Midpoint samples contract toward the center by the same factor
        for i in 0..curve.segment_count() {
            for &t in &[0.0, 0.5, 1.0] {
                let original = curve.eval(i, t);
                let scaled = shrunk.eval(i, t);
                let expected = scale_toward(original, center, 0.75);
                assert!(scaled.distance(expected) < 1e-9);
            }
        }

        // The center is a fixed point
        assert_eq!(scale_toward(center, center, 0.75), center);
        // Factor 1.0 is the identity
        assert_eq!(curve.scaled_toward(center, 1.0), curve);
    }

    #[test]
    fn test_drift_is_bounded_and_deterministic() {
        let opts = DriftOptions::VERTICES;
        let p = DVec2::new(12.0, 34.0);
        for frame in [0u64, 1, 60, 6000] {
            let a = drift(p, frame, &opts);
            let b = drift(p, frame, &opts);
            assert_eq!(a, b);
            assert!((a.x - p.x).abs() <= opts.amplitude + 1e-12);
            assert!((a.y - p.y).abs() <= opts.amplitude + 1e-12);
        }
        // Different frames move the point differently
        assert_ne!(drift(p, 1, &opts), drift(p, 2, &opts));
    }

    #[test]
    fn test_generate_shape_skips_degenerate() {
        // An aggressive divisor drops every edge of the square
        let aggressive = ShapeOptions {
            simplify_divisor: 4.0,
            ..Default::default()
        };
        assert!(generate_shape(&square(), DVec2::new(5.0, 5.0), &aggressive).is_none());

        let shape = generate_shape(&square(), DVec2::new(5.0, 5.0), &ShapeOptions::default())
            .expect("square survives simplification");
        assert!(shape.visible);
        assert_eq!(shape.points.len(), 4);
        assert_eq!(shape.curve.segment_count(), 4);
    }

    #[test]
    fn test_shrink_contracts_curve_extent() {
        let center = DVec2::new(5.0, 5.0);
        let shape = generate_shape(&square(), center, &ShapeOptions::default()).unwrap();
        // Every on-curve endpoint sits 0.75x from the center compared to its
        // unscaled corner
        for (i, &corner) in shape.points.iter().enumerate() {
            let on_curve = shape.curve.eval(i, 0.0);
            let expected = scale_toward(corner, center, 0.75);
            assert!(on_curve.distance(expected) < 1e-9);
        }
    }

    #[test]
    fn test_generate_shapes_from_diagram() {
        let config = DiagramConfigBuilder::new(Rect::new(0.0, 0.0, 100.0, 100.0))
            .seed(21)
            .point_count(24)
            .relaxation_steps(2)
            .unwrap()
            .build()
            .unwrap();
        let diagram = crate::Diagram::generate_from(config).unwrap();

        let shapes = generate_shapes(&diagram, &ShapeOptions::default());
        assert!(!shapes.is_empty());
        assert!(shapes.len() <= diagram.cell_count());
        for shape in &shapes {
            assert!(shape.points.len() >= 3);
            assert_eq!(shape.curve.segment_count(), shape.points.len());
            assert!(shape.visible);
        }
    }

    #[test]
    fn test_drift_shapes_preserves_structure() {
        let opts = ShapeOptions::default();
        let mut shapes = vec![
            generate_shape(&square(), DVec2::new(5.0, 5.0), &opts).unwrap(),
            generate_shape(&regular_ngon(6), DVec2::ZERO, &opts).unwrap(),
        ];
        shapes[1].visible = false;

        let drifted = drift_shapes(
            &shapes,
            42,
            &DriftOptions::CENTERS,
            &DriftOptions::VERTICES,
            &opts,
        );

        assert_eq!(drifted.len(), 2);
        assert!(drifted[0].visible);
        assert!(!drifted[1].visible, "visibility must carry over");
        for (before, after) in shapes.iter().zip(&drifted) {
            assert_eq!(before.points.len(), after.points.len());
            // Corner points moved, but by no more than the amplitude
            for (b, a) in before.points.iter().zip(&after.points) {
                assert!((a.x - b.x).abs() <= DriftOptions::VERTICES.amplitude + 1e-12);
                assert!((a.y - b.y).abs() <= DriftOptions::VERTICES.amplitude + 1e-12);
            }
        }
    }
}
