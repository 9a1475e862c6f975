//! Spatial indexing for fast position-to-cell lookups
//!
//! This module is only available with the `spatial-index` feature.

#[cfg(feature = "spatial-index")]
use glam::DVec2;
#[cfg(feature = "spatial-index")]
use kiddo::immutable::float::kdtree::ImmutableKdTree;
#[cfg(feature = "spatial-index")]
use kiddo::SquaredEuclidean;

/// Wrapper around a KD-tree of generator points
///
/// Because a Voronoi cell is exactly the set of positions nearest its
/// generator, a nearest-neighbor query over the generators answers "which
/// cell contains this position" in O(log n) without touching any polygon.
/// Collaborators matching detected motion regions against cells use this.
#[cfg(feature = "spatial-index")]
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
}

#[cfg(feature = "spatial-index")]
impl SpatialIndex {
    /// Build the index from generator points
    ///
    /// Rebuilt by the diagram whenever its point set changes.
    pub fn new(points: &[DVec2]) -> Self {
        let entries: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&entries),
        }
    }

    /// Index of the generator nearest to `position`
    ///
    /// # Example
    ///
    /// ```
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// use glam::DVec2;
    /// use voronoi_canvas::SpatialIndex;
    ///
    /// let generators = vec![DVec2::new(10.0, 10.0), DVec2::new(90.0, 90.0)];
    /// let index = SpatialIndex::new(&generators);
    /// assert_eq!(index.find_nearest(DVec2::new(20.0, 5.0)), 0);
    /// assert_eq!(index.find_nearest(DVec2::new(80.0, 95.0)), 1);
    /// # }
    /// ```
    pub fn find_nearest(&self, position: DVec2) -> usize {
        let query = [position.x, position.y];
        let result = self.tree.nearest_one::<SquaredEuclidean>(&query);
        result.item as usize
    }
}

#[cfg(test)]
#[cfg(feature = "spatial-index")]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_index_basic() {
        let points = vec![
            DVec2::new(10.0, 10.0),
            DVec2::new(90.0, 10.0),
            DVec2::new(10.0, 90.0),
            DVec2::new(90.0, 90.0),
        ];

        let index = SpatialIndex::new(&points);

        assert_eq!(index.find_nearest(DVec2::new(15.0, 20.0)), 0);
        assert_eq!(index.find_nearest(DVec2::new(85.0, 5.0)), 1);
        assert_eq!(index.find_nearest(DVec2::new(0.0, 99.0)), 2);
        assert_eq!(index.find_nearest(DVec2::new(70.0, 70.0)), 3);
    }

    #[test]
    fn test_spatial_index_exact_match() {
        let points = vec![DVec2::new(1.0, 2.0), DVec2::new(3.0, 4.0)];
        let index = SpatialIndex::new(&points);

        assert_eq!(index.find_nearest(points[0]), 0);
        assert_eq!(index.find_nearest(points[1]), 1);
    }
}
