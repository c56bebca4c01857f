//! Conversion from survey axis order to the viewer's Y-up convention
//!
//! LiDAR sources store `(easting, northing, elevation)`. The renderer expects
//! elevation on the second axis, so every point and every bounds computation
//! goes through [`CoordinateNormalizer::normalize`] exactly once.

use crate::point::Point3d;

/// Swaps the northing and elevation axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinateNormalizer;

impl CoordinateNormalizer {
    /// Convert a source `(easting, northing, elevation)` point into `(easting, elevation, northing)`
    #[inline]
    pub fn normalize(point: &Point3d) -> Point3d {
        let [x, y, z] = Self::normalize_xyz(point.x, point.y, point.z);
        Point3d::new(x, y, z)
    }

    /// Convert a Y-up point back into source axis order
    #[inline]
    pub fn denormalize(point: &Point3d) -> Point3d {
        Point3d::new(point.x, point.z, point.y)
    }

    /// Component form of [`CoordinateNormalizer::normalize`] for flat buffers
    #[inline]
    pub fn normalize_xyz(x: f64, y: f64, z: f64) -> [f64; 3] {
        [x, z, y]
    }
}
