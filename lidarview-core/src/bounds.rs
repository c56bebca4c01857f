//! Axis-aligned bounding boxes and incremental bounds tracking

use crate::error::{Error, Result};
use crate::point::{Point3d, Vector3d};
use serde::{Deserialize, Serialize};

/// Axis-aligned min/max extents of a point set, in Y-up viewer space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl BoundingBox {
    /// Create an empty box: mins at `+inf`, maxes at `-inf`
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            min_z: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
            max_z: f64::NEG_INFINITY,
        }
    }

    /// Create a box from explicit extents
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self {
            min_x: min.x,
            min_y: min.y,
            min_z: min.z,
            max_x: max.x,
            max_y: max.y,
            max_z: max.z,
        }
    }

    /// True once at least one point has been accumulated
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y && self.min_z <= self.max_z
    }

    /// Grow the box to contain `point`
    #[inline]
    pub fn extend(&mut self, point: &Point3d) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.min_z = self.min_z.min(point.z);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
        self.max_z = self.max_z.max(point.z);
    }

    pub fn min(&self) -> Point3d {
        Point3d::new(self.min_x, self.min_y, self.min_z)
    }

    pub fn max(&self) -> Point3d {
        Point3d::new(self.max_x, self.max_y, self.max_z)
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3d {
        self.max() - self.min()
    }

    /// Geometric center of the box
    pub fn center(&self) -> Point3d {
        nalgebra::center(&self.min(), &self.max())
    }

    /// Largest extent over all three axes
    pub fn max_extent(&self) -> f64 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    /// Largest extent over the ground plane (X and Z)
    pub fn horizontal_extent(&self) -> f64 {
        let size = self.size();
        size.x.max(size.z)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Tracks a [`BoundingBox`] over a stream of normalized points
#[derive(Debug, Clone, Default)]
pub struct BoundsAccumulator {
    bounds: BoundingBox,
    count: usize,
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn extend(&mut self, point: &Point3d) {
        self.bounds.extend(point);
        self.count += 1;
    }

    /// Number of points seen so far
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current box. Still carries the infinite sentinels if nothing was accumulated.
    pub fn result(&self) -> BoundingBox {
        self.bounds
    }

    /// Freeze the accumulated box, rejecting an empty stream
    pub fn finish(self) -> Result<BoundingBox> {
        if self.count == 0 {
            return Err(Error::EmptyPointSet);
        }
        Ok(self.bounds)
    }
}
