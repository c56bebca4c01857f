//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A 3D point with single precision coordinates, as uploaded to the renderer
pub type Point3f = Point3<f32>;

/// Number of scalar components per position or color entry in flat buffers
pub const COMPONENTS: usize = 3;

/// Read the point at `index` out of a flat `[x0, y0, z0, x1, ...]` buffer
pub fn point_at(flat: &[f32], index: usize) -> Point3f {
    let i = index * COMPONENTS;
    Point3f::new(flat[i], flat[i + 1], flat[i + 2])
}
