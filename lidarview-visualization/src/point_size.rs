//! Point size from camera altitude: small points up close, larger far away

use lidarview_core::BoundingBox;

/// Largest point size handed to the renderer
pub const MAX_POINT_SIZE: f32 = 2.0;

/// Point size for a camera at height `camera_y` over a dataset.
///
/// Height is measured in multiples of the terrain's vertical extent above
/// its lowest point. Below half an extent sizes run 0.3 to 0.5, up to two
/// extents 0.5 to 1.0, and beyond that they grow toward [`MAX_POINT_SIZE`].
pub fn point_size_for_height(camera_y: f64, bounds: &BoundingBox) -> f32 {
    // Flat terrain would divide by zero
    let terrain_height = (bounds.max_y - bounds.min_y).max(1.0);
    let relative = ((camera_y - bounds.min_y) / terrain_height).max(0.0) as f32;

    if relative < 0.5 {
        0.3 + relative * 0.4
    } else if relative < 2.0 {
        0.5 + (relative - 0.5) * 0.33
    } else {
        (1.0 + (relative - 2.0) * 0.2).min(MAX_POINT_SIZE)
    }
}
