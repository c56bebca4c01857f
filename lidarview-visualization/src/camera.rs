//! Camera state shared by navigation, playback and persistence

use lidarview_core::{Point3d, Vector3d};
use nalgebra::{Matrix4, Perspective3, Rotation3};

/// Distance kept between the camera and its look-at point when only a
/// direction is known
const DEFAULT_LOOK_DISTANCE: f64 = 1.0;

/// A perspective camera looking from `position` at `target`.
///
/// `target` doubles as the orbit pivot while orbiting and as a look-at point
/// in first-person mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3d,
    pub target: Point3d,
    pub up: Vector3d,
    pub fov: f64,
    pub aspect_ratio: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3d,
        target: Point3d,
        up: Vector3d,
        fov: f64,
        aspect_ratio: f64,
        near: f64,
        far: f64,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    /// Unit vector from the position toward the target
    pub fn direction(&self) -> Vector3d {
        (self.target - self.position)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(|| -Vector3d::z())
    }

    /// Point the camera at `target` without moving it
    pub fn look_at(&mut self, target: Point3d) {
        self.target = target;
    }

    /// Euler look angles `(pitch, yaw, roll)` of the current direction.
    ///
    /// Pitch is `asin(-dir.y)`, yaw is `atan2(dir.x, dir.z)` and roll is
    /// always zero.
    pub fn rotation(&self) -> Vector3d {
        look_rotation(&self.direction())
    }

    /// Turn the camera to the given look angles, keeping its distance to the target
    pub fn set_rotation(&mut self, rotation: &Vector3d) {
        let distance = (self.target - self.position).norm();
        let distance = if distance > f64::EPSILON {
            distance
        } else {
            DEFAULT_LOOK_DISTANCE
        };
        self.target = self.position + direction_from_rotation(rotation) * distance;
    }

    /// Move position and target together
    pub fn translate(&mut self, offset: &Vector3d) {
        self.position += offset;
        self.target += offset;
    }

    /// Move the camera forward
    pub fn move_forward(&mut self, distance: f64) {
        let direction = self.direction();
        self.translate(&(direction * distance));
    }

    /// Rotate the camera around the target by yaw `horizontal` and pitch
    /// `vertical` radians. Pitch stops just short of the poles.
    pub fn orbit(&mut self, horizontal: f64, vertical: f64) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius <= f64::EPSILON {
            return;
        }

        let up = self.up.try_normalize(f64::EPSILON).unwrap_or_else(Vector3d::y);
        let yawed = Rotation3::from_axis_angle(&nalgebra::Unit::new_normalize(up), horizontal) * offset;

        let limit = std::f64::consts::FRAC_PI_2 - 1e-3;
        let polar = (yawed.dot(&up) / radius).clamp(-1.0, 1.0).acos();
        let new_polar = (polar - vertical).clamp(std::f64::consts::FRAC_PI_2 - limit, std::f64::consts::FRAC_PI_2 + limit);

        let horizontal_part = yawed - up * yawed.dot(&up);
        let Some(across) = horizontal_part.try_normalize(f64::EPSILON) else {
            return;
        };
        let rotated = up * (radius * new_polar.cos()) + across * (radius * new_polar.sin());
        self.position = self.target + rotated;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3d::new(0.0, 200.0, 200.0),
            Point3d::origin(),
            Vector3d::y(),
            75f64.to_radians(),
            16.0 / 9.0,
            0.1,
            100_000.0,
        )
    }
}

/// Look angles for a unit direction
pub fn look_rotation(direction: &Vector3d) -> Vector3d {
    Vector3d::new(
        (-direction.y).clamp(-1.0, 1.0).asin(),
        direction.x.atan2(direction.z),
        0.0,
    )
}

/// Unit direction for look angles, the inverse of [`look_rotation`]
pub fn direction_from_rotation(rotation: &Vector3d) -> Vector3d {
    let (pitch, yaw) = (rotation.x, rotation.y);
    Vector3d::new(pitch.cos() * yaw.sin(), -pitch.sin(), pitch.cos() * yaw.cos())
}
