//! Fixed camera viewpoints derived from dataset bounds

use crate::camera::{look_rotation, Camera};
use crate::navigation::{first_person_placement, NavigationMode, NavigationModeController};
use lidarview_core::{BoundingBox, Error, Point3d, Vector3d};
use std::fmt;
use std::str::FromStr;

/// Aerial distance as a multiple of the horizontal extent
const AERIAL_DISTANCE_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraPreset {
    Home,
    Top,
    Ground,
    North,
    South,
    East,
    West,
}

/// Where a preset puts the camera
#[derive(Debug, Clone, PartialEq)]
pub struct PresetView {
    pub position: Point3d,
    /// Look-at point for orbit presets
    pub target: Option<Point3d>,
    /// Look angles for first-person presets
    pub rotation: Option<Vector3d>,
    pub mode: NavigationMode,
    pub description: &'static str,
}

impl CameraPreset {
    pub const ALL: [CameraPreset; 7] = [
        CameraPreset::Home,
        CameraPreset::Top,
        CameraPreset::Ground,
        CameraPreset::North,
        CameraPreset::South,
        CameraPreset::East,
        CameraPreset::West,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraPreset::Home => "home",
            CameraPreset::Top => "top",
            CameraPreset::Ground => "ground",
            CameraPreset::North => "north",
            CameraPreset::South => "south",
            CameraPreset::East => "east",
            CameraPreset::West => "west",
        }
    }

    /// Compute the preset's view for a dataset
    pub fn view(&self, bounds: &BoundingBox) -> PresetView {
        let center = bounds.center();
        let distance = bounds.horizontal_extent() * AERIAL_DISTANCE_FACTOR;
        let side = distance * 0.5;

        let orbit = |position: Point3d, description| PresetView {
            position,
            target: Some(center),
            rotation: None,
            mode: NavigationMode::Orbit,
            description,
        };

        match self {
            CameraPreset::Home => orbit(
                center + Vector3d::new(0.0, distance * 0.7, distance * 0.7),
                "Default aerial view",
            ),
            CameraPreset::Top => orbit(
                Point3d::new(center.x, bounds.max_y + distance * 0.8, center.z),
                "Top-down plan view",
            ),
            CameraPreset::Ground => {
                let (position, look_at) = first_person_placement(bounds);
                let direction = (look_at - position)
                    .try_normalize(f64::EPSILON)
                    .unwrap_or_else(Vector3d::z);
                PresetView {
                    position,
                    target: None,
                    rotation: Some(look_rotation(&direction)),
                    mode: NavigationMode::FirstPerson,
                    description: "Ground-level corner view",
                }
            }
            CameraPreset::North => orbit(
                Point3d::new(center.x, center.y, bounds.min_z - side),
                "View from south",
            ),
            CameraPreset::South => orbit(
                Point3d::new(center.x, center.y, bounds.max_z + side),
                "View from north",
            ),
            CameraPreset::East => orbit(
                Point3d::new(bounds.max_x + side, center.y, center.z),
                "View from east",
            ),
            CameraPreset::West => orbit(
                Point3d::new(bounds.min_x - side, center.y, center.z),
                "View from west",
            ),
        }
    }

    /// Switch to the preset's mode if needed, then place the camera.
    /// Does nothing and returns false when no dataset is framed.
    pub fn apply(&self, camera: &mut Camera, navigation: &mut NavigationModeController) -> bool {
        let Some(bounds) = navigation.bounds().copied() else {
            tracing::warn!(preset = %self, "No dataset loaded; preset ignored");
            return false;
        };
        let view = self.view(&bounds);

        navigation.switch_to(view.mode, camera);
        camera.position = view.position;
        match (view.mode, view.rotation, view.target) {
            (NavigationMode::FirstPerson, Some(rotation), _) => camera.set_rotation(&rotation),
            (_, _, Some(target)) => camera.look_at(target),
            _ => {}
        }
        true
    }
}

impl fmt::Display for CameraPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CameraPreset::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::unknown("camera preset", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds() -> BoundingBox {
        BoundingBox::new(Point3d::new(0.0, 0.0, 0.0), Point3d::new(200.0, 20.0, 100.0))
    }

    #[test]
    fn test_home_and_top() {
        // horizontal extent 200, distance 300
        let home = CameraPreset::Home.view(&bounds());
        assert_relative_eq!(home.position, Point3d::new(100.0, 220.0, 260.0), epsilon = 1e-9);
        assert_eq!(home.target, Some(Point3d::new(100.0, 10.0, 50.0)));

        let top = CameraPreset::Top.view(&bounds());
        assert_relative_eq!(top.position, Point3d::new(100.0, 260.0, 50.0), epsilon = 1e-9);
    }

    #[test]
    fn test_compass_presets() {
        let b = bounds();
        assert_eq!(CameraPreset::North.view(&b).position, Point3d::new(100.0, 10.0, -150.0));
        assert_eq!(CameraPreset::South.view(&b).position, Point3d::new(100.0, 10.0, 250.0));
        assert_eq!(CameraPreset::East.view(&b).position, Point3d::new(350.0, 10.0, 50.0));
        assert_eq!(CameraPreset::West.view(&b).position, Point3d::new(-150.0, 10.0, 50.0));
    }

    #[test]
    fn test_ground_preset_switches_to_first_person() {
        let mut camera = Camera::default();
        let mut nav = NavigationModeController::default();
        nav.frame_dataset(bounds(), &mut camera);

        assert!(CameraPreset::Ground.apply(&mut camera, &mut nav));
        assert_eq!(nav.mode(), NavigationMode::FirstPerson);
        assert_eq!(camera.position, Point3d::new(30.0, 100.0, 30.0));
        let expected = (Point3d::new(170.0, 100.0, 70.0) - camera.position).normalize();
        assert_relative_eq!(camera.direction(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_orbit_preset_looks_at_center() {
        let mut camera = Camera::default();
        let mut nav = NavigationModeController::new(NavigationMode::FirstPerson);
        nav.frame_dataset(bounds(), &mut camera);

        assert!(CameraPreset::East.apply(&mut camera, &mut nav));
        assert_eq!(nav.mode(), NavigationMode::Orbit);
        assert_eq!(camera.target, Point3d::new(100.0, 10.0, 50.0));
    }

    #[test]
    fn test_apply_without_dataset() {
        let mut camera = Camera::default();
        let mut nav = NavigationModeController::default();
        assert!(!CameraPreset::Home.apply(&mut camera, &mut nav));
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn test_names() {
        assert_eq!("North".parse::<CameraPreset>().unwrap(), CameraPreset::North);
        assert!("sideways".parse::<CameraPreset>().is_err());
    }
}
