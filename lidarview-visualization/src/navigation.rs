//! Navigation modes and the controller that switches between them

use crate::camera::Camera;
use lidarview_core::{BoundingBox, Error, Point3d, Vector3d};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// First-person movement speed in world units per second
pub const FIRST_PERSON_SPEED: f64 = 300.0;

/// First-person start corner inset, as a fraction of the horizontal extent
pub const CORNER_INSET: f64 = 0.15;

/// First-person eye height above the minimum elevation
pub const EYE_HEIGHT: f64 = 100.0;

/// Orbit distance as a multiple of the largest extent
pub const ORBIT_DISTANCE_FACTOR: f64 = 1.5;

/// Share of the orbit distance used for both the up and back offsets
pub const ORBIT_OFFSET_FACTOR: f64 = 0.7;

/// The active camera-control scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NavigationMode {
    #[serde(rename = "fps")]
    FirstPerson,
    #[default]
    #[serde(rename = "orbit")]
    Orbit,
}

impl NavigationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationMode::FirstPerson => "fps",
            NavigationMode::Orbit => "orbit",
        }
    }
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavigationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fps" => Ok(NavigationMode::FirstPerson),
            "orbit" => Ok(NavigationMode::Orbit),
            other => Err(Error::unknown("navigation mode", other)),
        }
    }
}

/// A first-person movement key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Which movement keys are currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveState {
    pub fn set(&mut self, direction: MoveDirection, held: bool) {
        let flag = match direction {
            MoveDirection::Forward => &mut self.forward,
            MoveDirection::Backward => &mut self.backward,
            MoveDirection::Left => &mut self.left,
            MoveDirection::Right => &mut self.right,
            MoveDirection::Up => &mut self.up,
            MoveDirection::Down => &mut self.down,
        };
        *flag = held;
    }

    pub fn is_idle(&self) -> bool {
        *self == MoveState::default()
    }
}

/// Camera pose for first-person mode: near the min corner, looking across
/// at the opposite corner at the same height
pub fn first_person_placement(bounds: &BoundingBox) -> (Point3d, Point3d) {
    let inset = bounds.horizontal_extent() * CORNER_INSET;
    let height = bounds.min_y + EYE_HEIGHT;
    (
        Point3d::new(bounds.min_x + inset, height, bounds.min_z + inset),
        Point3d::new(bounds.max_x - inset, height, bounds.max_z - inset),
    )
}

/// Camera pose for orbit mode: above and behind the center, looking at it
pub fn orbit_placement(bounds: &BoundingBox) -> (Point3d, Point3d) {
    let center = bounds.center();
    let offset = bounds.max_extent() * ORBIT_DISTANCE_FACTOR * ORBIT_OFFSET_FACTOR;
    (center + Vector3d::new(0.0, offset, offset), center)
}

/// Exclusive first-person / orbit state machine.
///
/// Owns input gating and the bounds of the loaded dataset; the camera it
/// repositions is passed in by the caller.
#[derive(Debug, Clone)]
pub struct NavigationModeController {
    mode: NavigationMode,
    bounds: Option<BoundingBox>,
    orbit_input: bool,
    first_person_input: bool,
    move_state: MoveState,
    move_speed: f64,
}

impl Default for NavigationModeController {
    fn default() -> Self {
        Self::new(NavigationMode::default())
    }
}

impl NavigationModeController {
    pub fn new(mode: NavigationMode) -> Self {
        Self {
            mode,
            bounds: None,
            orbit_input: mode == NavigationMode::Orbit,
            first_person_input: mode == NavigationMode::FirstPerson,
            move_state: MoveState::default(),
            move_speed: FIRST_PERSON_SPEED,
        }
    }

    pub fn with_move_speed(mut self, speed: f64) -> Self {
        self.move_speed = speed;
        self
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.bounds.as_ref()
    }

    pub fn orbit_input_enabled(&self) -> bool {
        self.orbit_input
    }

    pub fn first_person_input_enabled(&self) -> bool {
        self.first_person_input
    }

    /// Gate orbit input, e.g. while a camera path is playing
    pub fn set_orbit_input_enabled(&mut self, enabled: bool) {
        self.orbit_input = enabled;
    }

    /// Record the bounds of a newly loaded dataset and frame it for the active mode
    pub fn frame_dataset(&mut self, bounds: BoundingBox, camera: &mut Camera) {
        self.bounds = Some(bounds);
        self.reposition(camera);
    }

    /// Activate `mode`. Returns false when it was already active.
    pub fn switch_to(&mut self, mode: NavigationMode, camera: &mut Camera) -> bool {
        if mode == self.mode {
            return false;
        }
        debug!(from = %self.mode, to = %mode, "Switching navigation mode");

        self.mode = mode;
        match mode {
            NavigationMode::FirstPerson => {
                self.orbit_input = false;
                self.first_person_input = true;
            }
            NavigationMode::Orbit => {
                self.first_person_input = false;
                self.move_state = MoveState::default();
                self.orbit_input = true;
            }
        }
        self.reposition(camera);
        true
    }

    fn reposition(&self, camera: &mut Camera) {
        let Some(bounds) = self.bounds.as_ref() else {
            return;
        };
        let (position, target) = match self.mode {
            NavigationMode::FirstPerson => first_person_placement(bounds),
            NavigationMode::Orbit => orbit_placement(bounds),
        };
        camera.position = position;
        camera.look_at(target);
    }

    pub fn move_state(&self) -> &MoveState {
        &self.move_state
    }

    /// Press or release a movement key
    pub fn set_moving(&mut self, direction: MoveDirection, held: bool) {
        self.move_state.set(direction, held);
    }

    /// Apply held movement keys for one frame. Returns true if the camera moved.
    ///
    /// Forward and backward follow the full view direction, strafing is
    /// perpendicular to it and up/down is purely vertical.
    pub fn update_movement(&self, dt: Duration, camera: &mut Camera) -> bool {
        if self.mode != NavigationMode::FirstPerson || !self.first_person_input || self.move_state.is_idle() {
            return false;
        }

        let distance = self.move_speed * dt.as_secs_f64();
        let direction = camera.direction();
        let right = direction
            .cross(&camera.up)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3d::x);

        let state = &self.move_state;
        let axis = |positive: bool, negative: bool| f64::from(u8::from(positive)) - f64::from(u8::from(negative));
        let offset = direction * axis(state.forward, state.backward) * distance
            + right * axis(state.right, state.left) * distance
            + Vector3d::y() * axis(state.up, state.down) * distance;

        camera.translate(&offset);
        offset != Vector3d::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> BoundingBox {
        BoundingBox::new(Point3d::origin(), Point3d::new(100.0, 10.0, 100.0))
    }

    #[test]
    fn test_first_person_corner_placement() {
        let mut camera = Camera::default();
        let mut nav = NavigationModeController::new(NavigationMode::Orbit);
        nav.frame_dataset(square(), &mut camera);

        assert!(nav.switch_to(NavigationMode::FirstPerson, &mut camera));
        assert_eq!(camera.position, Point3d::new(15.0, 110.0, 15.0));
        assert_eq!(camera.target, Point3d::new(85.0, 110.0, 85.0));
        assert!(nav.first_person_input_enabled());
        assert!(!nav.orbit_input_enabled());
    }

    #[test]
    fn test_orbit_placement() {
        let mut camera = Camera::default();
        let mut nav = NavigationModeController::new(NavigationMode::FirstPerson);
        nav.frame_dataset(square(), &mut camera);
        nav.switch_to(NavigationMode::Orbit, &mut camera);

        // distance = 1.5 * 100, offsets 0.7 * 150 = 105
        assert_relative_eq!(camera.position, Point3d::new(50.0, 110.0, 155.0), epsilon = 1e-9);
        assert_eq!(camera.target, Point3d::new(50.0, 5.0, 50.0));
        assert!(nav.orbit_input_enabled());
        assert!(!nav.first_person_input_enabled());
    }

    #[test]
    fn test_same_mode_is_noop() {
        let mut camera = Camera::default();
        let mut nav = NavigationModeController::default();
        nav.frame_dataset(square(), &mut camera);
        camera.position = Point3d::new(1.0, 2.0, 3.0);
        assert!(!nav.switch_to(NavigationMode::Orbit, &mut camera));
        assert_eq!(camera.position, Point3d::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_switch_without_dataset_keeps_camera() {
        let mut camera = Camera::default();
        let before = camera.clone();
        let mut nav = NavigationModeController::default();
        assert!(nav.switch_to(NavigationMode::FirstPerson, &mut camera));
        assert_eq!(camera, before);
    }

    #[test]
    fn test_movement_only_in_first_person() {
        let mut camera = Camera::default();
        let mut nav = NavigationModeController::default();
        nav.frame_dataset(square(), &mut camera);
        nav.set_moving(MoveDirection::Forward, true);
        assert!(!nav.update_movement(Duration::from_secs(1), &mut camera));

        nav.switch_to(NavigationMode::FirstPerson, &mut camera);
        nav.set_moving(MoveDirection::Forward, true);
        let start = camera.position;
        let direction = camera.direction();
        assert!(nav.update_movement(Duration::from_millis(100), &mut camera));
        assert_relative_eq!(camera.position, start + direction * 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_vertical_and_strafe_movement() {
        let mut camera = Camera::default();
        camera.position = Point3d::origin();
        camera.look_at(Point3d::new(0.0, 0.0, -10.0));
        let mut nav = NavigationModeController::new(NavigationMode::FirstPerson);

        nav.set_moving(MoveDirection::Up, true);
        nav.set_moving(MoveDirection::Right, true);
        nav.update_movement(Duration::from_secs(1), &mut camera);
        assert_relative_eq!(camera.position, Point3d::new(300.0, 300.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(camera.direction(), Vector3d::new(0.0, 0.0, -1.0), epsilon = 1e-12);

        // Opposing keys cancel out
        nav.set_moving(MoveDirection::Down, true);
        nav.set_moving(MoveDirection::Left, true);
        assert!(!nav.update_movement(Duration::from_secs(1), &mut camera));
    }

    #[test]
    fn test_leaving_first_person_clears_keys() {
        let mut camera = Camera::default();
        let mut nav = NavigationModeController::new(NavigationMode::FirstPerson);
        nav.set_moving(MoveDirection::Backward, true);
        nav.switch_to(NavigationMode::Orbit, &mut camera);
        assert!(nav.move_state().is_idle());
    }

    #[test]
    fn test_mode_identifiers() {
        assert_eq!("fps".parse::<NavigationMode>().unwrap(), NavigationMode::FirstPerson);
        assert_eq!(NavigationMode::Orbit.to_string(), "orbit");
        assert!(matches!(
            "fly".parse::<NavigationMode>(),
            Err(Error::UnknownVariant { kind: "navigation mode", .. })
        ));
    }
}
