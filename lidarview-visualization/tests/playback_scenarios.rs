//! Camera path playback driven by synthetic frame ticks

use lidarview_core::{BoundingBox, Error, Point3d};
use lidarview_visualization::{
    Camera, CameraPathSet, CompletionCallback, NavigationMode, NavigationModeController, PathPlaybackEngine,
    PlaybackState,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

struct Rig {
    camera: Camera,
    nav: NavigationModeController,
    paths: CameraPathSet,
    engine: PathPlaybackEngine,
    completed: Rc<RefCell<Vec<String>>>,
}

impl Rig {
    fn new(bounds: BoundingBox, mode: NavigationMode) -> Self {
        let mut camera = Camera::default();
        let mut nav = NavigationModeController::new(mode);
        nav.frame_dataset(bounds, &mut camera);
        Self {
            camera,
            nav,
            paths: CameraPathSet::from_bounds(&bounds),
            engine: PathPlaybackEngine::new(),
            completed: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn recorder(&self) -> Option<CompletionCallback> {
        let completed = Rc::clone(&self.completed);
        Some(Box::new(move |id: &str| completed.borrow_mut().push(id.to_string())))
    }

    fn play(&mut self, id: &str) -> lidarview_core::Result<()> {
        let callback = self.recorder();
        self.engine.play(&self.paths, id, &mut self.camera, &mut self.nav, callback)
    }

    fn tick(&mut self, millis: u64) -> Option<String> {
        self.engine
            .update(Duration::from_millis(millis), &mut self.camera, &mut self.nav)
    }

    fn run_to_end(&mut self) -> Option<String> {
        for _ in 0..10_000 {
            if let Some(id) = self.tick(16) {
                return Some(id);
            }
        }
        None
    }
}

fn city() -> BoundingBox {
    BoundingBox::new(Point3d::new(0.0, 0.0, 0.0), Point3d::new(1000.0, 100.0, 1000.0))
}

#[test]
fn test_overview_reaches_first_keyframe_altitude() {
    let mut rig = Rig::new(city(), NavigationMode::Orbit);
    rig.play("overview").unwrap();

    // The first segment lasts two seconds
    assert_eq!(rig.tick(2000), None);
    assert_eq!(rig.camera.position, Point3d::new(200.0, 600.0, 200.0));
    assert_eq!(rig.camera.target, Point3d::new(500.0, 100.0, 500.0));
}

#[test]
fn test_natural_completion_invokes_callback_once() {
    let mut rig = Rig::new(city(), NavigationMode::Orbit);
    rig.play("diagonal").unwrap();

    assert_eq!(rig.run_to_end().as_deref(), Some("diagonal"));
    assert_eq!(*rig.completed.borrow(), ["diagonal"]);
    assert_eq!(rig.engine.state(), PlaybackState::Idle);
    assert_eq!(rig.camera.position, Point3d::new(1000.0, 550.0, 1000.0));

    assert_eq!(rig.tick(16), None);
    assert_eq!(rig.completed.borrow().len(), 1);
}

#[test]
fn test_single_large_tick_runs_whole_chain() {
    let mut rig = Rig::new(city(), NavigationMode::Orbit);
    rig.play("overview").unwrap();
    assert_eq!(rig.tick(60_000).as_deref(), Some("overview"));
    assert_eq!(rig.camera.position, Point3d::new(900.0, 550.0, 900.0));
}

#[test]
fn test_stop_never_invokes_callback() {
    let mut rig = Rig::new(city(), NavigationMode::Orbit);
    rig.play("rotate").unwrap();
    rig.tick(500);
    rig.engine.stop(&mut rig.camera, &mut rig.nav);

    assert_eq!(rig.engine.state(), PlaybackState::Idle);
    assert_eq!(rig.engine.active_path(), None);
    assert_eq!(rig.run_to_end(), None);
    assert!(rig.completed.borrow().is_empty());
    assert!(rig.nav.orbit_input_enabled());
}

#[test]
fn test_play_replaces_running_path_silently() {
    let mut rig = Rig::new(city(), NavigationMode::Orbit);
    rig.play("flythrough").unwrap();
    rig.tick(1000);
    rig.play("overview").unwrap();
    assert_eq!(rig.engine.active_path(), Some("overview"));

    assert_eq!(rig.run_to_end().as_deref(), Some("overview"));
    assert_eq!(*rig.completed.borrow(), ["overview"]);
}

#[test]
fn test_pause_freezes_and_resume_continues() {
    let mut rig = Rig::new(city(), NavigationMode::Orbit);
    rig.play("overview").unwrap();
    rig.tick(1000);
    let frozen = rig.camera.clone();

    assert!(rig.engine.pause());
    assert_eq!(rig.engine.state(), PlaybackState::Paused);
    assert!(!rig.engine.status().is_playing);
    assert_eq!(rig.tick(5000), None);
    assert_eq!(rig.camera, frozen);

    assert!(rig.engine.resume());
    assert_eq!(rig.tick(1000), None);
    assert_eq!(rig.camera.position, Point3d::new(200.0, 600.0, 200.0));
}

#[test]
fn test_first_person_switched_for_playback_and_restored() {
    let mut rig = Rig::new(city(), NavigationMode::FirstPerson);
    rig.play("overview").unwrap();
    assert_eq!(rig.nav.mode(), NavigationMode::Orbit);
    assert!(!rig.nav.orbit_input_enabled());

    rig.run_to_end();
    assert_eq!(rig.nav.mode(), NavigationMode::FirstPerson);
    assert!(!rig.nav.orbit_input_enabled());
    assert!(rig.nav.first_person_input_enabled());
    // Restoring first-person re-frames at the ground corner
    assert_eq!(rig.camera.position, Point3d::new(150.0, 100.0, 150.0));
}

#[test]
fn test_orbit_input_gated_while_playing() {
    let mut rig = Rig::new(city(), NavigationMode::Orbit);
    assert!(rig.nav.orbit_input_enabled());
    rig.play("inspection").unwrap();
    assert!(!rig.nav.orbit_input_enabled());
    rig.run_to_end();
    assert!(rig.nav.orbit_input_enabled());
    assert_eq!(rig.nav.mode(), NavigationMode::Orbit);
}

#[test]
fn test_unknown_path_leaves_running_path_alone() {
    let mut rig = Rig::new(city(), NavigationMode::Orbit);
    rig.play("overview").unwrap();
    let result = rig.play("missing");
    assert!(matches!(result, Err(Error::PathNotFound(_))));
    assert_eq!(rig.engine.active_path(), Some("overview"));
    assert!(rig.engine.is_playing());
}

#[test]
fn test_first_person_corner_scenario() {
    let bounds = BoundingBox::new(Point3d::origin(), Point3d::new(100.0, 10.0, 100.0));
    let mut rig = Rig::new(bounds, NavigationMode::Orbit);
    assert!(rig.nav.switch_to(NavigationMode::FirstPerson, &mut rig.camera));
    assert_eq!(rig.camera.position, Point3d::new(15.0, 110.0, 15.0));
}
