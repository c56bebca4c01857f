//! The viewer's application context and the renderer boundary

use crate::camera::Camera;
use crate::navigation::{MoveDirection, NavigationMode, NavigationModeController};
use crate::paths::CameraPathSet;
use crate::playback::{CompletionCallback, PathPlaybackEngine};
use crate::point_size::point_size_for_height;
use crate::presets::CameraPreset;
use crate::viewpoint::Viewpoint;
use lidarview_core::{ColorMode, PerformanceProfile, PointCloudDataset, Result};
use std::time::Duration;
use tracing::info;

/// What the external renderer must accept from the viewer
pub trait RenderTarget {
    /// Replace the drawable point set
    fn upload_points(&mut self, positions: &[f32], colors: &[f32]);

    /// Replace the color buffer of the current point set
    fn update_colors(&mut self, colors: &[f32]);

    fn set_point_size(&mut self, size: f32);

    /// Called once per frame with the camera to draw from
    fn set_camera(&mut self, camera: &Camera);
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Id of a camera path that finished on this frame
    pub completed_path: Option<String>,
    pub camera_moved: bool,
    pub colors_uploaded: bool,
    pub point_size: Option<f32>,
}

/// Owns the dataset, camera and every controller acting on them.
///
/// Components never reach into each other; the context hands each one the
/// camera and navigation state it needs for the operation at hand.
#[derive(Debug)]
pub struct ViewerContext {
    profile: PerformanceProfile,
    camera: Camera,
    navigation: NavigationModeController,
    paths: CameraPathSet,
    playback: PathPlaybackEngine,
    dataset: Option<PointCloudDataset>,
}

impl ViewerContext {
    pub fn new(profile: PerformanceProfile) -> Self {
        Self {
            profile,
            camera: Camera::default(),
            navigation: NavigationModeController::default(),
            paths: CameraPathSet::new(),
            playback: PathPlaybackEngine::new(),
            dataset: None,
        }
    }

    pub fn with_navigation_mode(mut self, mode: NavigationMode) -> Self {
        self.navigation = NavigationModeController::new(mode);
        self
    }

    pub fn profile(&self) -> &PerformanceProfile {
        &self.profile
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn navigation(&self) -> &NavigationModeController {
        &self.navigation
    }

    pub fn paths(&self) -> &CameraPathSet {
        &self.paths
    }

    pub fn playback(&self) -> &PathPlaybackEngine {
        &self.playback
    }

    pub fn dataset(&self) -> Option<&PointCloudDataset> {
        self.dataset.as_ref()
    }

    /// Replace the current dataset: stop any tour, rebuild paths, frame the
    /// camera and hand the buffers to the renderer
    pub fn load_dataset(&mut self, mut dataset: PointCloudDataset, target: &mut dyn RenderTarget) {
        self.playback.stop(&mut self.camera, &mut self.navigation);

        let bounds = *dataset.bounds();
        self.paths.rebuild(&bounds);
        self.navigation.frame_dataset(bounds, &mut self.camera);

        target.upload_points(dataset.positions(), dataset.colors());
        target.set_point_size(self.profile.point_size_base);
        dataset.mark_colors_uploaded();

        info!(
            points = dataset.total_points(),
            paths = self.paths.len(),
            "Dataset loaded into viewer"
        );
        self.dataset = Some(dataset);
    }

    /// Recolor the dataset; the renderer picks it up on the next frame.
    /// Returns false when nothing is loaded.
    pub fn set_color_mode(&mut self, mode: ColorMode) -> bool {
        match self.dataset.as_mut() {
            Some(dataset) => {
                dataset.set_color_mode(mode);
                true
            }
            None => false,
        }
    }

    pub fn switch_navigation(&mut self, mode: NavigationMode) -> bool {
        self.navigation.switch_to(mode, &mut self.camera)
    }

    pub fn set_moving(&mut self, direction: MoveDirection, held: bool) {
        self.navigation.set_moving(direction, held);
    }

    pub fn play_path(&mut self, path_id: &str, on_complete: Option<CompletionCallback>) -> Result<()> {
        self.playback.play(
            &self.paths,
            path_id,
            &mut self.camera,
            &mut self.navigation,
            on_complete,
        )
    }

    pub fn pause_path(&mut self) -> bool {
        self.playback.pause()
    }

    pub fn resume_path(&mut self) -> bool {
        self.playback.resume()
    }

    pub fn stop_path(&mut self) {
        self.playback.stop(&mut self.camera, &mut self.navigation);
    }

    pub fn apply_preset(&mut self, preset: CameraPreset) -> bool {
        preset.apply(&mut self.camera, &mut self.navigation)
    }

    pub fn capture_viewpoint(&self) -> Viewpoint {
        Viewpoint::capture(&self.camera, &self.navigation)
    }

    pub fn restore_viewpoint(&mut self, viewpoint: &Viewpoint) {
        viewpoint.restore(&mut self.camera, &mut self.navigation);
    }

    /// Run one frame: playback, movement, point size, color upload, camera
    pub fn frame(&mut self, dt: Duration, target: &mut dyn RenderTarget) -> FrameReport {
        let mut report = FrameReport {
            completed_path: self.playback.update(dt, &mut self.camera, &mut self.navigation),
            ..FrameReport::default()
        };

        if !self.playback.is_playing() {
            report.camera_moved = self.navigation.update_movement(dt, &mut self.camera);
        }

        if let Some(dataset) = self.dataset.as_mut() {
            let size = point_size_for_height(self.camera.position.y, dataset.bounds());
            target.set_point_size(size);
            report.point_size = Some(size);

            if dataset.colors_dirty() {
                target.update_colors(dataset.colors());
                dataset.mark_colors_uploaded();
                report.colors_uploaded = true;
            }
        }

        target.set_camera(&self.camera);
        report
    }
}

impl Default for ViewerContext {
    fn default() -> Self {
        Self::new(PerformanceProfile::default())
    }
}
