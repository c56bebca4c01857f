//! Frame-driven playback of camera paths
//!
//! A running path is a queue of [`Segment`]s, one per keyframe. Each segment
//! interpolates position and look-at target from the previous keyframe (or
//! the camera pose captured at start) to its own keyframe. The host drives
//! everything through [`PathPlaybackEngine::update`]; there are no timers.

use crate::camera::Camera;
use crate::easing::Easing;
use crate::navigation::{NavigationMode, NavigationModeController};
use crate::paths::{CameraPathSet, Keyframe};
use lidarview_core::{Error, Point3d, Result};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Invoked with the path id when a path finishes naturally
pub type CompletionCallback = Box<dyn FnMut(&str)>;

/// Camera position and look-at target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3d,
    pub target: Point3d,
}

impl CameraPose {
    pub fn of(camera: &Camera) -> Self {
        Self {
            position: camera.position,
            target: camera.target,
        }
    }

    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.position;
        camera.look_at(self.target);
    }

    /// Linear blend toward `other` by `t`
    pub fn lerp(&self, other: &CameraPose, t: f64) -> CameraPose {
        CameraPose {
            position: self.position + (other.position - self.position) * t,
            target: self.target + (other.target - self.target) * t,
        }
    }
}

/// Outcome of advancing a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentState {
    /// Still interpolating; the pose for this instant
    Running(CameraPose),
    /// Reached the end pose with `overflow` time left over for the next segment
    Finished { pose: CameraPose, overflow: Duration },
}

/// One eased transition between two poses
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    start: CameraPose,
    end: CameraPose,
    duration: Duration,
    easing: Easing,
    elapsed: Duration,
}

impl Segment {
    pub fn new(start: CameraPose, end: CameraPose, duration: Duration, easing: Easing) -> Self {
        Self {
            start,
            end,
            duration,
            easing,
            elapsed: Duration::ZERO,
        }
    }

    /// Segment from `start` to a keyframe
    pub fn toward(start: CameraPose, keyframe: &Keyframe) -> Self {
        let end = CameraPose {
            position: keyframe.position,
            target: keyframe.target,
        };
        Self::new(start, end, keyframe.duration, keyframe.easing)
    }

    pub fn end(&self) -> &CameraPose {
        &self.end
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Eased pose at elapsed fraction `t`
    pub fn pose_at(&self, t: f64) -> CameraPose {
        self.start.lerp(&self.end, self.easing.apply(t))
    }

    /// Move time forward by `dt`
    pub fn advance(&mut self, dt: Duration) -> SegmentState {
        let elapsed = self.elapsed + dt;
        if elapsed >= self.duration {
            self.elapsed = self.duration;
            return SegmentState::Finished {
                pose: self.end,
                overflow: elapsed - self.duration,
            };
        }
        self.elapsed = elapsed;
        SegmentState::Running(self.pose_at(elapsed.as_secs_f64() / self.duration.as_secs_f64()))
    }
}

/// Playback lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Snapshot for UI display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub current_path: Option<String>,
}

struct ActiveChain {
    path_id: String,
    segments: VecDeque<Segment>,
    restore_mode: Option<NavigationMode>,
    on_complete: Option<CompletionCallback>,
}

/// Plays at most one camera path at a time
#[derive(Default)]
pub struct PathPlaybackEngine {
    state: PlaybackState,
    active: Option<ActiveChain>,
}

impl fmt::Debug for PathPlaybackEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathPlaybackEngine")
            .field("state", &self.state)
            .field("active_path", &self.active_path())
            .field("remaining_segments", &self.active.as_ref().map(|a| a.segments.len()))
            .finish()
    }
}

impl PathPlaybackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.path_id.as_str())
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            is_playing: self.is_playing(),
            current_path: self.active_path().map(str::to_owned),
        }
    }

    /// Start playing `path_id` from the camera's current pose.
    ///
    /// Any running path is stopped first without its completion callback.
    /// Unknown ids fail with [`Error::PathNotFound`] and change nothing.
    pub fn play(
        &mut self,
        paths: &CameraPathSet,
        path_id: &str,
        camera: &mut Camera,
        navigation: &mut NavigationModeController,
        on_complete: Option<CompletionCallback>,
    ) -> Result<()> {
        let Some(path) = paths.get(path_id) else {
            warn!(path = path_id, "Camera path not found");
            return Err(Error::PathNotFound(path_id.to_string()));
        };

        self.stop(camera, navigation);

        // Paths steer a look-at target, which needs orbit mode
        let previous = navigation.mode();
        let restore_mode = (previous != NavigationMode::Orbit).then_some(previous);
        navigation.switch_to(NavigationMode::Orbit, camera);
        navigation.set_orbit_input_enabled(false);

        let mut start = CameraPose::of(camera);
        let segments = path
            .keyframes()
            .iter()
            .map(|keyframe| {
                let segment = Segment::toward(start, keyframe);
                start = *segment.end();
                segment
            })
            .collect();

        info!(path = path_id, from = ?camera.position, "Starting camera path");
        self.active = Some(ActiveChain {
            path_id: path_id.to_string(),
            segments,
            restore_mode,
            on_complete,
        });
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Freeze the chain in place. Returns false if nothing was playing.
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.state = PlaybackState::Paused;
        true
    }

    /// Continue a paused chain. Returns false if nothing was paused.
    pub fn resume(&mut self) -> bool {
        if self.state != PlaybackState::Paused {
            return false;
        }
        self.state = PlaybackState::Playing;
        true
    }

    /// Discard the running chain without invoking its completion callback
    pub fn stop(&mut self, camera: &mut Camera, navigation: &mut NavigationModeController) {
        if let Some(chain) = self.active.take() {
            debug!(path = %chain.path_id, "Camera path stopped");
            Self::release_navigation(chain.restore_mode, camera, navigation);
        }
        self.state = PlaybackState::Idle;
    }

    /// Advance by one frame. Returns the id of a path that finished on this frame.
    pub fn update(
        &mut self,
        dt: Duration,
        camera: &mut Camera,
        navigation: &mut NavigationModeController,
    ) -> Option<String> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        let chain = self.active.as_mut()?;

        let mut remaining = dt;
        while let Some(segment) = chain.segments.front_mut() {
            match segment.advance(remaining) {
                SegmentState::Running(pose) => {
                    pose.apply(camera);
                    return None;
                }
                SegmentState::Finished { pose, overflow } => {
                    pose.apply(camera);
                    chain.segments.pop_front();
                    remaining = overflow;
                }
            }
        }

        let chain = self.active.take()?;
        self.state = PlaybackState::Idle;
        Self::release_navigation(chain.restore_mode, camera, navigation);
        info!(path = %chain.path_id, "Camera path complete");

        if let Some(mut callback) = chain.on_complete {
            callback(&chain.path_id);
        }
        Some(chain.path_id)
    }

    fn release_navigation(
        restore_mode: Option<NavigationMode>,
        camera: &mut Camera,
        navigation: &mut NavigationModeController,
    ) {
        navigation.set_orbit_input_enabled(true);
        if let Some(mode) = restore_mode {
            navigation.switch_to(mode, camera);
        }
    }
}
